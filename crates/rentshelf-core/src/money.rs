//! # Money Module
//!
//! Provides the `Money` type for rental amounts.
//!
//! ## Why Decimal, Not Cents?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE WEEKLY-RATE PROBLEM                                                │
//! │                                                                         │
//! │  Rental price = weekly rate × days / 7                                  │
//! │    $15.00 × 30 / 7 = $64.2857142857...                                  │
//! │                                                                         │
//! │  Integer cents would round every line at creation time and the         │
//! │  rounding error would accumulate in cart and order totals.             │
//! │                                                                         │
//! │  OUR SOLUTION: rust_decimal (28 significant digits)                     │
//! │    Stored amounts keep full precision.                                  │
//! │    Rounding to the currency's minor unit happens ONLY for display.     │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use rentshelf_core::money::Money;
//!
//! let rate = Money::from_major(21);
//! let total = rate + Money::from_major(20);
//! assert_eq!(total, Money::from_major(41));
//! ```

use rust_decimal::prelude::FromPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Sub};

use crate::error::{CoreError, CoreResult};

// =============================================================================
// Money Type
// =============================================================================

/// A currency-agnostic monetary amount at full decimal precision.
///
/// ## Where Money is Used
/// ```text
/// CatalogItem.price (weekly rate) ──► pricing::line_total ──► RentedBook.total_price
///                                              │
///                                              ▼
///                               CartSnapshot.total_amount ──► Order.total_amount
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Money(Decimal);

impl Money {
    /// Zero money value.
    pub const ZERO: Money = Money(Decimal::ZERO);

    /// Wraps a decimal amount.
    #[inline]
    pub const fn new(amount: Decimal) -> Self {
        Money(amount)
    }

    /// Creates a whole-unit amount (e.g. `21` → 21.00).
    #[inline]
    pub fn from_major(units: i64) -> Self {
        Money(Decimal::from(units))
    }

    /// Converts a raw catalog number into Money.
    ///
    /// The catalog collaborator hands prices over as JSON numbers; NaN and
    /// infinities are rejected here instead of being clamped.
    ///
    /// ## Example
    /// ```rust
    /// use rentshelf_core::money::Money;
    ///
    /// assert!(Money::try_from_f64(12.5).is_ok());
    /// assert!(Money::try_from_f64(f64::NAN).is_err());
    /// ```
    pub fn try_from_f64(value: f64) -> CoreResult<Self> {
        if !value.is_finite() {
            return Err(CoreError::pricing(format!(
                "amount must be finite, got {value}"
            )));
        }

        Decimal::from_f64(value)
            .map(Money)
            .ok_or_else(|| CoreError::pricing(format!("amount {value} is out of range")))
    }

    /// Returns the underlying decimal amount.
    #[inline]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Checks if the value is zero.
    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub fn is_negative(&self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }

    /// Rounds half away from zero to `decimal_places`, for display only.
    pub fn rounded(&self, decimal_places: u32) -> Money {
        Money(
            self.0
                .round_dp_with_strategy(decimal_places, RoundingStrategy::MidpointAwayFromZero),
        )
    }

    /// Applies a fixed display conversion rate.
    ///
    /// Used to show catalog-currency amounts in the storefront's display
    /// currency. Stored totals are never converted.
    pub fn convert(&self, rate: Decimal) -> CoreResult<Money> {
        self.0
            .checked_mul(rate)
            .map(Money)
            .ok_or_else(|| CoreError::pricing("display conversion overflowed"))
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Shows the amount with two decimal places.
///
/// ## Note
/// This is for debugging and logs. Use [`crate::pricing::format_currency`]
/// for anything a shopper sees.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut shown = self.rounded(2).0;
        shown.rescale(2);
        write!(f, "{shown}")
    }
}

impl From<Decimal> for Money {
    fn from(amount: Decimal) -> Self {
        Money(amount)
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::ZERO, |acc, m| acc + m)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
