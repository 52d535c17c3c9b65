//! # Pricing Engine
//!
//! Converts a weekly rental rate and a rental-day count into a charged
//! amount, and formats amounts for display.
//!
//! ## Price Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Catalog weekly rate: $10.00        Shopper picks tier: 14 days         │
//! │          │                                     │                        │
//! │          └──────────────┬──────────────────────┘                        │
//! │                         ▼                                               │
//! │        line_total(10.00, 14) = 10.00 × 14 / 7 = 20.00                   │
//! │                         │                                               │
//! │                         ▼                                               │
//! │        cart_total(lines) = Σ line_total     (full precision)            │
//! │                         │                                               │
//! │                         ▼                                               │
//! │        format_currency(total, "USD") = "$20.00"   (display rounding)    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The rate is per WEEK. Day counts do not have to be multiples of seven;
//! a fractional week is valid arithmetic, the tier list is a UI concern.

use rust_decimal::Decimal;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;

/// Days in one rental week.
pub const DAYS_PER_WEEK: i64 = 7;

/// Computes `weekly_rate × rental_days / 7` without rounding.
///
/// ## Errors
/// `InvalidPricingInput` when `rental_days <= 0` or the rate is negative.
/// A zero rate is a free item and prices to zero.
///
/// ## Example
/// ```rust
/// use rentshelf_core::money::Money;
/// use rentshelf_core::pricing::line_total;
///
/// let total = line_total(Money::from_major(10), 14).unwrap();
/// assert_eq!(total, Money::from_major(20));
/// ```
pub fn line_total(weekly_rate: Money, rental_days: i64) -> CoreResult<Money> {
    if rental_days <= 0 {
        return Err(CoreError::pricing(format!(
            "rental days must be positive, got {rental_days}"
        )));
    }

    if weekly_rate.is_negative() {
        return Err(CoreError::pricing(format!(
            "weekly rate must not be negative, got {weekly_rate}"
        )));
    }

    weekly_rate
        .amount()
        .checked_mul(Decimal::from(rental_days))
        .and_then(|scaled| scaled.checked_div(Decimal::from(DAYS_PER_WEEK)))
        .map(Money::new)
        .ok_or_else(|| CoreError::pricing("line total overflowed"))
}

/// Sums `line_total` over `(weekly_rate, rental_days)` pairs.
///
/// Returns zero for an empty collection. The first invalid line aborts the
/// sum with its error.
pub fn cart_total<I>(lines: I) -> CoreResult<Money>
where
    I: IntoIterator<Item = (Money, i64)>,
{
    lines
        .into_iter()
        .try_fold(Money::ZERO, |acc, (rate, days)| {
            Ok(acc + line_total(rate, days)?)
        })
}

/// Formats an amount for display in the given ISO 4217 currency.
///
/// Grouping, separators and the symbol come from the currency's locale
/// (`$1,234.50`, `€1.234,50`, `₹1,23,456.00`). The amount is rounded half
/// away from zero to the currency's minor unit, for the returned string only.
///
/// ## Errors
/// `InvalidPricingInput` for an unknown currency code.
pub fn format_currency(amount: Money, currency_code: &str) -> CoreResult<String> {
    let currency = rusty_money::iso::find(currency_code)
        .ok_or_else(|| CoreError::pricing(format!("unknown currency code: {currency_code}")))?;

    // Round here: rusty-money's Display would round half to even.
    let rounded = amount.rounded(currency.exponent);
    Ok(rusty_money::Money::from_decimal(rounded.amount(), currency).to_string())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_line_total_is_rate_times_weeks() {
        for (rate, days) in [(dec!(21), 7), (dec!(10), 14), (dec!(15), 30), (dec!(3.99), 21)] {
            let total = line_total(Money::new(rate), days).unwrap();
            assert_eq!(total.amount(), rate * Decimal::from(days) / dec!(7));
        }
    }

    #[test]
    fn test_line_total_free_item() {
        assert!(line_total(Money::ZERO, 30).unwrap().is_zero());
    }

    #[test]
    fn test_line_total_keeps_full_precision() {
        let total = line_total(Money::from_major(15), 30).unwrap();
        assert_ne!(total, total.rounded(2));
        assert_eq!(total.rounded(2), Money::new(dec!(64.29)));
    }

    #[test]
    fn test_line_total_accepts_non_tier_days() {
        let total = line_total(Money::from_major(7), 3).unwrap();
        assert_eq!(total, Money::from_major(3));
    }

    #[test]
    fn test_line_total_rejects_bad_input() {
        assert!(matches!(
            line_total(Money::from_major(10), 0),
            Err(CoreError::InvalidPricingInput { .. })
        ));
        assert!(matches!(
            line_total(Money::from_major(10), -7),
            Err(CoreError::InvalidPricingInput { .. })
        ));
        assert!(matches!(
            line_total(Money::new(dec!(-1)), 7),
            Err(CoreError::InvalidPricingInput { .. })
        ));
    }

    #[test]
    fn test_cart_total_empty_is_zero() {
        assert_eq!(cart_total(Vec::new()).unwrap(), Money::ZERO);
    }

    #[test]
    fn test_cart_total_two_lines() {
        let total = cart_total(vec![(Money::from_major(21), 7), (Money::from_major(10), 14)]).unwrap();
        assert_eq!(total, Money::from_major(41));
    }

    #[test]
    fn test_cart_total_propagates_line_error() {
        let result = cart_total(vec![(Money::from_major(21), 7), (Money::from_major(10), 0)]);
        assert!(matches!(result, Err(CoreError::InvalidPricingInput { .. })));
    }

    #[test]
    fn test_format_currency_usd() {
        assert_eq!(
            format_currency(Money::new(dec!(1234.5)), "USD").unwrap(),
            "$1,234.50"
        );
        assert_eq!(format_currency(Money::from_major(41), "USD").unwrap(), "$41.00");
    }

    #[test]
    fn test_format_currency_rounds_for_display_only() {
        let amount = line_total(Money::from_major(15), 30).unwrap();
        assert_eq!(format_currency(amount, "USD").unwrap(), "$64.29");
        assert_eq!(amount.amount(), dec!(15) * dec!(30) / dec!(7));
    }

    #[test]
    fn test_format_currency_midpoints_round_away_from_zero() {
        let half_cent = Money::new(dec!(0.125));
        assert_eq!(format_currency(half_cent, "USD").unwrap(), "$0.13");
        assert_eq!(half_cent.to_string(), "0.13");

        assert_eq!(
            format_currency(Money::new(dec!(1234.5)), "JPY").unwrap(),
            "¥1,235"
        );
    }

    #[test]
    fn test_format_currency_unknown_code() {
        assert!(matches!(
            format_currency(Money::from_major(1), "XYZ"),
            Err(CoreError::InvalidPricingInput { .. })
        ));
    }
}
