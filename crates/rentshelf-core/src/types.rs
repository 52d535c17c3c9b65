//! # Domain Types
//!
//! Types shared by the cart, checkout and order modules.
//!
//! ## Type Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐        │
//! │  │  CatalogItem    │   │    Identity     │   │ ShippingDetails │        │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │        │
//! │  │  id             │   │  uid            │   │  full_name      │        │
//! │  │  title/authors  │   │  email          │   │  street_address │        │
//! │  │  price (weekly) │   │  role           │   │  city/state/... │        │
//! │  └────────┬────────┘   └─────────────────┘   └─────────────────┘        │
//! │           │ frozen copy at order time                                   │
//! │           ▼                                                             │
//! │  ┌─────────────────┐                                                    │
//! │  │   RentedBook    │   owned by Order, never follows catalog changes    │
//! │  └─────────────────┘                                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CoreResult;
use crate::money::Money;
use crate::pricing;

/// Author string stored when the catalog lists no contributors.
pub const UNKNOWN_AUTHOR: &str = "Unknown Author";

/// Cover reference stored when the catalog has no thumbnail.
pub const PLACEHOLDER_COVER: &str = "/placeholder.svg";

// =============================================================================
// Catalog Item
// =============================================================================

/// A rentable book as supplied by the catalog collaborator.
///
/// Read-only to the core: the cart keeps a copy, orders keep a
/// [`RentedBook`] snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogItem {
    /// Catalog identifier (unique per item).
    pub id: String,

    /// Display title.
    pub title: String,

    /// Contributor names, in catalog order.
    pub authors: Vec<String>,

    /// Cover thumbnail reference.
    pub thumbnail: Option<String>,

    /// Rental price per week.
    pub price: Money,

    /// Availability hint. Not a reservation.
    pub available: bool,
}

impl CatalogItem {
    /// Creates an available item with no authors or thumbnail.
    pub fn new(id: impl Into<String>, title: impl Into<String>, weekly_rate: Money) -> Self {
        CatalogItem {
            id: id.into(),
            title: title.into(),
            authors: Vec::new(),
            thumbnail: None,
            price: weekly_rate,
            available: true,
        }
    }

    /// Creates an item from a raw catalog price.
    ///
    /// Fails with `InvalidPricingInput` when the rate is non-finite or
    /// negative.
    pub fn from_catalog(
        id: impl Into<String>,
        title: impl Into<String>,
        weekly_rate: f64,
    ) -> CoreResult<Self> {
        let price = Money::try_from_f64(weekly_rate)?;
        // Reuse the engine's rate check so both entry points agree.
        pricing::line_total(price, pricing::DAYS_PER_WEEK)?;
        Ok(CatalogItem::new(id, title, price))
    }

    /// Sets the contributor list.
    pub fn with_authors<I, S>(mut self, authors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.authors = authors.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the thumbnail reference.
    pub fn with_thumbnail(mut self, thumbnail: impl Into<String>) -> Self {
        self.thumbnail = Some(thumbnail.into());
        self
    }

    /// Sets the availability hint.
    pub fn with_availability(mut self, available: bool) -> Self {
        self.available = available;
        self
    }

    /// Contributors joined for display, or [`UNKNOWN_AUTHOR`].
    pub fn author_line(&self) -> String {
        if self.authors.is_empty() {
            UNKNOWN_AUTHOR.to_string()
        } else {
            self.authors.join(", ")
        }
    }
}

// =============================================================================
// Rented Book (order line snapshot)
// =============================================================================

/// One line of an order, frozen at creation time.
///
/// A deep copy: later catalog price changes or deletions never touch it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RentedBook {
    pub book_id: String,
    pub title: String,
    pub author: String,
    pub cover_image: String,
    /// Weekly rate at the time of ordering.
    pub price: Money,
    pub rental_days: i64,
    /// `price × rental_days / 7`, unrounded.
    pub total_price: Money,
}

impl RentedBook {
    /// Freezes a catalog item and chosen duration into an order line.
    pub fn snapshot(item: &CatalogItem, rental_days: i64) -> CoreResult<Self> {
        Ok(RentedBook {
            book_id: item.id.clone(),
            title: item.title.clone(),
            author: item.author_line(),
            cover_image: item
                .thumbnail
                .clone()
                .unwrap_or_else(|| PLACEHOLDER_COVER.to_string()),
            price: item.price,
            rental_days,
            total_price: pricing::line_total(item.price, rental_days)?,
        })
    }
}

// =============================================================================
// Roles & Identity
// =============================================================================

/// Role of an authenticated user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Regular customer.
    #[default]
    Shopper,
    /// Back-office user allowed to manage all orders.
    Admin,
}

/// The authenticated actor, as reported by the auth collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    pub uid: String,
    pub email: String,
    pub display_name: String,
    pub role: Role,
}

impl Identity {
    /// Creates a shopper identity.
    pub fn shopper(
        uid: impl Into<String>,
        email: impl Into<String>,
        display_name: impl Into<String>,
    ) -> Self {
        Identity {
            uid: uid.into(),
            email: email.into(),
            display_name: display_name.into(),
            role: Role::Shopper,
        }
    }

    /// Creates an admin identity.
    pub fn admin(
        uid: impl Into<String>,
        email: impl Into<String>,
        display_name: impl Into<String>,
    ) -> Self {
        Identity {
            role: Role::Admin,
            ..Identity::shopper(uid, email, display_name)
        }
    }

    #[inline]
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// A stored user profile (read from the profile collaborator).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub uid: String,
    pub email: String,
    pub full_name: Option<String>,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

impl UserProfile {
    /// The identity this profile authenticates as.
    pub fn identity(&self) -> Identity {
        Identity {
            uid: self.uid.clone(),
            email: self.email.clone(),
            display_name: self.full_name.clone().unwrap_or_else(|| self.email.clone()),
            role: self.role,
        }
    }
}

// =============================================================================
// Shipping Details
// =============================================================================

/// Delivery details collected at the shipping step.
///
/// Every field except `country` is required; see
/// [`crate::validation::validate_shipping_details`].
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingDetails {
    pub full_name: String,
    pub street_address: String,
    pub city: String,
    pub state: String,
    pub postal_code: String,
    pub country: String,
}

impl ShippingDetails {
    /// Flattens the details into the single delivery-address string stored on
    /// the order: `"name, street, city, state postal, country"`.
    pub fn delivery_address(&self) -> String {
        format!(
            "{}, {}, {}, {} {}, {}",
            self.full_name.trim(),
            self.street_address.trim(),
            self.city.trim(),
            self.state.trim(),
            self.postal_code.trim(),
            self.country.trim()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_author_line() {
        let item = CatalogItem::new("b1", "Dune", Money::from_major(5));
        assert_eq!(item.author_line(), UNKNOWN_AUTHOR);

        let item = item.with_authors(["Frank Herbert", "Brian Herbert"]);
        assert_eq!(item.author_line(), "Frank Herbert, Brian Herbert");
    }

    #[test]
    fn test_from_catalog_rejects_bad_rates() {
        assert!(CatalogItem::from_catalog("b1", "Dune", f64::NAN).is_err());
        assert!(CatalogItem::from_catalog("b1", "Dune", -2.0).is_err());
        assert!(CatalogItem::from_catalog("b1", "Dune", 0.0).is_ok());
    }

    #[test]
    fn test_snapshot_freezes_values() {
        let mut item = CatalogItem::new("b1", "Dune", Money::from_major(10))
            .with_authors(["Frank Herbert"])
            .with_thumbnail("http://covers/dune.jpg");
        let book = RentedBook::snapshot(&item, 14).unwrap();

        item.price = Money::from_major(99);
        item.title = "Dune (revised)".to_string();

        assert_eq!(book.title, "Dune");
        assert_eq!(book.price, Money::from_major(10));
        assert_eq!(book.total_price, Money::new(dec!(20)));
        assert_eq!(book.cover_image, "http://covers/dune.jpg");
    }

    #[test]
    fn test_snapshot_placeholder_cover() {
        let item = CatalogItem::new("b1", "Dune", Money::from_major(10));
        let book = RentedBook::snapshot(&item, 7).unwrap();
        assert_eq!(book.cover_image, PLACEHOLDER_COVER);
        assert_eq!(book.author, UNKNOWN_AUTHOR);
    }

    #[test]
    fn test_delivery_address() {
        let details = ShippingDetails {
            full_name: "Asha Rao".to_string(),
            street_address: "12 MG Road".to_string(),
            city: "Pune".to_string(),
            state: "MH".to_string(),
            postal_code: "411001".to_string(),
            country: "India".to_string(),
        };
        assert_eq!(
            details.delivery_address(),
            "Asha Rao, 12 MG Road, Pune, MH 411001, India"
        );
    }

    #[test]
    fn test_profile_identity_falls_back_to_email() {
        let profile = UserProfile {
            uid: "u1".to_string(),
            email: "a@example.com".to_string(),
            full_name: None,
            role: Role::Admin,
            created_at: Utc::now(),
        };
        let identity = profile.identity();
        assert_eq!(identity.display_name, "a@example.com");
        assert!(identity.is_admin());
    }

    #[test]
    fn test_role_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), "\"admin\"");
    }
}
