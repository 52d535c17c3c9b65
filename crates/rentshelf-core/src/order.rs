//! # Order Lifecycle
//!
//! Orders, their status enum and the rules around who may read or change
//! them.
//!
//! ## Status Model
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Order Status                                     │
//! │                                                                         │
//! │   create_order ──► PENDING                                              │
//! │                       │                                                 │
//! │                       ▼   admin may set ANY status from ANY status      │
//! │        ┌──────────────┼──────────────┬──────────────┐                   │
//! │        ▼              ▼              ▼              ▼                   │
//! │   CONFIRMED      DELIVERED      RETURNED      CANCELLED                 │
//! │                                                                         │
//! │   One guard: authorize_status_change(actor) → actor must be Admin.      │
//! │   No transition graph, so a mistaken "delivered" can be corrected.      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Payment is captured before an order exists, so every order starts with
//! `payment_status = completed`.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::types::{Identity, RentedBook};
use crate::validation::{validate_required, ValidationResult};

// =============================================================================
// Status Enums
// =============================================================================

/// Fulfilment status of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    /// Set at creation.
    #[default]
    Pending,
    Confirmed,
    /// Books become downloadable.
    Delivered,
    Returned,
    Cancelled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 5] = [
        OrderStatus::Pending,
        OrderStatus::Confirmed,
        OrderStatus::Delivered,
        OrderStatus::Returned,
        OrderStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Returned => "returned",
            OrderStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OrderStatus::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ValidationError::InvalidFormat {
                field: "status".to_string(),
                reason: format!("unknown order status '{s}'"),
            })
    }
}

/// Payment status recorded on an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Completed,
    Failed,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Completed => "completed",
            PaymentStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// New Order (creation request)
// =============================================================================

/// Everything needed to create an order after payment capture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrder {
    pub shopper_id: String,
    pub shopper_email: String,
    pub shopper_name: String,
    /// Frozen line snapshot.
    pub books: Vec<RentedBook>,
    pub total_amount: Money,
    pub delivery_address: String,
    pub payment_reference: Option<String>,
}

impl NewOrder {
    /// Checks the fields an order cannot exist without.
    pub fn validate(&self) -> ValidationResult<()> {
        validate_required("shopper_id", &self.shopper_id)?;
        if self.books.is_empty() {
            return Err(ValidationError::Empty {
                field: "books".to_string(),
            });
        }
        Ok(())
    }
}

// =============================================================================
// Order
// =============================================================================

/// A placed rental order.
///
/// Only `status`, `payment_status` and `updated_at` change after creation.
/// Orders are never deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: String,
    pub shopper_id: String,
    pub shopper_email: String,
    pub shopper_name: String,
    pub books: Vec<RentedBook>,
    pub total_amount: Money,
    pub status: OrderStatus,
    pub delivery_address: String,
    pub payment_status: PaymentStatus,
    pub payment_reference: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub return_due_date: DateTime<Utc>,
}

impl Order {
    /// Builds a new order from a creation request.
    ///
    /// Sets `status = pending`, `payment_status = completed`, and a return
    /// date `return_window_days` after `now`. The id is a fresh UUID v4.
    ///
    /// ## Errors
    /// `Validation` for an empty shopper id or an empty line snapshot.
    pub fn place(new_order: NewOrder, now: DateTime<Utc>, return_window_days: i64) -> CoreResult<Order> {
        new_order.validate()?;

        Ok(Order {
            id: Uuid::new_v4().to_string(),
            shopper_id: new_order.shopper_id,
            shopper_email: new_order.shopper_email,
            shopper_name: new_order.shopper_name,
            books: new_order.books,
            total_amount: new_order.total_amount,
            status: OrderStatus::Pending,
            delivery_address: new_order.delivery_address,
            payment_status: PaymentStatus::Completed,
            payment_reference: new_order.payment_reference,
            created_at: now,
            updated_at: None,
            return_due_date: now + Duration::days(return_window_days),
        })
    }

    /// Applies a status change. Callers check authorization first.
    pub fn set_status(&mut self, status: OrderStatus, now: DateTime<Utc>) {
        self.status = status;
        self.updated_at = Some(now);
    }

    pub fn is_owned_by(&self, shopper_id: &str) -> bool {
        self.shopper_id == shopper_id
    }
}

// =============================================================================
// Authorization Guards
// =============================================================================

/// The single guard on status changes: admins only.
pub fn authorize_status_change(actor: &Identity) -> CoreResult<()> {
    if actor.is_admin() {
        Ok(())
    } else {
        Err(CoreError::unauthorized("update order status"))
    }
}

/// Only the owning shopper or an admin may read an order.
pub fn authorize_order_read(order: &Order, actor: &Identity) -> CoreResult<()> {
    if actor.is_admin() || order.is_owned_by(&actor.uid) {
        Ok(())
    } else {
        Err(CoreError::unauthorized("read another shopper's order"))
    }
}

/// Only the shopper themself or an admin may list a shopper's orders.
pub fn authorize_shopper_access(shopper_id: &str, actor: &Identity) -> CoreResult<()> {
    if actor.is_admin() || actor.uid == shopper_id {
        Ok(())
    } else {
        Err(CoreError::unauthorized("list another shopper's orders"))
    }
}

/// Listing every order is an admin view.
pub fn authorize_admin_view(actor: &Identity) -> CoreResult<()> {
    if actor.is_admin() {
        Ok(())
    } else {
        Err(CoreError::unauthorized("list all orders"))
    }
}

// =============================================================================
// Filtering & Reports
// =============================================================================

/// Status tab plus free-text search, as used by the order views.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderFilter {
    pub status: Option<OrderStatus>,
    /// Case-insensitive match against order id, shopper email or name.
    pub query: Option<String>,
}

impl OrderFilter {
    pub fn with_status(status: OrderStatus) -> Self {
        OrderFilter {
            status: Some(status),
            query: None,
        }
    }

    pub fn matches(&self, order: &Order) -> bool {
        if self.status.is_some_and(|s| s != order.status) {
            return false;
        }

        match self.query.as_deref().map(str::trim) {
            None | Some("") => true,
            Some(query) => {
                let needle = query.to_lowercase();
                [&order.id, &order.shopper_email, &order.shopper_name]
                    .iter()
                    .any(|field| field.to_lowercase().contains(&needle))
            }
        }
    }

    /// Keeps the matching orders, preserving their order.
    pub fn apply(&self, orders: Vec<Order>) -> Vec<Order> {
        orders.into_iter().filter(|o| self.matches(o)).collect()
    }
}

/// A book the shopper can download, tagged with the order it came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadableBook {
    pub order_id: String,
    #[serde(flatten)]
    pub book: RentedBook,
}

/// Flattens the books of every delivered order.
pub fn downloadable_books(orders: &[Order]) -> Vec<DownloadableBook> {
    orders
        .iter()
        .filter(|order| order.status == OrderStatus::Delivered)
        .flat_map(|order| {
            order.books.iter().map(|book| DownloadableBook {
                order_id: order.id.clone(),
                book: book.clone(),
            })
        })
        .collect()
}
