//! # Cart Store
//!
//! The shopper's rental cart: one line per catalog item, each with a chosen
//! rental duration.
//!
//! ## Cart Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Store Operations                                │
//! │                                                                         │
//! │  Shopper Action           CartStore               State Change          │
//! │  ──────────────           ─────────               ────────────          │
//! │                                                                         │
//! │  Click "Rent" ───────────► add_item() ──────────► lines.push(line)      │
//! │                               │                                         │
//! │                               └─ same id? ──────► no change,            │
//! │                                                   AlreadyInCart notice  │
//! │                                                                         │
//! │  Pick a tier ────────────► update_rental_days() ► lines[i].days = d     │
//! │                                                                         │
//! │  Click Remove ───────────► remove_item() ───────► lines.remove(i)       │
//! │                                                                         │
//! │  Order placed ───────────► clear() ─────────────► lines.clear()         │
//! │                                                                         │
//! │  View Cart ──────────────► snapshot() ──────────► (read only)           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The store is a plain owned value. The session that owns it mutates it
//! through `&mut`, so every operation is atomic from the shopper's view.
//! Notifications for the UI layer queue up in the store until
//! [`CartStore::drain_events`] collects them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::pricing;
use crate::types::CatalogItem;
use crate::DEFAULT_RENTAL_DAYS;

// =============================================================================
// Line Items
// =============================================================================

/// One catalog item plus its chosen rental duration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLineItem {
    /// Copy of the catalog item as it was when added.
    pub item: CatalogItem,

    /// Rental duration in days (always > 0).
    pub rental_days: i64,

    /// When this line was added.
    pub added_at: DateTime<Utc>,
}

impl CartLineItem {
    /// Price of this line for its current duration.
    pub fn line_total(&self) -> CoreResult<Money> {
        pricing::line_total(self.item.price, self.rental_days)
    }
}

/// What `add_item` did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AddOutcome {
    /// A new line was appended.
    Added,
    /// The item was already in the cart; nothing changed.
    AlreadyInCart,
}

/// Notification for the UI layer (rendered as a toast).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum CartEvent {
    Added { item_id: String, title: String },
    AlreadyInCart { item_id: String, title: String },
    Removed { item_id: String, title: String },
}

impl CartEvent {
    /// Shopper-facing text for the notice.
    pub fn message(&self) -> String {
        match self {
            CartEvent::Added { title, .. } => format!("{title} has been added to your cart"),
            CartEvent::AlreadyInCart { title, .. } => format!("{title} is already in your cart"),
            CartEvent::Removed { title, .. } => format!("{title} has been removed from your cart"),
        }
    }
}

// =============================================================================
// Snapshot
// =============================================================================

/// A cart line with its computed price.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricedLine {
    #[serde(flatten)]
    pub line: CartLineItem,
    pub line_total: Money,
}

/// Immutable view of the cart, recomputed on every call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartSnapshot {
    pub lines: Vec<PricedLine>,
    pub total_line_count: usize,
    pub total_amount: Money,
}

impl CartSnapshot {
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

// =============================================================================
// Cart Store
// =============================================================================

/// The shopping cart.
///
/// ## Invariants
/// - Lines are unique by catalog id (a second add is a no-op, never a merge)
/// - `rental_days > 0` on every line
/// - Lines stay in insertion order; removal drops the slot only
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartStore {
    lines: Vec<CartLineItem>,

    #[serde(skip)]
    events: Vec<CartEvent>,
}

impl CartStore {
    /// Creates an empty cart.
    pub fn new() -> Self {
        CartStore::default()
    }

    /// Adds a catalog item for `rental_days` (7 when `None`).
    ///
    /// ## Behavior
    /// - Item already present: returns `AlreadyInCart`, the existing line
    ///   keeps its duration
    /// - Otherwise: appends a new line and returns `Added`
    ///
    /// ## Errors
    /// `InvalidPricingInput` for an explicit `rental_days <= 0`. The cart is
    /// unchanged.
    pub fn add_item(&mut self, item: CatalogItem, rental_days: Option<i64>) -> CoreResult<AddOutcome> {
        let rental_days = rental_days.unwrap_or(DEFAULT_RENTAL_DAYS);
        if rental_days <= 0 {
            return Err(CoreError::pricing(format!(
                "rental days must be positive, got {rental_days}"
            )));
        }

        if self.contains(&item.id) {
            self.events.push(CartEvent::AlreadyInCart {
                item_id: item.id,
                title: item.title,
            });
            return Ok(AddOutcome::AlreadyInCart);
        }

        self.events.push(CartEvent::Added {
            item_id: item.id.clone(),
            title: item.title.clone(),
        });
        self.lines.push(CartLineItem {
            item,
            rental_days,
            added_at: Utc::now(),
        });
        Ok(AddOutcome::Added)
    }

    /// Removes the line for `item_id`.
    ///
    /// Returns `false` (and emits nothing) when the item is not in the cart.
    pub fn remove_item(&mut self, item_id: &str) -> bool {
        let Some(index) = self.position(item_id) else {
            return false;
        };

        let removed = self.lines.remove(index);
        self.events.push(CartEvent::Removed {
            item_id: removed.item.id,
            title: removed.item.title,
        });
        true
    }

    /// Replaces the rental duration of the line for `item_id`.
    ///
    /// Returns `Ok(false)` when the item is not in the cart. Tier membership
    /// is not checked here.
    ///
    /// ## Errors
    /// `InvalidPricingInput` for `days <= 0`; the line keeps its prior value.
    pub fn update_rental_days(&mut self, item_id: &str, days: i64) -> CoreResult<bool> {
        if days <= 0 {
            return Err(CoreError::pricing(format!(
                "rental days must be positive, got {days}"
            )));
        }

        match self.lines.iter_mut().find(|l| l.item.id == item_id) {
            Some(line) => {
                line.rental_days = days;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Empties the cart.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Prices the current lines.
    pub fn snapshot(&self) -> CoreResult<CartSnapshot> {
        let lines = self
            .lines
            .iter()
            .map(|line| {
                Ok(PricedLine {
                    line: line.clone(),
                    line_total: line.line_total()?,
                })
            })
            .collect::<CoreResult<Vec<_>>>()?;

        let total_amount = lines.iter().map(|l| l.line_total).sum();

        Ok(CartSnapshot {
            total_line_count: lines.len(),
            total_amount,
            lines,
        })
    }

    /// Takes the queued notifications, oldest first.
    pub fn drain_events(&mut self) -> Vec<CartEvent> {
        std::mem::take(&mut self.events)
    }

    /// Current lines in insertion order.
    pub fn lines(&self) -> &[CartLineItem] {
        &self.lines
    }

    pub fn contains(&self, item_id: &str) -> bool {
        self.position(item_id).is_some()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    fn position(&self, item_id: &str) -> Option<usize> {
        self.lines.iter().position(|l| l.item.id == item_id)
    }
}
