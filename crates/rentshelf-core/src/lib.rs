//! # rentshelf-core: Pure Business Logic for the Rentshelf Storefront
//!
//! Pricing, cart, checkout and order rules for a book-rental storefront,
//! with zero I/O.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Rentshelf Architecture                             │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐    │
//! │  │                 storefront (orchestration)                      │    │
//! │  │   ShopperSession ──► CheckoutService ──► OrderService           │    │
//! │  └─────────────────────────────┬───────────────────────────────────┘    │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐    │
//! │  │             ★ rentshelf-core (THIS CRATE) ★                     │    │
//! │  │                                                                 │    │
//! │  │   ┌─────────┐  ┌──────────┐  ┌──────────┐  ┌──────────────┐     │    │
//! │  │   │ pricing │  │   cart   │  │ checkout │  │    order     │     │    │
//! │  │   │  Money  │  │CartStore │  │   Flow   │  │ OrderStatus  │     │    │
//! │  │   └─────────┘  └──────────┘  └──────────┘  └──────────────┘     │    │
//! │  │                                                                 │    │
//! │  │   ports: OrderStore • ProfileStore • PaymentGateway (traits)    │    │
//! │  └─────────────────────────────┬───────────────────────────────────┘    │
//! │                                │ implements ports                       │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐    │
//! │  │                  rentshelf-db (SQLite)                          │    │
//! │  └─────────────────────────────────────────────────────────────────┘    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`money`] - Decimal `Money` newtype
//! - [`pricing`] - Weekly-rate line totals and currency formatting
//! - [`cart`] - The shopper's cart
//! - [`checkout`] - Checkout state machine
//! - [`order`] - Orders, statuses and access rules
//! - [`ports`] - Traits for persistence and payment collaborators
//! - [`types`] - Catalog items, identities, shipping details
//! - [`validation`] - Shipping and order field checks
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use rentshelf_core::cart::CartStore;
//! use rentshelf_core::types::CatalogItem;
//! use rentshelf_core::Money;
//!
//! let mut cart = CartStore::new();
//! cart.add_item(CatalogItem::new("a", "Dune", Money::from_major(21)), Some(7)).unwrap();
//! cart.add_item(CatalogItem::new("b", "Emma", Money::from_major(10)), Some(14)).unwrap();
//!
//! assert_eq!(cart.snapshot().unwrap().total_amount, Money::from_major(41));
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod checkout;
pub mod error;
pub mod money;
pub mod order;
pub mod ports;
pub mod pricing;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use cart::{AddOutcome, CartEvent, CartSnapshot, CartStore};
pub use checkout::{CheckoutError, CheckoutFlow, CheckoutStep};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use order::{NewOrder, Order, OrderFilter, OrderStatus, PaymentStatus};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Rental durations offered by the storefront, in days.
///
/// Only the tier picker uses this list. Pricing accepts any positive count.
pub const RENTAL_TIERS: [i64; 4] = [7, 14, 21, 30];

/// Duration used when a book is added without picking a tier.
pub const DEFAULT_RENTAL_DAYS: i64 = 7;

/// Days between order creation and the return due date.
pub const RETURN_WINDOW_DAYS: i64 = 30;
