//! # Services
//!
//! Async orchestration over the collaborator ports.
//!
//! - `orders`: order lifecycle with per-actor authorization
//! - `checkout`: payment capture followed by order persistence

mod checkout;
mod orders;

pub use checkout::CheckoutService;
pub use orders::OrderService;
