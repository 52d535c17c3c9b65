//! # State Module
//!
//! Per-shopper state held by the storefront.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    State Architecture                                   │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐    │
//! │  │                      ShopperSession                             │    │
//! │  │                                                                 │    │
//! │  │   ┌──────────────┐  ┌──────────────┐  ┌──────────────────┐      │    │
//! │  │   │  CartStore   │  │ CheckoutFlow │  │ Option<Identity> │      │    │
//! │  │   │  lines +     │  │ step +       │  │ signed-in        │      │    │
//! │  │   │  events      │  │ shipping     │  │ shopper          │      │    │
//! │  │   └──────────────┘  └──────────────┘  └──────────────────┘      │    │
//! │  └─────────────────────────────────────────────────────────────────┘    │
//! │                                                                         │
//! │  OWNERSHIP:                                                             │
//! │  • One session per shopper, mutated through &mut (no locks)             │
//! │  • Stores and the payment gateway live in the services, not here        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod session;

pub use session::ShopperSession;
