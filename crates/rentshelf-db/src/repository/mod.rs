//! # Repository Module
//!
//! Database repository implementations for Rentshelf.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  OrderService ──► Arc<dyn OrderStore> ──► OrderRepository               │
//! │                                           ├── insert (one transaction)  │
//! │                                           ├── get_by_id                 │
//! │                                           ├── list_by_shopper/list_all  │
//! │                                           └── update_status             │
//! │                                                                         │
//! │  OrderService ──► Arc<dyn ProfileStore> ─► UserRepository               │
//! │                                           ├── get_by_uid                │
//! │                                           └── get_by_email / insert     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Queries are plain runtime `sqlx::query` calls bound by position.

pub mod order;
pub mod user;

use std::str::FromStr;

use rust_decimal::Decimal;

use crate::error::{DbError, DbResult};

/// Reads a decimal TEXT column back into a `Decimal`.
pub(crate) fn parse_decimal(column: &str, value: &str) -> DbResult<Decimal> {
    Decimal::from_str(value).map_err(|_| DbError::invalid_data(column, value))
}
