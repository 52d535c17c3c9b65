//! # rentshelf-db: Database Layer for Rentshelf
//!
//! SQLite persistence for orders and user profiles, exposed to the rest of
//! the workspace through the core's `OrderStore` and `ProfileStore` ports.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Rentshelf Data Flow                              │
//! │                                                                         │
//! │  OrderService::create_order (storefront)                                │
//! │       │  via Arc<dyn OrderStore>                                        │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐    │
//! │  │                   rentshelf-db (THIS CRATE)                     │    │
//! │  │                                                                 │    │
//! │  │   ┌───────────────┐    ┌────────────────┐   ┌───────────────┐   │    │
//! │  │   │   Database    │    │  Repositories  │   │  Migrations   │   │    │
//! │  │   │   (pool.rs)   │◄───│ OrderRepo      │   │  (embedded)   │   │    │
//! │  │   │  SqlitePool   │    │ UserRepo       │   │ 001_init.sql  │   │    │
//! │  │   └───────────────┘    └────────────────┘   └───────────────┘   │    │
//! │  └─────────────────────────────────────────────────────────────────┘    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite file (RENTSHELF_DATABASE_PATH)                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use rentshelf_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("rentshelf.db")).await?;
//! let orders = db.orders().list_by_shopper("uid-123").await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

pub use repository::order::OrderRepository;
pub use repository::user::UserRepository;
