//! # Rentshelf Storefront
//!
//! Orchestration layer for the book-rental storefront: configuration,
//! logging, shopper sessions and the async order and checkout services.
//!
//! ## Module Organization
//! ```text
//! rentshelf_storefront/
//! ├── lib.rs          ◄─── You are here (startup & wiring)
//! ├── config.rs       ◄─── Environment configuration
//! ├── error.rs        ◄─── API error type for the presentation layer
//! ├── memory.rs       ◄─── In-process stores and payment gateway
//! ├── state/
//! │   ├── mod.rs      ◄─── State type exports
//! │   └── session.rs  ◄─── ShopperSession (cart + checkout + identity)
//! └── services/
//!     ├── mod.rs      ◄─── Service exports
//!     ├── orders.rs   ◄─── OrderService
//!     └── checkout.rs ◄─── CheckoutService ("Pay Now")
//! ```
//!
//! ## Startup Sequence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Storefront Startup                                │
//! │                                                                         │
//! │  1. StorefrontConfig::load() ─────────────────────────────────────────► │
//! │     • RENTSHELF_* variables, defaults otherwise                         │
//! │                                                                         │
//! │  2. init_tracing(&config) ────────────────────────────────────────────► │
//! │     • RUST_LOG if set, else RENTSHELF_LOG                               │
//! │                                                                         │
//! │  3. Storefront::build(config, gateway) ───────────────────────────────► │
//! │     • database_path set: SQLite (WAL, migrations)                       │
//! │     • otherwise: in-memory stores                                       │
//! │                                                                         │
//! │  4. storefront.new_session() per shopper ─────────────────────────────► │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod error;
pub mod memory;
pub mod services;
pub mod state;

use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;

use rentshelf_core::ports::{OrderStore, PaymentGateway, ProfileStore};
use rentshelf_db::{Database, DbConfig, DbError};

use config::StorefrontConfig;
use memory::{InMemoryOrderStore, InMemoryProfileStore};
use services::{CheckoutService, OrderService};
use state::ShopperSession;

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=rentshelf_db=trace` - Trace the database crate only
/// - Default: `config.log_level`
pub fn init_tracing(config: &StorefrontConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Wired-up storefront: configuration plus the services over the chosen
/// persistence backend.
#[derive(Clone)]
pub struct Storefront {
    config: StorefrontConfig,
    orders: OrderService,
    checkout: CheckoutService,
    database: Option<Database>,
}

impl Storefront {
    /// Connects the persistence backend and builds the services.
    pub async fn build(
        config: StorefrontConfig,
        gateway: Arc<dyn PaymentGateway>,
    ) -> Result<Storefront, DbError> {
        let (order_store, profile_store, database): (
            Arc<dyn OrderStore>,
            Arc<dyn ProfileStore>,
            Option<Database>,
        ) = match &config.database_path {
            Some(path) => {
                let db = Database::new(DbConfig::new(path)).await?;
                (Arc::new(db.orders()), Arc::new(db.users()), Some(db))
            }
            None => {
                info!("No database path configured, using in-memory stores");
                (
                    Arc::new(InMemoryOrderStore::new()),
                    Arc::new(InMemoryProfileStore::new()),
                    None,
                )
            }
        };

        let orders = OrderService::new(order_store, profile_store)
            .with_return_window(config.return_window_days);
        let checkout = CheckoutService::new(orders.clone(), gateway);

        info!(
            currency = %config.currency,
            persistent = database.is_some(),
            "Storefront ready"
        );

        Ok(Storefront {
            config,
            orders,
            checkout,
            database,
        })
    }

    /// A fresh anonymous session charging in the configured currency.
    pub fn new_session(&self) -> ShopperSession {
        ShopperSession::new(self.config.currency.clone())
    }

    pub fn config(&self) -> &StorefrontConfig {
        &self.config
    }

    pub fn orders(&self) -> &OrderService {
        &self.orders
    }

    pub fn checkout(&self) -> &CheckoutService {
        &self.checkout
    }

    /// The SQLite handle, when one is configured.
    pub fn database(&self) -> Option<&Database> {
        self.database.as_ref()
    }

    pub async fn shutdown(&self) {
        if let Some(db) = &self.database {
            db.close().await;
        }
    }
}
