//! # Seed Data Generator
//!
//! Populates a SQLite database with demo profiles and rentals.
//!
//! ## Usage
//! ```bash
//! # Admin plus 3 shoppers (default)
//! cargo run -p rentshelf-storefront --bin seed
//!
//! # Custom amount and database path
//! cargo run -p rentshelf-storefront --bin seed -- --shoppers 10 --db ./data/rentshelf.db
//! ```
//!
//! ## Generated Data
//! - One admin profile (`--admin-email`)
//! - `--shoppers` shopper profiles: `reader{N}@example.com`
//! - One delivered rental per shopper, placed through the normal checkout
//!   with an always-approving payment gateway

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use tracing::{info, warn};
use uuid::Uuid;

use rentshelf_core::{CatalogItem, Identity, OrderStatus, Role, ShippingDetails, UserProfile, RENTAL_TIERS};
use rentshelf_db::{Database, DbConfig};
use rentshelf_storefront::config::StorefrontConfig;
use rentshelf_storefront::init_tracing;
use rentshelf_storefront::memory::ApprovingGateway;
use rentshelf_storefront::services::{CheckoutService, OrderService};
use rentshelf_storefront::state::ShopperSession;

/// Demo catalog: (id, title, author, weekly rate)
const CATALOG: &[(&str, &str, &str, f64)] = &[
    ("vol-dune", "Dune", "Frank Herbert", 4.99),
    ("vol-emma", "Emma", "Jane Austen", 2.49),
    ("vol-beloved", "Beloved", "Toni Morrison", 3.99),
    ("vol-ficciones", "Ficciones", "Jorge Luis Borges", 3.25),
    ("vol-middlemarch", "Middlemarch", "George Eliot", 2.99),
    ("vol-neuromancer", "Neuromancer", "William Gibson", 4.49),
    ("vol-godan", "Godaan", "Munshi Premchand", 1.99),
];

const CITIES: &[(&str, &str, &str)] = &[
    ("Pune", "MH", "411001"),
    ("Austin", "TX", "73301"),
    ("Leeds", "WYK", "LS1 1UR"),
];

#[derive(Parser)]
#[command(author, version, about = "Rentshelf seed data generator", long_about = None)]
struct Cli {
    /// Database file path
    #[arg(short, long, default_value = "./rentshelf_dev.db")]
    db: PathBuf,

    /// Email of the admin profile
    #[arg(long, default_value = "admin@rentshelf.dev")]
    admin_email: String,

    /// Number of demo shoppers
    #[arg(short, long, default_value_t = 3)]
    shoppers: usize,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = StorefrontConfig::load().context("invalid RENTSHELF_* configuration")?;
    init_tracing(&config);

    info!(db = %cli.db.display(), shoppers = cli.shoppers, "Seeding database");

    let db = Database::new(DbConfig::new(&cli.db))
        .await
        .context("failed to open database")?;

    let existing = db.orders().count().await?;
    if existing > 0 {
        warn!(existing, "Database already has orders, skipping seed");
        return Ok(());
    }

    let admin = ensure_profile(&db, &cli.admin_email, "Shelf Admin", Role::Admin).await?;

    let orders = OrderService::new(Arc::new(db.orders()), Arc::new(db.users()))
        .with_return_window(config.return_window_days);
    let checkout = CheckoutService::new(orders.clone(), Arc::new(ApprovingGateway::new()));

    let mut placed = 0;
    for n in 0..cli.shoppers {
        let email = format!("reader{}@example.com", n + 1);
        let name = format!("Reader {}", n + 1);
        let shopper = ensure_profile(&db, &email, &name, Role::Shopper).await?;

        let mut session = ShopperSession::new(config.currency.clone());
        session.sign_in(shopper);

        // Two books per shopper, cycling through catalog and tiers
        for offset in 0..2 {
            let (id, title, author, rate) = CATALOG[(n * 2 + offset) % CATALOG.len()];
            let item = CatalogItem::from_catalog(id, title, rate)?.with_authors([author]);
            let days = RENTAL_TIERS[(n + offset) % RENTAL_TIERS.len()];
            session.add_to_cart(item, Some(days))?;
        }

        let (city, state, postal_code) = CITIES[n % CITIES.len()];
        session.proceed_to_shipping()?;
        session.submit_shipping(ShippingDetails {
            full_name: name.clone(),
            street_address: format!("{} Library Lane", n + 10),
            city: city.to_string(),
            state: state.to_string(),
            postal_code: postal_code.to_string(),
            country: "Demo".to_string(),
        })?;

        let order = checkout.place_order(&mut session).await?;
        orders
            .update_status(&order.id, OrderStatus::Delivered, &admin)
            .await?;

        info!(order_id = %order.id, shopper = %email, total = %order.total_amount, "Seeded rental");
        placed += 1;
    }

    info!(
        placed,
        total = db.orders().count().await?,
        "Seed complete"
    );
    db.close().await;

    Ok(())
}

/// Returns the identity for `email`, creating its profile when missing.
async fn ensure_profile(db: &Database, email: &str, name: &str, role: Role) -> Result<Identity> {
    let users = db.users();

    if let Some(profile) = users.get_by_email(email).await? {
        info!(email, "Profile exists, reusing");
        return Ok(profile.identity());
    }

    let profile = UserProfile {
        uid: Uuid::new_v4().to_string(),
        email: email.to_string(),
        full_name: Some(name.to_string()),
        role,
        created_at: Utc::now(),
    };
    users.insert(&profile).await?;
    Ok(profile.identity())
}
