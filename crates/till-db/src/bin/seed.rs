//! # Seed Data Generator
//!
//! Populates `catalog_items` with sample inventory for development.
//!
//! ## Usage
//! ```bash
//! # Default database path (./data/till.db)
//! cargo run -p till-db --bin seed
//!
//! # Custom path
//! cargo run -p till-db --bin seed -- --db ./till.db
//! ```

use std::env;

use till_core::catalog::CatalogEntry;
use till_db::{Database, DbConfig};
use tracing::info;

/// (id, name, price_cents, cost_cents, stock)
const SAMPLE_ITEMS: &[(&str, &str, i64, i64, i64)] = &[
    ("BEV-COLA-330", "Cola 330ml", 250, 140, 120),
    ("BEV-WATER-500", "Still Water 500ml", 150, 60, 200),
    ("BEV-JUICE-1L", "Orange Juice 1L", 520, 310, 45),
    ("GRO-BEANS-500", "Beans 500g", 1000, 600, 40),
    ("GRO-SUGAR-1KG", "Sugar 1kg", 500, 300, 60),
    ("GRO-RICE-2KG", "Rice 2kg", 1450, 980, 35),
    ("GRO-FLOUR-1KG", "Wheat Flour 1kg", 620, 410, 50),
    ("SNK-CHIPS", "Potato Chips 120g", 380, 210, 80),
    ("SNK-BISCUITS", "Tea Biscuits", 290, 150, 95),
    ("DRY-MILK-1L", "Whole Milk 1L", 480, 330, 70),
    ("DRY-EGGS-12", "Eggs (dozen)", 720, 520, 30),
    ("HSH-SOAP", "Bar Soap", 340, 180, 110),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let db_path = parse_db_path().unwrap_or_else(|| "./data/till.db".to_string());

    info!(path = %db_path, "seeding catalog");

    if let Some(parent) = std::path::Path::new(&db_path).parent() {
        std::fs::create_dir_all(parent)?;
    }

    let db = Database::new(DbConfig::new(&db_path)).await?;
    let repo = db.catalog();

    let mut inserted = 0usize;
    for &(id, name, price, cost, stock) in SAMPLE_ITEMS {
        let entry = CatalogEntry::new(id, name, price, cost, stock);
        match repo.insert(&entry).await {
            Ok(()) => inserted += 1,
            // Re-running against an already seeded database is fine
            Err(till_db::DbError::UniqueViolation { .. }) => {
                info!(item_id = %id, "already present, skipping");
            }
            Err(e) => return Err(e.into()),
        }
    }

    info!(inserted, total = SAMPLE_ITEMS.len(), "seed complete");
    db.close().await;
    Ok(())
}

/// Reads `--db <path>` from argv.
fn parse_db_path() -> Option<String> {
    let args: Vec<String> = env::args().collect();
    args.iter()
        .position(|a| a == "--db")
        .and_then(|i| args.get(i + 1).cloned())
}
