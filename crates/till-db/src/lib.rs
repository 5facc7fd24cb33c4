//! # till-db: Persistence Layer for till-pos
//!
//! SQLite storage for the transaction kernel.
//!
//! ## Architecture Position
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │  till-core: pure composition and validation                      │
//! │       │ Sale / CatalogSnapshot / RestockRequest                  │
//! │  ┌────▼─────────────────────────────────────────────────────┐    │
//! │  │                till-db (THIS CRATE)                      │    │
//! │  │                                                          │    │
//! │  │  pool ── migrations ── repositories ── checkout service  │    │
//! │  │  SqlitePool  embedded    catalog, sale   one-transaction │    │
//! │  │  WAL mode    .sql files                  sale + stock    │    │
//! │  └────┬─────────────────────────────────────────────────────┘    │
//! │       ▼                                                          │
//! │  SQLite file (or :memory: in tests)                              │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use till_db::{Checkout, Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("./data/till.db")).await?;
//! let checkout = Checkout::new(db);
//! let sale = checkout.checkout(&request).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod checkout;
pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use checkout::{Checkout, CheckoutError};
pub use error::DbError;
pub use pool::{Database, DbConfig};
pub use repository::catalog::CatalogRepository;
pub use repository::sale::SaleRepository;
