//! # till-core: Pure Business Logic for till-pos
//!
//! The transaction kernel of the till-pos retail platform. Everything in
//! this crate is a deterministic function over its inputs: given a cart of
//! line selections, a discount, a tax rate, a payment method, and a
//! tendered amount, it either produces a fully populated, invariant-
//! satisfying [`Sale`](types::Sale) or a typed [`SaleError`](error::SaleError).
//!
//! ## Architecture Position
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │  Consoles (admin / shop-owner / cashier)                         │
//! │        │ render validated Sales, never recompute them            │
//! │  ┌─────▼──────────────────────────────────────────────────────┐  │
//! │  │              ★ till-core (THIS CRATE) ★                    │  │
//! │  │                                                            │  │
//! │  │   money ── types ── catalog ── validation ── compose       │  │
//! │  │                                  lifecycle                 │  │
//! │  │                                                            │  │
//! │  │   NO I/O · NO DATABASE · NO NETWORK · PURE FUNCTIONS       │  │
//! │  └─────┬──────────────────────────────────────────────────────┘  │
//! │  ┌─────▼──────────────────────────────────────────────────────┐  │
//! │  │   till-db: SQLite repositories, checkout transaction       │  │
//! │  └────────────────────────────────────────────────────────────┘  │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//!
//! 1. **Pure functions**: same input, same output (ids and timestamps
//!    excepted - those are assigned fresh per composition).
//! 2. **Integer money**: every monetary value is minor units (`i64`
//!    cents). No floating point touches an amount, ever.
//! 3. **One rounding point**: only the tax computation rounds (half to
//!    even); every other derived field is exact integer arithmetic,
//!    finalized once and never re-derived from rounded intermediates.
//! 4. **Explicit errors**: every rejected input names the violated
//!    invariant. No strings, no panics.
//!
//! ## Example
//!
//! ```rust
//! use till_core::catalog::{CatalogEntry, CatalogSnapshot};
//! use till_core::compose::{compose_sale, CheckoutRequest, LineSelection, SaleIntent};
//! use till_core::types::{Cashier, PaymentMethod};
//!
//! let catalog = CatalogSnapshot::from_entries(vec![
//!     CatalogEntry::new("A", "Widget", 1000, 600, 50),
//! ]);
//! let request = CheckoutRequest {
//!     cashier: Cashier::new("c-1", "Amara"),
//!     lines: vec![LineSelection::new("A", 2)],
//!     discount_cents: 0,
//!     tax_rate_bps: 1600,
//!     payment_method: PaymentMethod::Cash,
//!     tendered_cents: 3000,
//!     intent: SaleIntent::Complete,
//! };
//! let sale = compose_sale(&request, &catalog).unwrap();
//! assert_eq!(sale.total_cents, 2320); // (2000 * 1.16)
//! assert_eq!(sale.change_cents, 680);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod catalog;
pub mod compose;
pub mod error;
pub mod lifecycle;
pub mod money;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use catalog::{Catalog, CatalogEntry, CatalogSnapshot, RestockRequest};
pub use compose::{compose_sale, CheckoutRequest, LineSelection, SaleIntent};
pub use error::{SaleError, SaleErrorKind, SaleResult};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Default tenant ID for v0.1 (single-tenant runtime, multi-tenant schema).
///
/// Every record carries a tenant_id so the schema is ready for shared
/// hosting, but the v0.1 runtime always writes this constant. Dynamic
/// tenant resolution replaces it when the shop-owner console goes
/// multi-store.
pub const DEFAULT_TENANT_ID: &str = "00000000-0000-0000-0000-000000000001";

/// Maximum number of distinct lines in a single sale.
///
/// Keeps transaction sizes bounded; a register sale past this width is
/// operator error, not a real basket.
pub const MAX_CART_ITEMS: usize = 100;

/// Maximum quantity for a single line.
///
/// Catches fat-finger quantities (1000 typed instead of 10).
pub const MAX_ITEM_QUANTITY: i64 = 999;
