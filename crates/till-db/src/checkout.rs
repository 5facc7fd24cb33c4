//! # Checkout Service
//!
//! Ties the pure composer to the database and supplies the atomicity
//! the core deliberately doesn't: saving a sale and moving stock happen
//! in one transaction or not at all.
//!
//! ## Flow
//! ```text
//! CheckoutRequest
//!      │
//!      ▼
//! catalog snapshot (one consistent read)
//!      │
//!      ▼
//! compose_sale (pure - all validation happens here)
//!      │
//!      ▼
//! BEGIN ── insert sale + items ── take stock per line ── COMMIT
//!      └───────────── any failure rolls back everything ─────────┘
//! ```
//!
//! Held sales never reserve stock; stock moves when a sale completes
//! and moves back exactly once when it refunds.

use thiserror::Error;
use tracing::{info, warn};

use crate::error::DbError;
use crate::pool::Database;
use crate::repository::{catalog, sale};
use till_core::compose::{compose_sale, CheckoutRequest, SaleIntent};
use till_core::error::SaleError;
use till_core::types::Sale;

// =============================================================================
// Service Error
// =============================================================================

/// What the register sees when a checkout-layer operation fails.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// The composer rejected the input; carries the violated invariant.
    #[error(transparent)]
    Sale(#[from] SaleError),

    /// The database failed underneath us.
    #[error(transparent)]
    Db(#[from] DbError),

    /// The referenced sale does not exist.
    #[error("sale not found: {sale_id}")]
    SaleNotFound { sale_id: String },

    /// A line wants more units than the shelf has. The whole checkout
    /// rolled back.
    #[error("insufficient stock for {item_id}: available {available}, requested {requested}")]
    InsufficientStock {
        item_id: String,
        available: i64,
        requested: i64,
    },
}

/// Raw sqlx failures (begin/commit) fold into the Db variant.
impl From<sqlx::Error> for CheckoutError {
    fn from(err: sqlx::Error) -> Self {
        CheckoutError::Db(DbError::from(err))
    }
}

pub type CheckoutResult<T> = Result<T, CheckoutError>;

// =============================================================================
// Service
// =============================================================================

/// Checkout orchestration over a [`Database`].
#[derive(Debug, Clone)]
pub struct Checkout {
    db: Database,
}

impl Checkout {
    pub fn new(db: Database) -> Self {
        Checkout { db }
    }

    /// Composes, persists, and (for completing sales) takes stock - all
    /// in one transaction. The returned [`Sale`] is exactly what was
    /// persisted.
    pub async fn checkout(&self, request: &CheckoutRequest) -> CheckoutResult<Sale> {
        let item_ids: Vec<&str> = request.lines.iter().map(|l| l.item_id.as_str()).collect();
        let snapshot = self.db.catalog().snapshot(&item_ids).await?;

        // Pure composition; every validation failure surfaces here,
        // before anything is written.
        let sale = compose_sale(request, &snapshot)?;

        let mut tx = self.db.pool().begin().await?;
        sale::insert_sale_tx(&mut tx, &sale).await?;

        if request.intent == SaleIntent::Complete {
            take_stock_for(&mut tx, &sale).await?;
        }

        tx.commit().await?;

        info!(
            sale_id = %sale.id,
            receipt = %sale.receipt_number,
            total_cents = sale.total_cents,
            lines = sale.items.len(),
            status = ?sale.status,
            "checkout committed"
        );
        Ok(sale)
    }

    /// Completes a held sale: payment collected now, stock taken now.
    pub async fn complete_held(&self, sale_id: &str, tendered_cents: i64) -> CheckoutResult<Sale> {
        let mut sale = self.load(sale_id).await?;
        sale.complete(tendered_cents)?;

        let mut tx = self.db.pool().begin().await?;
        sale::apply_transition_tx(&mut tx, &sale).await?;
        take_stock_for(&mut tx, &sale).await?;
        tx.commit().await?;

        info!(sale_id = %sale.id, "held sale completed");
        Ok(sale)
    }

    /// Cancels a held sale. No payment, no stock movement.
    pub async fn cancel_held(&self, sale_id: &str) -> CheckoutResult<Sale> {
        let mut sale = self.load(sale_id).await?;
        sale.cancel()?;

        self.db.sales().apply_transition(&sale).await?;

        info!(sale_id = %sale.id, "held sale cancelled");
        Ok(sale)
    }

    /// Refunds a completed sale: records the reason and restores stock,
    /// one restock per line item, exactly once, in one transaction.
    pub async fn refund(&self, sale_id: &str, reason: &str) -> CheckoutResult<Sale> {
        let mut sale = self.load(sale_id).await?;
        let restocks = sale.refund(reason)?;

        let mut tx = self.db.pool().begin().await?;
        sale::apply_transition_tx(&mut tx, &sale).await?;
        for restock in &restocks {
            catalog::restock_tx(&mut tx, &restock.item_id, restock.quantity).await?;
        }
        tx.commit().await?;

        info!(sale_id = %sale.id, lines = restocks.len(), "sale refunded, stock restored");
        Ok(sale)
    }

    async fn load(&self, sale_id: &str) -> CheckoutResult<Sale> {
        self.db
            .sales()
            .get_by_id(sale_id)
            .await?
            .ok_or_else(|| CheckoutError::SaleNotFound {
                sale_id: sale_id.to_string(),
            })
    }
}

/// Takes stock for every line of a completing sale on the caller's
/// transaction; the first short shelf aborts the lot.
async fn take_stock_for(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    sale: &Sale,
) -> CheckoutResult<()> {
    for item in &sale.items {
        if !catalog::take_stock_tx(&mut **tx, &item.item_id, item.quantity).await? {
            let available = catalog::current_stock_tx(&mut **tx, &item.item_id).await?;
            warn!(
                item_id = %item.item_id,
                available,
                requested = item.quantity,
                "checkout rolled back: insufficient stock"
            );
            return Err(CheckoutError::InsufficientStock {
                item_id: item.item_id.clone(),
                available,
                requested: item.quantity,
            });
        }
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
