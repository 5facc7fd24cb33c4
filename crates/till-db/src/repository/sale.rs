//! # Sale Repository
//!
//! Database operations for sales and their line items.
//!
//! A sale is written whole: the sale row and every item row go through
//! one transaction, fail-closed - a partially visible sale never exists.
//! Line items carry a `position` column because entry order is part of
//! the record's meaning and insertion timestamps cannot be trusted to
//! order items added in the same millisecond.

use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteConnection;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use till_core::types::{CartItem, PaymentMethod, Sale, SaleStatus};

// =============================================================================
// Row Shapes
// =============================================================================

/// Scalar columns of `sales`; items are loaded separately and attached.
#[derive(Debug, sqlx::FromRow)]
struct SaleRow {
    id: String,
    tenant_id: String,
    receipt_number: String,
    cashier_id: String,
    cashier_name: String,
    status: SaleStatus,
    subtotal_cents: i64,
    tax_rate_bps: u32,
    tax_cents: i64,
    discount_cents: i64,
    total_cents: i64,
    payment_method: PaymentMethod,
    tendered_cents: i64,
    change_cents: i64,
    profit_cents: i64,
    refund_reason: Option<String>,
    created_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
}

impl SaleRow {
    fn into_sale(self, items: Vec<CartItem>) -> Sale {
        Sale {
            id: self.id,
            tenant_id: self.tenant_id,
            receipt_number: self.receipt_number,
            cashier_id: self.cashier_id,
            cashier_name: self.cashier_name,
            items,
            subtotal_cents: self.subtotal_cents,
            tax_rate_bps: self.tax_rate_bps,
            tax_cents: self.tax_cents,
            discount_cents: self.discount_cents,
            total_cents: self.total_cents,
            payment_method: self.payment_method,
            tendered_cents: self.tendered_cents,
            change_cents: self.change_cents,
            profit_cents: self.profit_cents,
            status: self.status,
            refund_reason: self.refund_reason,
            created_at: self.created_at,
            completed_at: self.completed_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct SaleItemRow {
    item_id: String,
    name_snapshot: String,
    unit_price_cents: i64,
    quantity: i64,
    line_total_cents: i64,
}

impl From<SaleItemRow> for CartItem {
    fn from(row: SaleItemRow) -> Self {
        CartItem {
            item_id: row.item_id,
            name: row.name_snapshot,
            unit_price_cents: row.unit_price_cents,
            quantity: row.quantity,
            line_total_cents: row.line_total_cents,
        }
    }
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for sale database operations.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
}

impl SaleRepository {
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository { pool }
    }

    /// Persists a composed sale - sale row plus every item row in one
    /// transaction. Returns the sale id.
    pub async fn save(&self, sale: &Sale) -> DbResult<String> {
        let mut tx = self.pool.begin().await?;
        insert_sale_tx(&mut tx, sale).await?;
        tx.commit().await?;

        debug!(sale_id = %sale.id, receipt = %sale.receipt_number, "sale saved");
        Ok(sale.id.clone())
    }

    /// Loads a sale with its items in entry order.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Sale>> {
        let row: Option<SaleRow> = sqlx::query_as(
            r#"
            SELECT id, tenant_id, receipt_number, cashier_id, cashier_name,
                   status, subtotal_cents, tax_rate_bps, tax_cents,
                   discount_cents, total_cents, payment_method,
                   tendered_cents, change_cents, profit_cents,
                   refund_reason, created_at, completed_at
            FROM sales
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let items = self.get_items(id).await?;
        Ok(Some(row.into_sale(items)))
    }

    /// Items for a sale, in entry order.
    async fn get_items(&self, sale_id: &str) -> DbResult<Vec<CartItem>> {
        let rows: Vec<SaleItemRow> = sqlx::query_as(
            r#"
            SELECT item_id, name_snapshot, unit_price_cents, quantity, line_total_cents
            FROM sale_items
            WHERE sale_id = ?1
            ORDER BY position
            "#,
        )
        .bind(sale_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(CartItem::from).collect())
    }

    /// Persists the columns a lifecycle transition may change.
    pub async fn apply_transition(&self, sale: &Sale) -> DbResult<()> {
        let mut conn = self.pool.acquire().await?;
        apply_transition_tx(&mut conn, sale).await
    }

    /// Most recent sales first, items attached.
    pub async fn list_recent(&self, limit: u32) -> DbResult<Vec<Sale>> {
        let rows: Vec<SaleRow> = sqlx::query_as(
            r#"
            SELECT id, tenant_id, receipt_number, cashier_id, cashier_name,
                   status, subtotal_cents, tax_rate_bps, tax_cents,
                   discount_cents, total_cents, payment_method,
                   tendered_cents, change_cents, profit_cents,
                   refund_reason, created_at, completed_at
            FROM sales
            ORDER BY created_at DESC
            LIMIT ?1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        let mut sales = Vec::with_capacity(rows.len());
        for row in rows {
            let items = self.get_items(&row.id).await?;
            sales.push(row.into_sale(items));
        }
        Ok(sales)
    }
}

// =============================================================================
// Transaction-Scoped Helpers
// =============================================================================

/// Inserts the sale row and all item rows on the caller's transaction.
pub(crate) async fn insert_sale_tx(conn: &mut SqliteConnection, sale: &Sale) -> DbResult<()> {
    sqlx::query(
        r#"
        INSERT INTO sales (
            id, tenant_id, receipt_number, cashier_id, cashier_name,
            status, subtotal_cents, tax_rate_bps, tax_cents,
            discount_cents, total_cents, payment_method,
            tendered_cents, change_cents, profit_cents,
            refund_reason, created_at, completed_at
        ) VALUES (
            ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9,
            ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18
        )
        "#,
    )
    .bind(&sale.id)
    .bind(&sale.tenant_id)
    .bind(&sale.receipt_number)
    .bind(&sale.cashier_id)
    .bind(&sale.cashier_name)
    .bind(sale.status)
    .bind(sale.subtotal_cents)
    .bind(sale.tax_rate_bps)
    .bind(sale.tax_cents)
    .bind(sale.discount_cents)
    .bind(sale.total_cents)
    .bind(sale.payment_method)
    .bind(sale.tendered_cents)
    .bind(sale.change_cents)
    .bind(sale.profit_cents)
    .bind(&sale.refund_reason)
    .bind(sale.created_at)
    .bind(sale.completed_at)
    .execute(&mut *conn)
    .await?;

    for (position, item) in sale.items.iter().enumerate() {
        sqlx::query(
            r#"
            INSERT INTO sale_items (
                id, sale_id, position, item_id, name_snapshot,
                unit_price_cents, quantity, line_total_cents
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(&sale.id)
        .bind(position as i64)
        .bind(&item.item_id)
        .bind(&item.name)
        .bind(item.unit_price_cents)
        .bind(item.quantity)
        .bind(item.line_total_cents)
        .execute(&mut *conn)
        .await?;
    }

    Ok(())
}

/// Updates the transition-mutable columns on the caller's transaction.
pub(crate) async fn apply_transition_tx(
    conn: &mut SqliteConnection,
    sale: &Sale,
) -> DbResult<()> {
    let result = sqlx::query(
        r#"
        UPDATE sales SET
            status = ?2,
            tendered_cents = ?3,
            change_cents = ?4,
            refund_reason = ?5,
            completed_at = ?6
        WHERE id = ?1
        "#,
    )
    .bind(&sale.id)
    .bind(sale.status)
    .bind(sale.tendered_cents)
    .bind(sale.change_cents)
    .bind(&sale.refund_reason)
    .bind(sale.completed_at)
    .execute(&mut *conn)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::not_found("sale", &sale.id));
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use till_core::catalog::{CatalogEntry, CatalogSnapshot};
    use till_core::compose::{compose_sale, CheckoutRequest, LineSelection, SaleIntent};
    use till_core::types::Cashier;

    async fn db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    fn composed_sale() -> Sale {
        let catalog = CatalogSnapshot::from_entries(vec![
            CatalogEntry::new("A", "Beans 500g", 1000, 600, 40),
            CatalogEntry::new("B", "Sugar 1kg", 500, 300, 25),
        ]);
        let request = CheckoutRequest {
            cashier: Cashier::new("c-7", "Naledi"),
            lines: vec![LineSelection::new("A", 2), LineSelection::new("B", 1)],
            discount_cents: 0,
            tax_rate_bps: 1600,
            payment_method: PaymentMethod::Cash,
            tendered_cents: 3000,
            intent: SaleIntent::Complete,
        };
        compose_sale(&request, &catalog).unwrap()
    }

    #[tokio::test]
    async fn save_and_load_round_trip() {
        let db = db().await;
        let repo = db.sales();

        let sale = composed_sale();
        let id = repo.save(&sale).await.unwrap();
        assert_eq!(id, sale.id);

        let loaded = repo.get_by_id(&id).await.unwrap().unwrap();
        assert_eq!(loaded.id, sale.id);
        assert_eq!(loaded.receipt_number, sale.receipt_number);
        assert_eq!(loaded.items, sale.items);
        assert_eq!(loaded.subtotal_cents, 2500);
        assert_eq!(loaded.tax_cents, 400);
        assert_eq!(loaded.total_cents, 2900);
        assert_eq!(loaded.change_cents, 100);
        assert_eq!(loaded.profit_cents, 1000);
        assert_eq!(loaded.payment_method, PaymentMethod::Cash);
        assert_eq!(loaded.status, SaleStatus::Completed);
        loaded.check_invariants().unwrap();
    }

    #[tokio::test]
    async fn load_preserves_entry_order() {
        let db = db().await;
        let repo = db.sales();

        let sale = composed_sale();
        repo.save(&sale).await.unwrap();

        let loaded = repo.get_by_id(&sale.id).await.unwrap().unwrap();
        let ids: Vec<&str> = loaded.items.iter().map(|i| i.item_id.as_str()).collect();
        assert_eq!(ids, vec!["A", "B"]);
    }

    #[tokio::test]
    async fn missing_sale_is_none() {
        let db = db().await;
        assert!(db.sales().get_by_id("nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn transition_persists() {
        let db = db().await;
        let repo = db.sales();

        let mut sale = composed_sale();
        repo.save(&sale).await.unwrap();

        sale.refund("damaged").unwrap();
        repo.apply_transition(&sale).await.unwrap();

        let loaded = repo.get_by_id(&sale.id).await.unwrap().unwrap();
        assert_eq!(loaded.status, SaleStatus::Refunded);
        assert_eq!(loaded.refund_reason.as_deref(), Some("damaged"));
    }

    #[tokio::test]
    async fn list_recent_returns_saved_sales() {
        let db = db().await;
        let repo = db.sales();

        let a = composed_sale();
        let b = composed_sale();
        repo.save(&a).await.unwrap();
        repo.save(&b).await.unwrap();

        let recent = repo.list_recent(10).await.unwrap();
        assert_eq!(recent.len(), 2);
        assert!(recent.iter().all(|s| !s.items.is_empty()));
    }
}
