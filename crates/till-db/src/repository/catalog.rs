//! # Catalog Repository
//!
//! Database operations for catalog items: the source of truth for
//! price, cost, and stock.
//!
//! The composer never reads this table directly - checkout asks for a
//! [`CatalogSnapshot`] (one consistent read) and hands it to the pure
//! core. Stock movement happens here, inside the caller's transaction.

use chrono::Utc;
use sqlx::sqlite::SqliteConnection;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use till_core::catalog::{CatalogEntry, CatalogSnapshot};
use till_core::DEFAULT_TENANT_ID;

/// Row shape for `catalog_items`; converted to the core type at the
/// edge so till-core stays sqlx-free.
#[derive(Debug, sqlx::FromRow)]
struct CatalogRow {
    id: String,
    name: String,
    price_cents: i64,
    cost_cents: i64,
    current_stock: i64,
}

impl From<CatalogRow> for CatalogEntry {
    fn from(row: CatalogRow) -> Self {
        CatalogEntry {
            item_id: row.id,
            name: row.name,
            price_cents: row.price_cents,
            cost_cents: row.cost_cents,
            current_stock: row.current_stock,
        }
    }
}

/// Repository for catalog database operations.
#[derive(Debug, Clone)]
pub struct CatalogRepository {
    pool: SqlitePool,
}

impl CatalogRepository {
    pub fn new(pool: SqlitePool) -> Self {
        CatalogRepository { pool }
    }

    /// Inserts a catalog item.
    pub async fn insert(&self, entry: &CatalogEntry) -> DbResult<()> {
        debug!(item_id = %entry.item_id, "inserting catalog item");
        let now = Utc::now();

        sqlx::query(
            r#"
            INSERT INTO catalog_items (
                id, tenant_id, name, price_cents, cost_cents,
                current_stock, is_active, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, 1, ?7, ?7)
            "#,
        )
        .bind(&entry.item_id)
        .bind(DEFAULT_TENANT_ID)
        .bind(&entry.name)
        .bind(entry.price_cents)
        .bind(entry.cost_cents)
        .bind(entry.current_stock)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Fetches one item by id.
    pub async fn get_by_id(&self, item_id: &str) -> DbResult<Option<CatalogEntry>> {
        let row: Option<CatalogRow> = sqlx::query_as(
            r#"
            SELECT id, name, price_cents, cost_cents, current_stock
            FROM catalog_items
            WHERE id = ?1 AND is_active = 1
            "#,
        )
        .bind(item_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(CatalogEntry::from))
    }

    /// Builds a read-only snapshot covering the given item ids.
    ///
    /// Ids that don't resolve are simply absent from the snapshot; the
    /// composer reports them as `ItemNotFound`. One consistent read per
    /// checkout - the snapshot never mutates afterwards.
    pub async fn snapshot(&self, item_ids: &[&str]) -> DbResult<CatalogSnapshot> {
        let mut entries = Vec::with_capacity(item_ids.len());
        for id in item_ids {
            if let Some(entry) = self.get_by_id(id).await? {
                entries.push(entry);
            }
        }
        debug!(requested = item_ids.len(), resolved = entries.len(), "catalog snapshot");
        Ok(CatalogSnapshot::from_entries(entries))
    }

    /// Lists active items, sorted by name.
    pub async fn list_active(&self, limit: u32) -> DbResult<Vec<CatalogEntry>> {
        let rows: Vec<CatalogRow> = sqlx::query_as(
            r#"
            SELECT id, name, price_cents, cost_cents, current_stock
            FROM catalog_items
            WHERE is_active = 1
            ORDER BY name
            LIMIT ?1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(CatalogEntry::from).collect())
    }

    /// Adds stock back (refund restoration), standalone variant.
    pub async fn restock(&self, item_id: &str, quantity: i64) -> DbResult<()> {
        let mut conn = self.pool.acquire().await?;
        restock_tx(&mut conn, item_id, quantity).await
    }

    /// Current stock for an item; 0 when the item is unknown.
    pub async fn current_stock(&self, item_id: &str) -> DbResult<i64> {
        let stock: Option<i64> =
            sqlx::query_scalar("SELECT current_stock FROM catalog_items WHERE id = ?1")
                .bind(item_id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(stock.unwrap_or(0))
    }
}

// =============================================================================
// Transaction-Scoped Helpers
// =============================================================================

/// Guarded stock decrement bound to the caller's transaction.
///
/// Returns `false` (and changes nothing) when the item is missing or
/// has fewer units than requested - the guard and the decrement are one
/// statement, so concurrent registers cannot both take the last unit.
pub(crate) async fn take_stock_tx(
    conn: &mut SqliteConnection,
    item_id: &str,
    quantity: i64,
) -> DbResult<bool> {
    let result = sqlx::query(
        r#"
        UPDATE catalog_items
        SET current_stock = current_stock - ?2, updated_at = ?3
        WHERE id = ?1 AND current_stock >= ?2
        "#,
    )
    .bind(item_id)
    .bind(quantity)
    .bind(Utc::now())
    .execute(&mut *conn)
    .await?;

    Ok(result.rows_affected() == 1)
}

/// Stock restoration bound to the caller's transaction. Errors if the
/// item no longer exists - a refund must never silently drop units.
pub(crate) async fn restock_tx(
    conn: &mut SqliteConnection,
    item_id: &str,
    quantity: i64,
) -> DbResult<()> {
    debug!(item_id = %item_id, quantity = quantity, "restocking");

    let result = sqlx::query(
        r#"
        UPDATE catalog_items
        SET current_stock = current_stock + ?2, updated_at = ?3
        WHERE id = ?1
        "#,
    )
    .bind(item_id)
    .bind(quantity)
    .bind(Utc::now())
    .execute(&mut *conn)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::not_found("catalog item", item_id));
    }
    Ok(())
}

/// Stock read bound to the caller's transaction (for error reporting
/// after a failed guarded decrement).
pub(crate) async fn current_stock_tx(
    conn: &mut SqliteConnection,
    item_id: &str,
) -> DbResult<i64> {
    let stock: Option<i64> =
        sqlx::query_scalar("SELECT current_stock FROM catalog_items WHERE id = ?1")
            .bind(item_id)
            .fetch_optional(&mut *conn)
            .await?;
    Ok(stock.unwrap_or(0))
}

// =============================================================================
// Unit Tests
// =============================================================================
