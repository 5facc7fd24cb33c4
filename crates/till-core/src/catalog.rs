//! # Catalog Seam
//!
//! The composer never owns item data; it consumes a read-only view of
//! the catalog supplied by the caller. This module defines that seam.
//!
//! ## Consistency Model
//! ```text
//! caller builds a snapshot ──► compose_sale reads it ──► Sale
//!        (one consistent read)      (pure, no I/O)
//! ```
//! The composer does not define catalog locking or inventory
//! reservation; it consumes a fixed snapshot and guarantees its own
//! arithmetic is deterministic against it. Stock movement is the
//! persistence layer's transaction.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use ts_rs::TS;

// =============================================================================
// Catalog Entry
// =============================================================================

/// One item as the catalog knows it: the source of truth for price,
/// cost, and stock at lookup time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CatalogEntry {
    /// Stable identifier, opaque to the composer.
    pub item_id: String,
    /// Display name, copied onto sale lines as a snapshot.
    pub name: String,
    /// Unit selling price in cents.
    pub price_cents: i64,
    /// Unit cost in cents, consumed for profit computation only.
    pub cost_cents: i64,
    /// Units on hand. The composer reads it for nothing; the checkout
    /// transaction decrements it.
    pub current_stock: i64,
}

impl CatalogEntry {
    pub fn new(
        item_id: impl Into<String>,
        name: impl Into<String>,
        price_cents: i64,
        cost_cents: i64,
        current_stock: i64,
    ) -> Self {
        CatalogEntry {
            item_id: item_id.into(),
            name: name.into(),
            price_cents,
            cost_cents,
            current_stock,
        }
    }
}

// =============================================================================
// Catalog Trait
// =============================================================================

/// Read-only item resolution.
///
/// `None` means the identifier does not resolve; the composer turns that
/// into `ItemNotFound` and aborts the whole sale.
pub trait Catalog {
    fn lookup(&self, item_id: &str) -> Option<&CatalogEntry>;
}

// =============================================================================
// Catalog Snapshot
// =============================================================================

/// An immutable in-memory catalog view.
///
/// This is the shape every caller hands the composer: the persistence
/// layer builds one per checkout from a single consistent read, and
/// tests build one from literals. There is no process-wide mutable
/// catalog anywhere.
#[derive(Debug, Clone, Default)]
pub struct CatalogSnapshot {
    entries: BTreeMap<String, CatalogEntry>,
}

impl CatalogSnapshot {
    /// Builds a snapshot from a list of entries. Later duplicates of an
    /// item id replace earlier ones.
    pub fn from_entries(entries: impl IntoIterator<Item = CatalogEntry>) -> Self {
        CatalogSnapshot {
            entries: entries
                .into_iter()
                .map(|e| (e.item_id.clone(), e))
                .collect(),
        }
    }

    /// Number of items in the snapshot.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Catalog for CatalogSnapshot {
    fn lookup(&self, item_id: &str) -> Option<&CatalogEntry> {
        self.entries.get(item_id)
    }
}

// =============================================================================
// Restock Request
// =============================================================================

/// An inventory-restoration instruction emitted by a refund.
///
/// The lifecycle returns one request per line item, in entry order, and
/// the surrounding transaction must apply each exactly once. Keeping the
/// I/O out of the core preserves the pure-function rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct RestockRequest {
    pub item_id: String,
    pub quantity: i64,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_lookup() {
        let snapshot = CatalogSnapshot::from_entries(vec![
            CatalogEntry::new("A", "Widget", 1000, 600, 50),
            CatalogEntry::new("B", "Gadget", 500, 300, 10),
        ]);

        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot.lookup("A").unwrap().name, "Widget");
        assert_eq!(snapshot.lookup("B").unwrap().price_cents, 500);
        assert!(snapshot.lookup("C").is_none());
    }

    #[test]
    fn snapshot_later_duplicate_wins() {
        let snapshot = CatalogSnapshot::from_entries(vec![
            CatalogEntry::new("A", "Old", 1000, 600, 50),
            CatalogEntry::new("A", "New", 1100, 600, 50),
        ]);

        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot.lookup("A").unwrap().name, "New");
    }

    #[test]
    fn empty_snapshot() {
        let snapshot = CatalogSnapshot::default();
        assert!(snapshot.is_empty());
        assert!(snapshot.lookup("anything").is_none());
    }
}
