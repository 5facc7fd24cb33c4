//! # Sale Composition
//!
//! Turns a raw checkout request plus a catalog snapshot into a complete,
//! invariant-satisfying [`Sale`] - or a [`SaleError`] naming exactly
//! what was wrong. All-or-nothing: no partial sale ever escapes.
//!
//! ## Pipeline
//! ```text
//! CheckoutRequest ──► resolve lines against snapshot (abort on miss)
//!                 ──► line totals, subtotal, profit      (exact)
//!                 ──► discount check, taxable base       (exact)
//!                 ──► tax = base × rate                  (rounds once)
//!                 ──► total, payment check, change       (exact)
//!                 ──► fresh id + receipt number + timestamps
//! ```
//!
//! Derived fields are finalized exactly once, in this order, and never
//! re-derived from an already-rounded value - compounding error across
//! subtotal/tax/total is structurally impossible.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::catalog::Catalog;
use crate::error::{SaleError, SaleResult};
use crate::money::Money;
use crate::types::{CartItem, Cashier, PaymentMethod, Sale, SaleStatus, TaxRate};
use crate::{validation, DEFAULT_TENANT_ID};

// =============================================================================
// Request Types
// =============================================================================

/// One requested line: which item, how many.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct LineSelection {
    pub item_id: String,
    pub quantity: i64,
}

impl LineSelection {
    pub fn new(item_id: impl Into<String>, quantity: i64) -> Self {
        LineSelection {
            item_id: item_id.into(),
            quantity,
        }
    }
}

/// Whether the cashier is finishing the sale now or parking it.
///
/// Always caller-specified, never inferred. The only difference in
/// composition is the payment-sufficiency requirement, which a parked
/// sale defers until completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum SaleIntent {
    /// Take payment now; produces a `Completed` sale.
    Complete,
    /// Park the sale; produces a `Held` sale awaiting completion.
    Hold,
}

/// Everything the composer needs, gathered wholesale before it runs.
///
/// The cart is supplied as a finished list - there is no interleaved
/// mutation during composition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CheckoutRequest {
    /// Operator composing the sale.
    pub cashier: Cashier,
    /// Lines in entry order.
    pub lines: Vec<LineSelection>,
    /// Flat amount off the subtotal, before tax. Defaults to 0.
    pub discount_cents: i64,
    /// Tax rate in basis points (see [`TaxRate::from_fraction`] for the
    /// fractional input form).
    pub tax_rate_bps: u32,
    pub payment_method: PaymentMethod,
    /// Amount the customer handed over.
    pub tendered_cents: i64,
    pub intent: SaleIntent,
}

// =============================================================================
// Composition
// =============================================================================

/// Composes and validates a complete [`Sale`] from a checkout request.
///
/// Pure and deterministic against a fixed catalog snapshot: identical
/// inputs yield identical sales except for `id`, `receipt_number`, and
/// timestamps. Every failure is returned before any record exists.
///
/// ## Example
/// ```rust
/// use till_core::catalog::{CatalogEntry, CatalogSnapshot};
/// use till_core::compose::{compose_sale, CheckoutRequest, LineSelection, SaleIntent};
/// use till_core::types::{Cashier, PaymentMethod, SaleStatus};
///
/// let catalog = CatalogSnapshot::from_entries(vec![
///     CatalogEntry::new("A", "Beans 500g", 1000, 600, 40),
///     CatalogEntry::new("B", "Sugar 1kg", 500, 300, 25),
/// ]);
/// let request = CheckoutRequest {
///     cashier: Cashier::new("c-7", "Naledi"),
///     lines: vec![LineSelection::new("A", 2), LineSelection::new("B", 1)],
///     discount_cents: 0,
///     tax_rate_bps: 1600,
///     payment_method: PaymentMethod::Cash,
///     tendered_cents: 3000,
///     intent: SaleIntent::Complete,
/// };
///
/// let sale = compose_sale(&request, &catalog).unwrap();
/// assert_eq!(sale.subtotal_cents, 2500);
/// assert_eq!(sale.tax_cents, 400);
/// assert_eq!(sale.total_cents, 2900);
/// assert_eq!(sale.change_cents, 100);
/// assert_eq!(sale.profit_cents, 1000);
/// assert_eq!(sale.status, SaleStatus::Completed);
/// ```
pub fn compose_sale<C: Catalog>(request: &CheckoutRequest, catalog: &C) -> SaleResult<Sale> {
    validation::validate_cashier(&request.cashier)?;
    validation::validate_cart_width(request.lines.len())?;
    validation::validate_tax_rate_bps(request.tax_rate_bps)?;

    // Resolve every line before anything else. A single unresolvable id
    // aborts the whole sale.
    let mut items = Vec::with_capacity(request.lines.len());
    let mut subtotal = Money::zero();
    let mut profit = Money::zero();

    for line in &request.lines {
        validation::validate_quantity(&line.item_id, line.quantity)?;

        let entry = catalog
            .lookup(&line.item_id)
            .ok_or_else(|| SaleError::ItemNotFound {
                item_id: line.item_id.clone(),
            })?;

        let unit_price = Money::from_cents(entry.price_cents);
        let unit_cost = Money::from_cents(entry.cost_cents);
        let line_total = unit_price * line.quantity;

        subtotal += line_total;
        profit += (unit_price - unit_cost) * line.quantity;

        // Snapshot name and price so the record survives catalog edits.
        items.push(CartItem {
            item_id: line.item_id.clone(),
            name: entry.name.clone(),
            unit_price_cents: entry.price_cents,
            quantity: line.quantity,
            line_total_cents: line_total.cents(),
        });
    }

    validation::validate_discount(request.discount_cents, subtotal.cents())?;

    // Discount applies to the subtotal; tax applies to the discounted
    // base. Tax is the single rounded figure.
    let taxable = subtotal - Money::from_cents(request.discount_cents);
    let tax = taxable.tax_amount(TaxRate::from_bps(request.tax_rate_bps));
    let total = taxable + tax;

    let now = Utc::now();

    let (status, tendered, change, completed_at) = match request.intent {
        SaleIntent::Complete => {
            validation::validate_tendered(request.tendered_cents)?;
            if request.tendered_cents < total.cents() {
                return Err(SaleError::InsufficientPayment {
                    required_cents: total.cents(),
                    tendered_cents: request.tendered_cents,
                });
            }
            (
                SaleStatus::Completed,
                request.tendered_cents,
                request.tendered_cents - total.cents(),
                Some(now),
            )
        }
        // A parked sale defers the sufficiency check to completion;
        // whatever was tendered so far is recorded, change is not
        // computed until the sale completes.
        SaleIntent::Hold => {
            if request.tendered_cents < 0 {
                return Err(SaleError::InvalidPaymentAmount {
                    tendered_cents: request.tendered_cents,
                });
            }
            (SaleStatus::Held, request.tendered_cents, 0, None)
        }
    };

    let id = Uuid::new_v4();

    Ok(Sale {
        id: id.to_string(),
        tenant_id: DEFAULT_TENANT_ID.to_string(),
        receipt_number: receipt_number(&now, &id),
        cashier_id: request.cashier.id.clone(),
        cashier_name: request.cashier.name.clone(),
        items,
        subtotal_cents: subtotal.cents(),
        tax_rate_bps: request.tax_rate_bps,
        tax_cents: tax.cents(),
        discount_cents: request.discount_cents,
        total_cents: total.cents(),
        payment_method: request.payment_method,
        tendered_cents: tendered,
        change_cents: change,
        profit_cents: profit.cents(),
        status,
        refund_reason: None,
        created_at: now,
        completed_at,
    })
}

/// Receipt number: `YYYYMMDD-HHMMSS-XXXX`, date part from the sale
/// timestamp, suffix from the sale id so two sales in the same second
/// stay distinct.
fn receipt_number(at: &DateTime<Utc>, id: &Uuid) -> String {
    let suffix: String = id
        .simple()
        .to_string()
        .chars()
        .take(4)
        .collect::<String>()
        .to_uppercase();
    format!("{}-{}", at.format("%Y%m%d-%H%M%S"), suffix)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{CatalogEntry, CatalogSnapshot};

    fn catalog() -> CatalogSnapshot {
        CatalogSnapshot::from_entries(vec![
            CatalogEntry::new("A", "Beans 500g", 1000, 600, 40),
            CatalogEntry::new("B", "Sugar 1kg", 500, 300, 25),
            CatalogEntry::new("LOSS", "Promo crate", 200, 900, 10),
        ])
    }

    fn request() -> CheckoutRequest {
        CheckoutRequest {
            cashier: Cashier::new("c-7", "Naledi"),
            lines: vec![LineSelection::new("A", 2), LineSelection::new("B", 1)],
            discount_cents: 0,
            tax_rate_bps: 1600,
            payment_method: PaymentMethod::Cash,
            tendered_cents: 3000,
            intent: SaleIntent::Complete,
        }
    }

    #[test]
    fn worked_example_completes() {
        // 2×$10.00 + 1×$5.00, 16% tax, $30.00 cash
        let sale = compose_sale(&request(), &catalog()).unwrap();

        assert_eq!(sale.subtotal_cents, 2500);
        assert_eq!(sale.tax_cents, 400);
        assert_eq!(sale.total_cents, 2900);
        assert_eq!(sale.change_cents, 100);
        assert_eq!(sale.profit_cents, 1000); // (10−6)×2 + (5−3)×1 dollars
        assert_eq!(sale.status, SaleStatus::Completed);
        assert_eq!(sale.tendered_cents, 3000);
        assert!(sale.completed_at.is_some());
        assert_eq!(sale.items.len(), 2);
        assert_eq!(sale.items[0].name, "Beans 500g");
        assert_eq!(sale.items[0].line_total_cents, 2000);
    }

    #[test]
    fn worked_example_rejects_short_payment() {
        let mut req = request();
        req.tendered_cents = 2000;

        let err = compose_sale(&req, &catalog()).unwrap_err();
        assert_eq!(
            err,
            SaleError::InsufficientPayment {
                required_cents: 2900,
                tendered_cents: 2000,
            }
        );
    }

    #[test]
    fn unknown_item_aborts_whole_sale() {
        let mut req = request();
        req.lines.push(LineSelection::new("NOPE", 1));

        let err = compose_sale(&req, &catalog()).unwrap_err();
        assert_eq!(
            err,
            SaleError::ItemNotFound {
                item_id: "NOPE".into()
            }
        );
    }

    #[test]
    fn zero_and_negative_quantities_rejected() {
        let mut req = request();
        req.lines[0].quantity = 0;
        assert!(matches!(
            compose_sale(&req, &catalog()),
            Err(SaleError::InvalidQuantity { quantity: 0, .. })
        ));

        req.lines[0].quantity = -2;
        assert!(matches!(
            compose_sale(&req, &catalog()),
            Err(SaleError::InvalidQuantity { quantity: -2, .. })
        ));
    }

    #[test]
    fn empty_cart_rejected() {
        let mut req = request();
        req.lines.clear();
        assert_eq!(compose_sale(&req, &catalog()), Err(SaleError::EmptyCart));
    }

    #[test]
    fn discount_over_subtotal_rejected() {
        let mut req = request();
        req.discount_cents = 2501; // subtotal is 2500

        let err = compose_sale(&req, &catalog()).unwrap_err();
        assert_eq!(
            err,
            SaleError::InvalidDiscount {
                discount_cents: 2501,
                subtotal_cents: 2500,
            }
        );

        req.discount_cents = -1;
        assert!(matches!(
            compose_sale(&req, &catalog()),
            Err(SaleError::InvalidDiscount { .. })
        ));
    }

    #[test]
    fn discount_applies_before_tax() {
        let mut req = request();
        req.discount_cents = 500;
        req.tendered_cents = 2500;

        let sale = compose_sale(&req, &catalog()).unwrap();
        // base = 2500−500 = 2000; tax = 2000×16% = 320; total = 2320
        assert_eq!(sale.subtotal_cents, 2500);
        assert_eq!(sale.tax_cents, 320);
        assert_eq!(sale.total_cents, 2320);
        assert_eq!(sale.change_cents, 180);
    }

    #[test]
    fn full_discount_makes_tax_zero() {
        let mut req = request();
        req.discount_cents = 2500;
        req.tendered_cents = 100;

        let sale = compose_sale(&req, &catalog()).unwrap();
        assert_eq!(sale.tax_cents, 0);
        assert_eq!(sale.total_cents, 0);
        assert_eq!(sale.change_cents, 100);
    }

    #[test]
    fn tax_rate_over_one_rejected() {
        let mut req = request();
        req.tax_rate_bps = 10_001;
        assert!(matches!(
            compose_sale(&req, &catalog()),
            Err(SaleError::InvalidTaxRate { bps: 10_001 })
        ));
    }

    #[test]
    fn loss_leader_profit_goes_negative() {
        let mut req = request();
        req.lines = vec![LineSelection::new("LOSS", 3)];
        req.tendered_cents = 1000;

        let sale = compose_sale(&req, &catalog()).unwrap();
        // (200−900)×3 = −2100
        assert_eq!(sale.profit_cents, -2100);
    }

    #[test]
    fn hold_waives_payment_sufficiency() {
        let mut req = request();
        req.intent = SaleIntent::Hold;
        req.tendered_cents = 0;

        let sale = compose_sale(&req, &catalog()).unwrap();
        assert_eq!(sale.status, SaleStatus::Held);
        assert_eq!(sale.tendered_cents, 0);
        assert_eq!(sale.change_cents, 0);
        assert!(sale.completed_at.is_none());
    }

    #[test]
    fn hold_still_rejects_negative_tender() {
        let mut req = request();
        req.intent = SaleIntent::Hold;
        req.tendered_cents = -1;
        assert!(matches!(
            compose_sale(&req, &catalog()),
            Err(SaleError::InvalidPaymentAmount { .. })
        ));
    }

    #[test]
    fn complete_rejects_zero_tender() {
        let mut req = request();
        req.discount_cents = 2500; // total due is 0
        req.tendered_cents = 0;
        assert!(matches!(
            compose_sale(&req, &catalog()),
            Err(SaleError::InvalidPaymentAmount { tendered_cents: 0 })
        ));
    }

    #[test]
    fn blank_cashier_rejected() {
        let mut req = request();
        req.cashier = Cashier::new("", "Naledi");
        assert_eq!(compose_sale(&req, &catalog()), Err(SaleError::MissingCashier));
    }

    #[test]
    fn composition_is_deterministic_modulo_identity() {
        let a = compose_sale(&request(), &catalog()).unwrap();
        let b = compose_sale(&request(), &catalog()).unwrap();

        assert_ne!(a.id, b.id);

        // Everything except identity and timestamps matches.
        assert_eq!(a.items, b.items);
        assert_eq!(a.subtotal_cents, b.subtotal_cents);
        assert_eq!(a.tax_cents, b.tax_cents);
        assert_eq!(a.total_cents, b.total_cents);
        assert_eq!(a.change_cents, b.change_cents);
        assert_eq!(a.profit_cents, b.profit_cents);
        assert_eq!(a.status, b.status);
    }

    #[test]
    fn entry_order_is_preserved() {
        let mut req = request();
        req.lines = vec![
            LineSelection::new("B", 1),
            LineSelection::new("A", 1),
            LineSelection::new("B", 2),
        ];
        req.tendered_cents = 10_000;

        let sale = compose_sale(&req, &catalog()).unwrap();
        let ids: Vec<&str> = sale.items.iter().map(|i| i.item_id.as_str()).collect();
        assert_eq!(ids, vec!["B", "A", "B"]);
    }

    #[test]
    fn receipt_number_shape() {
        let sale = compose_sale(&request(), &catalog()).unwrap();
        // YYYYMMDD-HHMMSS-XXXX
        let parts: Vec<&str> = sale.receipt_number.split('-').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0].len(), 8);
        assert_eq!(parts[1].len(), 6);
        assert_eq!(parts[2].len(), 4);
    }
}
