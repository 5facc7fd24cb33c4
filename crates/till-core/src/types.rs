//! # Domain Types
//!
//! Core domain types for the till-pos transaction kernel.
//!
//! ## Type Map
//! ```text
//! ┌────────────────────────────────────────────────────────────────────┐
//! │  TaxRate        basis points, 825 = 8.25%                          │
//! │  Cashier        operator identity, frozen onto each Sale           │
//! │  PaymentMethod  cash | card | mobile_money                         │
//! │  SaleStatus     held | completed | cancelled | refunded            │
//! │  CartItem       one line: catalog snapshot × quantity              │
//! │  Sale           the finished record, every derived field in cents  │
//! └────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dual-Key Identity
//! A `Sale` has both `id` (UUID v4, immutable, used for relations) and
//! `receipt_number` (human-readable business id printed on receipts).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{SaleError, SaleResult};
use crate::money::Money;

// =============================================================================
// Tax Rate
// =============================================================================

/// Tax rate in basis points: 1 bp = 0.01%, so 825 = 8.25% and
/// 10,000 = 100%.
///
/// Rates arrive from configuration either as basis points or as a
/// fraction in [0, 1]; both checked constructors reject anything above
/// 100%.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TaxRate(u32);

/// Upper bound for a valid rate: 10,000 bps = 100%.
pub const MAX_TAX_RATE_BPS: u32 = 10_000;

impl TaxRate {
    /// Creates a tax rate from basis points without range checking.
    ///
    /// Prefer [`TaxRate::try_from_bps`] at input boundaries.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        TaxRate(bps)
    }

    /// Creates a tax rate from basis points, rejecting rates above 100%.
    pub fn try_from_bps(bps: u32) -> SaleResult<Self> {
        if bps > MAX_TAX_RATE_BPS {
            return Err(SaleError::InvalidTaxRate { bps: bps as i64 });
        }
        Ok(TaxRate(bps))
    }

    /// Creates a tax rate from a fraction in [0, 1], rounded to the
    /// nearest basis point.
    ///
    /// ## Example
    /// ```rust
    /// use till_core::types::TaxRate;
    ///
    /// assert_eq!(TaxRate::from_fraction(0.16).unwrap().bps(), 1600);
    /// assert!(TaxRate::from_fraction(1.5).is_err());
    /// assert!(TaxRate::from_fraction(-0.1).is_err());
    /// ```
    pub fn from_fraction(fraction: f64) -> SaleResult<Self> {
        let bps = (fraction * 10_000.0).round() as i64;
        if !(0..=MAX_TAX_RATE_BPS as i64).contains(&bps) || !fraction.is_finite() {
            return Err(SaleError::InvalidTaxRate { bps });
        }
        Ok(TaxRate(bps as u32))
    }

    /// The rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// The rate as a fraction, for display only.
    #[inline]
    pub fn as_fraction(&self) -> f64 {
        self.0 as f64 / 10_000.0
    }

    /// Zero rate.
    #[inline]
    pub const fn zero() -> Self {
        TaxRate(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl Default for TaxRate {
    fn default() -> Self {
        TaxRate::zero()
    }
}

// =============================================================================
// Cashier
// =============================================================================

/// The operator who composed a sale. Frozen onto the record at
/// composition time and immutable thereafter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Cashier {
    /// Operator account id (UUID in production, opaque here).
    pub id: String,
    /// Display name printed on receipts.
    pub name: String,
}

impl Cashier {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Cashier {
            id: id.into(),
            name: name.into(),
        }
    }
}

// =============================================================================
// Payment Method
// =============================================================================

/// Accepted tender types.
///
/// The wire form is the serde rename: `cash`, `card`, `mobile_money`.
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Physical cash; change is returned from the tendered excess.
    Cash,
    /// Card payment on an external terminal.
    Card,
    /// Mobile money transfer (M-Pesa and friends).
    MobileMoney,
}

impl PaymentMethod {
    /// Parses the wire form. Anything outside the enumerated set is a
    /// validation error, never silently coerced.
    ///
    /// ## Example
    /// ```rust
    /// use till_core::types::PaymentMethod;
    ///
    /// assert_eq!(
    ///     PaymentMethod::parse("mobile_money").unwrap(),
    ///     PaymentMethod::MobileMoney
    /// );
    /// assert!(PaymentMethod::parse("bitcoin").is_err());
    /// ```
    pub fn parse(value: &str) -> SaleResult<Self> {
        match value.trim() {
            "cash" => Ok(PaymentMethod::Cash),
            "card" => Ok(PaymentMethod::Card),
            "mobile_money" => Ok(PaymentMethod::MobileMoney),
            other => Err(SaleError::InvalidPaymentMethod {
                value: other.to_string(),
            }),
        }
    }

    /// The wire form of this method.
    pub const fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::Card => "card",
            PaymentMethod::MobileMoney => "mobile_money",
        }
    }
}

// =============================================================================
// Sale Status
// =============================================================================

/// Lifecycle state of a sale.
///
/// ```text
///          ┌── complete ──► Completed ── refund ──► Refunded (terminal)
///   Held ──┤
///          └── cancel ────► Cancelled (terminal)
/// ```
/// `Held` is the only state that permits further transitions out of
/// itself besides `Completed → Refunded`. See [`crate::lifecycle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum SaleStatus {
    /// Parked at the register, awaiting completion or cancellation.
    Held,
    /// Paid and finalized.
    Completed,
    /// Abandoned before payment. Terminal.
    Cancelled,
    /// Reversed after completion, inventory restored. Terminal.
    Refunded,
}

impl SaleStatus {
    /// Terminal states admit no further transitions.
    pub const fn is_terminal(&self) -> bool {
        matches!(self, SaleStatus::Cancelled | SaleStatus::Refunded)
    }
}

// =============================================================================
// Cart Item
// =============================================================================

/// One line of a sale: a catalog item snapshot times a quantity.
///
/// Name and unit price are frozen at composition time so the record
/// stays truthful when the catalog changes later (snapshot pattern).
/// Unit cost is deliberately absent: cost is a catalog concern, consumed
/// during composition to compute profit and never stored on the line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CartItem {
    /// Catalog item this line references.
    pub item_id: String,
    /// Display name at time of sale (frozen).
    pub name: String,
    /// Unit price in cents at time of sale (frozen).
    pub unit_price_cents: i64,
    /// Units sold, 1..=999.
    pub quantity: i64,
    /// `unit_price_cents × quantity`. Derived, held as data so the
    /// record is self-describing; [`crate::lifecycle`] audits it.
    pub line_total_cents: i64,
}

impl CartItem {
    /// Unit price as Money.
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }

    /// Line total as Money.
    #[inline]
    pub fn line_total(&self) -> Money {
        Money::from_cents(self.line_total_cents)
    }
}

// =============================================================================
// Sale
// =============================================================================

/// A composed sale transaction.
///
/// Produced only by [`crate::compose::compose_sale`], which guarantees
/// every arithmetic invariant before the value exists. Views render it;
/// they never recompute or alter derived fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Sale {
    /// UUID v4, assigned at composition, immutable.
    pub id: String,
    /// Owning tenant (single-tenant runtime writes the default).
    pub tenant_id: String,
    /// Human-readable receipt id, e.g. `20260806-142233-9F3A`.
    pub receipt_number: String,
    /// Operator id, immutable once set.
    pub cashier_id: String,
    /// Operator display name, immutable once set.
    pub cashier_name: String,
    /// Line items in entry order. Never empty.
    pub items: Vec<CartItem>,
    /// Σ line totals. Strictly positive.
    pub subtotal_cents: i64,
    /// Rate applied to the discounted base, in basis points.
    pub tax_rate_bps: u32,
    /// `(subtotal − discount) × rate`, the one rounded figure.
    pub tax_cents: i64,
    /// Amount taken off the subtotal before tax. 0 ≤ discount ≤ subtotal.
    pub discount_cents: i64,
    /// `(subtotal − discount) + tax`. Strictly positive.
    pub total_cents: i64,
    /// How the customer paid.
    pub payment_method: PaymentMethod,
    /// Amount the customer handed over.
    pub tendered_cents: i64,
    /// `max(0, tendered − total)`; 0 for held sales.
    pub change_cents: i64,
    /// Σ (price − cost) × quantity. Signed: loss leaders go negative.
    pub profit_cents: i64,
    /// Lifecycle state.
    pub status: SaleStatus,
    /// Reason code recorded when the sale was refunded.
    pub refund_reason: Option<String>,
    /// Fixed at composition.
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    /// Set when the sale reached `Completed`.
    #[ts(as = "Option<String>")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl Sale {
    #[inline]
    pub fn subtotal(&self) -> Money {
        Money::from_cents(self.subtotal_cents)
    }

    #[inline]
    pub fn tax(&self) -> Money {
        Money::from_cents(self.tax_cents)
    }

    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }

    #[inline]
    pub fn change(&self) -> Money {
        Money::from_cents(self.change_cents)
    }

    #[inline]
    pub fn profit(&self) -> Money {
        Money::from_cents(self.profit_cents)
    }

    /// The tax rate as a typed value.
    #[inline]
    pub fn tax_rate(&self) -> TaxRate {
        TaxRate::from_bps(self.tax_rate_bps)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
