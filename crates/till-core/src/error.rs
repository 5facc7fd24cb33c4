//! # Error Types
//!
//! Domain errors for sale composition and lifecycle.
//!
//! ## Shape
//! Every rejected input maps to exactly one [`SaleError`] variant naming
//! the violated invariant, with enough context to render an operator
//! message. The variant doubles as the machine-readable discriminant:
//! [`SaleError::kind`] exposes a stable `SCREAMING_SNAKE_CASE` code for
//! API surfaces, so callers switch on the code and display the message.
//!
//! ## Propagation
//! All of these are local, synchronous, recoverable failures returned to
//! the caller. Composition performs no partial mutation on failure -
//! either a complete `Sale` exists or nothing does. Retry (collecting
//! more cash, fixing a quantity) is the caller's business.

use serde::Serialize;
use thiserror::Error;

use crate::types::SaleStatus;
use crate::{MAX_CART_ITEMS, MAX_ITEM_QUANTITY};

/// Convenience alias for fallible core operations.
pub type SaleResult<T> = Result<T, SaleError>;

// =============================================================================
// Sale Error
// =============================================================================

/// A violated invariant during composition or a lifecycle transition.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SaleError {
    /// A referenced catalog identifier does not resolve. The whole
    /// composition aborts; no partial sale is produced.
    #[error("catalog item not found: {item_id}")]
    ItemNotFound { item_id: String },

    /// Quantity is not a positive integer within the per-line limit.
    #[error("invalid quantity {quantity} for {item_id}: must be 1..={MAX_ITEM_QUANTITY}")]
    InvalidQuantity { item_id: String, quantity: i64 },

    /// Discount is negative or exceeds the computed subtotal.
    #[error("invalid discount {discount_cents}¢ against subtotal {subtotal_cents}¢")]
    InvalidDiscount {
        discount_cents: i64,
        subtotal_cents: i64,
    },

    /// Tax rate outside [0, 1] (0..=10,000 basis points).
    #[error("tax rate {bps} bps is outside 0..=10000")]
    InvalidTaxRate { bps: i64 },

    /// Tendered amount is less than the total due on a completed-intent
    /// sale. Hard stop: the record is not created.
    #[error("insufficient payment: {tendered_cents}¢ tendered, {required_cents}¢ due")]
    InsufficientPayment {
        required_cents: i64,
        tendered_cents: i64,
    },

    /// Value outside the enumerated payment methods.
    #[error("unknown payment method: {value:?}")]
    InvalidPaymentMethod { value: String },

    /// A status change requested from a terminal state, or an
    /// unrecognized transition.
    #[error("invalid transition: {from:?} sale cannot become {to:?}")]
    InvalidTransition { from: SaleStatus, to: SaleStatus },

    /// A sale needs at least one line item.
    #[error("cart is empty")]
    EmptyCart,

    /// More distinct lines than a single sale may carry.
    #[error("cart cannot have more than {MAX_CART_ITEMS} lines")]
    CartTooLarge,

    /// Tendered amount fails its sign constraint (must be positive to
    /// complete, non-negative to hold).
    #[error("invalid payment amount: {tendered_cents}¢")]
    InvalidPaymentAmount { tendered_cents: i64 },

    /// Cashier id or name is blank.
    #[error("cashier id and name are required")]
    MissingCashier,

    /// Refunds require a non-empty reason code.
    #[error("refund requires a reason code")]
    MissingRefundReason,
}

// =============================================================================
// Machine-Readable Kinds
// =============================================================================

/// Stable discriminant for API surfaces.
///
/// Serialized form is `SCREAMING_SNAKE_CASE`, e.g. `"ITEM_NOT_FOUND"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SaleErrorKind {
    ItemNotFound,
    InvalidQuantity,
    InvalidDiscount,
    InvalidTaxRate,
    InsufficientPayment,
    InvalidPaymentMethod,
    InvalidTransition,
    EmptyCart,
    CartTooLarge,
    InvalidPaymentAmount,
    MissingCashier,
    MissingRefundReason,
}

impl SaleError {
    /// The machine-readable kind identifying which invariant failed.
    pub fn kind(&self) -> SaleErrorKind {
        match self {
            SaleError::ItemNotFound { .. } => SaleErrorKind::ItemNotFound,
            SaleError::InvalidQuantity { .. } => SaleErrorKind::InvalidQuantity,
            SaleError::InvalidDiscount { .. } => SaleErrorKind::InvalidDiscount,
            SaleError::InvalidTaxRate { .. } => SaleErrorKind::InvalidTaxRate,
            SaleError::InsufficientPayment { .. } => SaleErrorKind::InsufficientPayment,
            SaleError::InvalidPaymentMethod { .. } => SaleErrorKind::InvalidPaymentMethod,
            SaleError::InvalidTransition { .. } => SaleErrorKind::InvalidTransition,
            SaleError::EmptyCart => SaleErrorKind::EmptyCart,
            SaleError::CartTooLarge => SaleErrorKind::CartTooLarge,
            SaleError::InvalidPaymentAmount { .. } => SaleErrorKind::InvalidPaymentAmount,
            SaleError::MissingCashier => SaleErrorKind::MissingCashier,
            SaleError::MissingRefundReason => SaleErrorKind::MissingRefundReason,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_carry_context() {
        let err = SaleError::InsufficientPayment {
            required_cents: 2900,
            tendered_cents: 2000,
        };
        assert_eq!(
            err.to_string(),
            "insufficient payment: 2000¢ tendered, 2900¢ due"
        );

        let err = SaleError::ItemNotFound {
            item_id: "SKU-404".to_string(),
        };
        assert_eq!(err.to_string(), "catalog item not found: SKU-404");
    }

    #[test]
    fn kind_is_stable_wire_code() {
        let kind = SaleError::EmptyCart.kind();
        assert_eq!(serde_json::to_string(&kind).unwrap(), "\"EMPTY_CART\"");

        let kind = SaleError::ItemNotFound {
            item_id: "x".into(),
        }
        .kind();
        assert_eq!(serde_json::to_string(&kind).unwrap(), "\"ITEM_NOT_FOUND\"");
    }

    #[test]
    fn transition_message_names_both_states() {
        let err = SaleError::InvalidTransition {
            from: SaleStatus::Refunded,
            to: SaleStatus::Completed,
        };
        assert!(err.to_string().contains("Refunded"));
        assert!(err.to_string().contains("Completed"));
    }
}
