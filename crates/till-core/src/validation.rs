//! # Validation
//!
//! Input validators shared by the composer and the lifecycle.
//!
//! Each validator checks one constraint and returns the `SaleError`
//! naming it. They run before any arithmetic, so a rejected input never
//! produces a partial record.

use crate::error::{SaleError, SaleResult};
use crate::types::{Cashier, MAX_TAX_RATE_BPS};
use crate::{MAX_CART_ITEMS, MAX_ITEM_QUANTITY};

/// Quantity must be a positive integer within the per-line limit.
///
/// ## Example
/// ```rust
/// use till_core::validation::validate_quantity;
///
/// assert!(validate_quantity("A", 1).is_ok());
/// assert!(validate_quantity("A", 999).is_ok());
/// assert!(validate_quantity("A", 0).is_err());
/// assert!(validate_quantity("A", -3).is_err());
/// assert!(validate_quantity("A", 1000).is_err());
/// ```
pub fn validate_quantity(item_id: &str, quantity: i64) -> SaleResult<()> {
    if quantity < 1 || quantity > MAX_ITEM_QUANTITY {
        return Err(SaleError::InvalidQuantity {
            item_id: item_id.to_string(),
            quantity,
        });
    }
    Ok(())
}

/// Discount must be non-negative and no larger than the subtotal.
pub fn validate_discount(discount_cents: i64, subtotal_cents: i64) -> SaleResult<()> {
    if discount_cents < 0 || discount_cents > subtotal_cents {
        return Err(SaleError::InvalidDiscount {
            discount_cents,
            subtotal_cents,
        });
    }
    Ok(())
}

/// Tax rate must be within [0, 1], i.e. 0..=10,000 basis points.
pub fn validate_tax_rate_bps(bps: u32) -> SaleResult<()> {
    if bps > MAX_TAX_RATE_BPS {
        return Err(SaleError::InvalidTaxRate { bps: bps as i64 });
    }
    Ok(())
}

/// Tendered amount for a completing sale must be strictly positive.
pub fn validate_tendered(tendered_cents: i64) -> SaleResult<()> {
    if tendered_cents <= 0 {
        return Err(SaleError::InvalidPaymentAmount { tendered_cents });
    }
    Ok(())
}

/// Cashier identity must have a non-blank id and name.
pub fn validate_cashier(cashier: &Cashier) -> SaleResult<()> {
    if cashier.id.trim().is_empty() || cashier.name.trim().is_empty() {
        return Err(SaleError::MissingCashier);
    }
    Ok(())
}

/// A sale carries at least one line and at most `MAX_CART_ITEMS`.
pub fn validate_cart_width(line_count: usize) -> SaleResult<()> {
    if line_count == 0 {
        return Err(SaleError::EmptyCart);
    }
    if line_count > MAX_CART_ITEMS {
        return Err(SaleError::CartTooLarge);
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
