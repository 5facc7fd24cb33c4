//! # Sale Lifecycle
//!
//! The status state machine over composed sales.
//!
//! ```text
//!          ┌── complete(tendered) ──► Completed ── refund(reason) ──► Refunded
//!   Held ──┤                                                          (terminal)
//!          └── cancel() ───────────► Cancelled (terminal)
//! ```
//!
//! Every other edge - anything out of `Cancelled` or `Refunded`, a
//! second completion, a refund of a held sale - fails with
//! `InvalidTransition` and leaves the record untouched.
//!
//! Prices are frozen at composition: completing a held sale re-checks
//! payment against the original total, never against a re-read catalog.

use chrono::Utc;

use crate::catalog::RestockRequest;
use crate::error::{SaleError, SaleResult};
use crate::types::{Sale, SaleStatus};
use crate::validation;

impl Sale {
    /// Completes a held sale with payment collected now.
    ///
    /// Requires `tendered ≥ total` - the same hard stop as completing at
    /// composition time. On success the tendered amount and change are
    /// recorded and `completed_at` is set.
    ///
    /// ## Example
    /// ```rust
    /// # use till_core::catalog::{CatalogEntry, CatalogSnapshot};
    /// # use till_core::compose::{compose_sale, CheckoutRequest, LineSelection, SaleIntent};
    /// # use till_core::types::{Cashier, PaymentMethod, SaleStatus};
    /// # let catalog = CatalogSnapshot::from_entries(vec![
    /// #     CatalogEntry::new("A", "Beans", 1000, 600, 40),
    /// # ]);
    /// # let request = CheckoutRequest {
    /// #     cashier: Cashier::new("c-1", "Amara"),
    /// #     lines: vec![LineSelection::new("A", 1)],
    /// #     discount_cents: 0,
    /// #     tax_rate_bps: 0,
    /// #     payment_method: PaymentMethod::Cash,
    /// #     tendered_cents: 0,
    /// #     intent: SaleIntent::Hold,
    /// # };
    /// let mut sale = compose_sale(&request, &catalog).unwrap();
    /// sale.complete(1500).unwrap();
    /// assert_eq!(sale.status, SaleStatus::Completed);
    /// assert_eq!(sale.change_cents, 500);
    /// ```
    pub fn complete(&mut self, tendered_cents: i64) -> SaleResult<()> {
        if self.status != SaleStatus::Held {
            return Err(SaleError::InvalidTransition {
                from: self.status,
                to: SaleStatus::Completed,
            });
        }

        validation::validate_tendered(tendered_cents)?;
        if tendered_cents < self.total_cents {
            return Err(SaleError::InsufficientPayment {
                required_cents: self.total_cents,
                tendered_cents,
            });
        }

        self.tendered_cents = tendered_cents;
        self.change_cents = tendered_cents - self.total_cents;
        self.status = SaleStatus::Completed;
        self.completed_at = Some(Utc::now());
        Ok(())
    }

    /// Cancels a held sale. No payment required, no inventory touched
    /// (held sales never reserved stock).
    pub fn cancel(&mut self) -> SaleResult<()> {
        if self.status != SaleStatus::Held {
            return Err(SaleError::InvalidTransition {
                from: self.status,
                to: SaleStatus::Cancelled,
            });
        }
        self.status = SaleStatus::Cancelled;
        Ok(())
    }

    /// Refunds a completed sale.
    ///
    /// Requires a non-empty reason code, which is recorded on the sale.
    /// Returns one [`RestockRequest`] per line item, in entry order; the
    /// caller's transaction must apply each **exactly once**. The core
    /// performs no I/O itself.
    pub fn refund(&mut self, reason: &str) -> SaleResult<Vec<RestockRequest>> {
        if self.status != SaleStatus::Completed {
            return Err(SaleError::InvalidTransition {
                from: self.status,
                to: SaleStatus::Refunded,
            });
        }
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(SaleError::MissingRefundReason);
        }

        let restocks = self
            .items
            .iter()
            .map(|item| RestockRequest {
                item_id: item.item_id.clone(),
                quantity: item.quantity,
            })
            .collect();

        self.status = SaleStatus::Refunded;
        self.refund_reason = Some(reason.to_string());
        Ok(restocks)
    }

    /// Audits this record against every arithmetic and state invariant.
    ///
    /// The composer never produces a violating sale; this exists for the
    /// persistence layer (after load) and for tests. The first violated
    /// invariant is returned as the error that would have rejected it.
    pub fn check_invariants(&self) -> SaleResult<()> {
        validation::validate_cart_width(self.items.len())?;

        let mut subtotal: i64 = 0;
        for item in &self.items {
            validation::validate_quantity(&item.item_id, item.quantity)?;
            if item.line_total_cents != item.unit_price_cents * item.quantity {
                return Err(SaleError::InvalidQuantity {
                    item_id: item.item_id.clone(),
                    quantity: item.quantity,
                });
            }
            subtotal += item.line_total_cents;
        }
        if subtotal != self.subtotal_cents {
            return Err(SaleError::InvalidDiscount {
                discount_cents: self.discount_cents,
                subtotal_cents: self.subtotal_cents,
            });
        }

        validation::validate_discount(self.discount_cents, self.subtotal_cents)?;
        validation::validate_tax_rate_bps(self.tax_rate_bps)?;

        let taxable = self.subtotal() - crate::money::Money::from_cents(self.discount_cents);
        let tax = taxable.tax_amount(self.tax_rate());
        if tax.cents() != self.tax_cents
            || taxable.cents() + tax.cents() != self.total_cents
        {
            return Err(SaleError::InvalidDiscount {
                discount_cents: self.discount_cents,
                subtotal_cents: self.subtotal_cents,
            });
        }

        match self.status {
            SaleStatus::Completed | SaleStatus::Refunded => {
                if self.tendered_cents < self.total_cents {
                    return Err(SaleError::InsufficientPayment {
                        required_cents: self.total_cents,
                        tendered_cents: self.tendered_cents,
                    });
                }
                if self.change_cents != self.tendered_cents - self.total_cents {
                    return Err(SaleError::InvalidPaymentAmount {
                        tendered_cents: self.tendered_cents,
                    });
                }
            }
            SaleStatus::Held | SaleStatus::Cancelled => {
                if self.tendered_cents < 0 || self.change_cents != 0 {
                    return Err(SaleError::InvalidPaymentAmount {
                        tendered_cents: self.tendered_cents,
                    });
                }
            }
        }

        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{CatalogEntry, CatalogSnapshot};
    use crate::compose::{compose_sale, CheckoutRequest, LineSelection, SaleIntent};
    use crate::types::{Cashier, PaymentMethod};

    fn catalog() -> CatalogSnapshot {
        CatalogSnapshot::from_entries(vec![
            CatalogEntry::new("A", "Beans 500g", 1000, 600, 40),
            CatalogEntry::new("B", "Sugar 1kg", 500, 300, 25),
        ])
    }

    fn sale_with(intent: SaleIntent, tendered_cents: i64) -> Sale {
        let request = CheckoutRequest {
            cashier: Cashier::new("c-7", "Naledi"),
            lines: vec![LineSelection::new("A", 2), LineSelection::new("B", 1)],
            discount_cents: 0,
            tax_rate_bps: 1600,
            payment_method: PaymentMethod::Cash,
            tendered_cents,
            intent,
        };
        compose_sale(&request, &catalog()).unwrap()
    }

    #[test]
    fn held_completes_with_sufficient_payment() {
        let mut sale = sale_with(SaleIntent::Hold, 0);
        sale.complete(3000).unwrap();

        assert_eq!(sale.status, SaleStatus::Completed);
        assert_eq!(sale.tendered_cents, 3000);
        assert_eq!(sale.change_cents, 100);
        assert!(sale.completed_at.is_some());
        sale.check_invariants().unwrap();
    }

    #[test]
    fn held_completion_rechecks_payment() {
        let mut sale = sale_with(SaleIntent::Hold, 0);
        let err = sale.complete(2000).unwrap_err();

        assert_eq!(
            err,
            SaleError::InsufficientPayment {
                required_cents: 2900,
                tendered_cents: 2000,
            }
        );
        // Failed transition leaves the record untouched.
        assert_eq!(sale.status, SaleStatus::Held);
        assert_eq!(sale.tendered_cents, 0);
    }

    #[test]
    fn held_cancels_without_payment() {
        let mut sale = sale_with(SaleIntent::Hold, 0);
        sale.cancel().unwrap();
        assert_eq!(sale.status, SaleStatus::Cancelled);
    }

    #[test]
    fn completed_refunds_with_reason_and_restocks_each_line_once() {
        let mut sale = sale_with(SaleIntent::Complete, 3000);
        let restocks = sale.refund("customer_return").unwrap();

        assert_eq!(sale.status, SaleStatus::Refunded);
        assert_eq!(sale.refund_reason.as_deref(), Some("customer_return"));
        assert_eq!(
            restocks,
            vec![
                RestockRequest {
                    item_id: "A".into(),
                    quantity: 2
                },
                RestockRequest {
                    item_id: "B".into(),
                    quantity: 1
                },
            ]
        );
    }

    #[test]
    fn refund_requires_reason() {
        let mut sale = sale_with(SaleIntent::Complete, 3000);
        assert_eq!(sale.refund("   "), Err(SaleError::MissingRefundReason));
        assert_eq!(sale.status, SaleStatus::Completed);
    }

    #[test]
    fn completed_cannot_cancel_or_recomplete() {
        let mut sale = sale_with(SaleIntent::Complete, 3000);

        assert!(matches!(
            sale.cancel(),
            Err(SaleError::InvalidTransition {
                from: SaleStatus::Completed,
                to: SaleStatus::Cancelled,
            })
        ));
        assert!(matches!(
            sale.complete(5000),
            Err(SaleError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn held_cannot_refund() {
        let mut sale = sale_with(SaleIntent::Hold, 0);
        assert!(matches!(
            sale.refund("customer_return"),
            Err(SaleError::InvalidTransition {
                from: SaleStatus::Held,
                to: SaleStatus::Refunded,
            })
        ));
    }

    #[test]
    fn terminal_states_are_immutable() {
        let mut cancelled = sale_with(SaleIntent::Hold, 0);
        cancelled.cancel().unwrap();

        let mut refunded = sale_with(SaleIntent::Complete, 3000);
        refunded.refund("damaged").unwrap();

        for sale in [&mut cancelled, &mut refunded] {
            let before = sale.clone();
            assert!(matches!(
                sale.complete(10_000),
                Err(SaleError::InvalidTransition { .. })
            ));
            assert!(matches!(
                sale.cancel(),
                Err(SaleError::InvalidTransition { .. })
            ));
            assert!(matches!(
                sale.refund("again"),
                Err(SaleError::InvalidTransition { .. })
            ));
            assert_eq!(*sale, before);
        }
    }

    #[test]
    fn invariant_audit_accepts_composed_sales() {
        sale_with(SaleIntent::Complete, 3000).check_invariants().unwrap();
        sale_with(SaleIntent::Hold, 0).check_invariants().unwrap();
    }

    #[test]
    fn invariant_audit_catches_tampering() {
        let mut sale = sale_with(SaleIntent::Complete, 3000);
        sale.total_cents += 1;
        assert!(sale.check_invariants().is_err());

        let mut sale = sale_with(SaleIntent::Complete, 3000);
        sale.items[0].line_total_cents += 50;
        assert!(sale.check_invariants().is_err());

        let mut sale = sale_with(SaleIntent::Complete, 3000);
        sale.items.clear();
        assert_eq!(sale.check_invariants(), Err(SaleError::EmptyCart));
    }
}
