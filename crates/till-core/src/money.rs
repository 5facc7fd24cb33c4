//! # Money
//!
//! Monetary values in integer minor units.
//!
//! ## Why Integer Cents?
//! ```text
//! In floating point:   0.1 + 0.2 = 0.30000000000000004
//! In integer cents:    10 + 20   = 30
//! ```
//! Every amount in the system - catalog prices, line totals, tax,
//! discounts, tendered cash, change, profit - flows through this type.
//! The database stores cents, the composer computes in cents, and only
//! the frontend formats for display.
//!
//! ## Rounding
//! Exactly one computation in the whole system can produce a fractional
//! cent: applying a basis-point rate ([`Money::tax_amount`]). It rounds
//! half to even (banker's rounding), so long runs of transactions carry
//! no systematic bias up or down. Everything else is exact.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};
use ts_rs::TS;

use crate::types::TaxRate;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit.
///
/// Signed (`i64`) because refunds and loss-leader profit are negative.
/// A single-field tuple struct: zero-cost over the raw integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from minor units (cents).
    ///
    /// ## Example
    /// ```rust
    /// use till_core::money::Money;
    ///
    /// let price = Money::from_cents(1099); // $10.99
    /// assert_eq!(price.cents(), 1099);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Creates a Money value from major and minor units.
    ///
    /// For negative amounts only the major unit carries the sign:
    /// `from_major_minor(-5, 50)` is -$5.50.
    #[inline]
    pub const fn from_major_minor(major: i64, minor: i64) -> Self {
        if major < 0 {
            Money(major * 100 - minor)
        } else {
            Money(major * 100 + minor)
        }
    }

    /// Returns the value in minor units.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the major-unit portion.
    #[inline]
    pub const fn major_units(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor-unit portion, always 0-99.
    #[inline]
    pub const fn minor_units(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Zero.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Absolute value.
    #[inline]
    pub const fn abs(&self) -> Self {
        Money(self.0.abs())
    }

    /// Applies a basis-point rate, rounding half to even.
    ///
    /// This is the single rounding point of the system. The product is
    /// computed in `i128` so large amounts cannot overflow, then divided
    /// by 10,000 with ties going to the even quotient:
    ///
    /// ```text
    /// 82.5 → 82    83.5 → 84    82.4 → 82    82.6 → 83
    /// ```
    ///
    /// ## Example
    /// ```rust
    /// use till_core::money::Money;
    /// use till_core::types::TaxRate;
    ///
    /// let base = Money::from_cents(1000);          // $10.00
    /// let tax = base.tax_amount(TaxRate::from_bps(825)); // 8.25%
    /// // $10.00 × 8.25% = 82.5¢, ties to even → 82¢
    /// assert_eq!(tax.cents(), 82);
    /// ```
    pub fn tax_amount(&self, rate: TaxRate) -> Money {
        let product = self.0 as i128 * rate.bps() as i128;
        let quotient = product.div_euclid(10_000);
        let remainder = product.rem_euclid(10_000);

        let rounded = match remainder.cmp(&5_000) {
            std::cmp::Ordering::Less => quotient,
            std::cmp::Ordering::Greater => quotient + 1,
            // Tie: round to the even quotient
            std::cmp::Ordering::Equal => {
                if quotient % 2 == 0 {
                    quotient
                } else {
                    quotient + 1
                }
            }
        };

        Money::from_cents(rounded as i64)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Debug-friendly display. UI formatting (locale, currency symbol) is the
/// frontend's job.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(
            f,
            "{}${}.{:02}",
            sign,
            self.major_units().abs(),
            self.minor_units()
        )
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

/// Multiplication by a quantity.
impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_cents_round_trip() {
        let money = Money::from_cents(1099);
        assert_eq!(money.cents(), 1099);
        assert_eq!(money.major_units(), 10);
        assert_eq!(money.minor_units(), 99);
    }

    #[test]
    fn from_major_minor_handles_sign() {
        assert_eq!(Money::from_major_minor(10, 99).cents(), 1099);
        assert_eq!(Money::from_major_minor(-5, 50).cents(), -550);
    }

    #[test]
    fn display_formats_sign_and_padding() {
        assert_eq!(format!("{}", Money::from_cents(1099)), "$10.99");
        assert_eq!(format!("{}", Money::from_cents(500)), "$5.00");
        assert_eq!(format!("{}", Money::from_cents(-550)), "-$5.50");
        assert_eq!(format!("{}", Money::from_cents(0)), "$0.00");
    }

    #[test]
    fn arithmetic() {
        let a = Money::from_cents(1000);
        let b = Money::from_cents(500);

        assert_eq!((a + b).cents(), 1500);
        assert_eq!((a - b).cents(), 500);
        assert_eq!((a * 3).cents(), 3000);

        let mut acc = Money::zero();
        acc += a;
        acc -= b;
        assert_eq!(acc.cents(), 500);
    }

    #[test]
    fn tax_exact_rate_does_not_round() {
        // $10.00 at 10% = $1.00 exactly
        let tax = Money::from_cents(1000).tax_amount(TaxRate::from_bps(1000));
        assert_eq!(tax.cents(), 100);
    }

    #[test]
    fn tax_ties_round_to_even() {
        // $10.00 at 8.25% = 82.5¢ → 82 (even)
        let down = Money::from_cents(1000).tax_amount(TaxRate::from_bps(825));
        assert_eq!(down.cents(), 82);

        // $10.00 at 8.35% = 83.5¢ → 84 (even)
        let up = Money::from_cents(1000).tax_amount(TaxRate::from_bps(835));
        assert_eq!(up.cents(), 84);
    }

    #[test]
    fn tax_non_ties_round_to_nearest() {
        // $9.99 at 8.25% = 82.4175¢ → 82
        assert_eq!(
            Money::from_cents(999).tax_amount(TaxRate::from_bps(825)).cents(),
            82
        );
        // $10.01 at 8.25% = 82.5825¢ → 83
        assert_eq!(
            Money::from_cents(1001).tax_amount(TaxRate::from_bps(825)).cents(),
            83
        );
    }

    #[test]
    fn tax_zero_rate_is_zero() {
        let tax = Money::from_cents(123_456).tax_amount(TaxRate::zero());
        assert!(tax.is_zero());
    }

    #[test]
    fn tax_large_amount_no_overflow() {
        // i64::MAX cents would overflow a naive i64 multiply
        let big = Money::from_cents(i64::MAX / 2);
        let tax = big.tax_amount(TaxRate::from_bps(825));
        assert!(tax.is_positive());
    }

    #[test]
    fn zero_and_sign_checks() {
        assert!(Money::zero().is_zero());
        assert!(Money::from_cents(1).is_positive());
        assert!(Money::from_cents(-1).is_negative());
        assert_eq!(Money::from_cents(-550).abs().cents(), 550);
    }
}
