//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In floating point:                                                     │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  A credit ledger cannot tolerate drift: balances are compared against  │
//! │  limits and payments are compared against balances. One stray cent    │
//! │  makes a valid payment bounce.                                         │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Cents                                            │
//! │    Every balance, price, and total in the system is an i64 in cents.   │
//! │    Rounding happens exactly once, at a documented point.               │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use agripos_core::money::Money;
//!
//! // Create from cents (preferred)
//! let price = Money::from_cents(250); // $2.50 per dozen
//!
//! // Arithmetic operations
//! let doubled = price * 2;                      // $5.00
//! let total = price + Money::from_cents(400);   // $6.50
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};

use crate::types::TaxRate;
use crate::EGGS_PER_DOZEN;

// =============================================================================
// Money Type
// =============================================================================

/// Represents a monetary value in the smallest currency unit (cents).
///
/// ## Design Decisions
/// - **i64 (signed)**: Allows negative values for adjustments and deltas
/// - **Single field tuple struct**: Zero-cost abstraction over i64
/// - **Derives**: Full serde support for JSON serialization
///
/// ## Where Money Flows
/// ```text
/// Product.price_cents ──► line total ──► Sale.total_cents
///                                             │
///                          Account.credit_balance_cents ◄── credit sale
///                                             ▲
/// EggCollection.total_value_cents ────────────┘ (farmer payable)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents (the smallest currency unit).
    ///
    /// ## Example
    /// ```rust
    /// use agripos_core::money::Money;
    ///
    /// let price = Money::from_cents(1099); // Represents $10.99
    /// assert_eq!(price.cents(), 1099);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Creates a Money value from major and minor units.
    ///
    /// For negative amounts, only the major unit should be negative:
    /// `from_major_minor(-5, 50)` is -$5.50, not -$4.50.
    #[inline]
    pub const fn from_major_minor(major: i64, minor: i64) -> Self {
        if major < 0 {
            Money(major * 100 - minor)
        } else {
            Money(major * 100 + minor)
        }
    }

    /// Returns the value in cents (smallest currency unit).
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the major unit portion.
    #[inline]
    pub const fn dollars(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit portion (always 0-99).
    #[inline]
    pub const fn cents_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is positive (greater than zero).
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Returns the absolute value.
    #[inline]
    pub const fn abs(&self) -> Self {
        Money(self.0.abs())
    }

    /// Calculates tax from a basis-point rate, rounding half up.
    ///
    /// ## Implementation
    /// Integer math: `(amount * bps + 5000) / 10000`. The +5000 provides
    /// rounding (5000/10000 = 0.5). i128 intermediates prevent overflow on
    /// large amounts.
    ///
    /// ## Example
    /// ```rust
    /// use agripos_core::money::Money;
    /// use agripos_core::types::TaxRate;
    ///
    /// let subtotal = Money::from_cents(16_000); // $160.00
    /// let rate = TaxRate::from_bps(800);        // 8%
    ///
    /// let tax = subtotal.calculate_tax(rate);
    /// assert_eq!(tax.cents(), 1_280); // $12.80
    /// ```
    pub fn calculate_tax(&self, rate: TaxRate) -> Money {
        let tax_cents = (self.0 as i128 * rate.bps() as i128 + 5000) / 10000;
        Money::from_cents(tax_cents as i64)
    }

    /// Values a count of items priced per dozen, paying partial dozens
    /// pro-rata.
    ///
    /// ## Why Pro-Rata?
    /// Farm-gate egg pricing is quoted per dozen but collections rarely
    /// arrive in multiples of twelve. A farmer delivering 30 eggs at
    /// $2.50/dozen is owed exactly 2.5 dozen worth, not 2 dozen.
    ///
    /// ## Implementation
    /// Integer math with half-up rounding: `(count * price + 6) / 12`.
    ///
    /// ## Example
    /// ```rust
    /// use agripos_core::money::Money;
    ///
    /// let hen_price = Money::from_cents(250); // $2.50 per dozen
    /// assert_eq!(Money::value_per_dozen(120, hen_price).cents(), 2_500);
    /// assert_eq!(Money::value_per_dozen(30, hen_price).cents(), 625);
    /// ```
    pub fn value_per_dozen(count: i64, price_per_dozen: Money) -> Money {
        let half = EGGS_PER_DOZEN as i128 / 2;
        let value =
            (count as i128 * price_per_dozen.0 as i128 + half) / EGGS_PER_DOZEN as i128;
        Money::from_cents(value as i64)
    }

    /// Multiplies money by a quantity.
    ///
    /// ## Example
    /// ```rust
    /// use agripos_core::money::Money;
    ///
    /// let unit_price = Money::from_cents(125_000); // $1,250.00 feed bag
    /// let line_total = unit_price.multiply_quantity(3);
    /// assert_eq!(line_total.cents(), 375_000);
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display implementation shows money in a human-readable format.
///
/// ## Note
/// This is for logs and receipts in tests. Host layers format for display
/// to handle localization properly.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(
            f,
            "{}${}.{:02}",
            sign,
            self.dollars().abs(),
            self.cents_part()
        )
    }
}

/// Default money is zero.
impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

/// Addition of two Money values.
impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

/// Addition assignment (+=).
impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

/// Subtraction of two Money values.
impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

/// Subtraction assignment (-=).
impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

/// Multiplication by integer (for quantity calculations).
impl Mul<i32> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i32) -> Self {
        Money(self.0 * qty as i64)
    }
}

/// Multiplication by i64.
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
    fn test_from_cents() {
        let money = Money::from_cents(1099);
        assert_eq!(money.cents(), 1099);
        assert_eq!(money.dollars(), 10);
        assert_eq!(money.cents_part(), 99);
    }

    #[test]
    fn test_from_major_minor() {
        let money = Money::from_major_minor(10, 99);
        assert_eq!(money.cents(), 1099);

        let negative = Money::from_major_minor(-5, 50);
        assert_eq!(negative.cents(), -550);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Money::from_cents(1099)), "$10.99");
        assert_eq!(format!("{}", Money::from_cents(500)), "$5.00");
        assert_eq!(format!("{}", Money::from_cents(-550)), "-$5.50");
        assert_eq!(format!("{}", Money::from_cents(0)), "$0.00");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_cents(1000);
        let b = Money::from_cents(500);

        assert_eq!((a + b).cents(), 1500);
        assert_eq!((a - b).cents(), 500);
        let result: Money = a * 3;
        assert_eq!(result.cents(), 3000);
    }

    #[test]
    fn test_tax_calculation() {
        // $50.00 at 8% = $4.00
        let amount = Money::from_cents(5000);
        let rate = TaxRate::from_bps(800);
        assert_eq!(amount.calculate_tax(rate).cents(), 400);

        // $160.00 at 8% = $12.80
        let amount = Money::from_cents(16_000);
        assert_eq!(amount.calculate_tax(rate).cents(), 1280);
    }

    #[test]
    fn test_tax_calculation_with_rounding() {
        // $10.00 at 8.25% = $0.825 → $0.83 (half rounds up via +5000)
        let amount = Money::from_cents(1000);
        let rate = TaxRate::from_bps(825);
        assert_eq!(amount.calculate_tax(rate).cents(), 83);
    }

    #[test]
    fn test_value_per_dozen_whole_dozens() {
        // 120 hen eggs at $2.50/dozen = 10 dozen = $25.00
        assert_eq!(
            Money::value_per_dozen(120, Money::from_cents(250)).cents(),
            2500
        );
        // 36 duck eggs at $4.00/dozen = 3 dozen = $12.00
        assert_eq!(
            Money::value_per_dozen(36, Money::from_cents(400)).cents(),
            1200
        );
    }

    #[test]
    fn test_value_per_dozen_partial_dozens_pro_rata() {
        // 30 eggs at $2.50/dozen = 2.5 dozen = $6.25 exactly
        assert_eq!(
            Money::value_per_dozen(30, Money::from_cents(250)).cents(),
            625
        );
        // 7 eggs at $2.40/dozen = 7 * 240 / 12 = $1.40 exactly
        assert_eq!(
            Money::value_per_dozen(7, Money::from_cents(240)).cents(),
            140
        );
        // 5 eggs at $2.50/dozen = 1250/12 = 104.17 → rounds to 104
        assert_eq!(
            Money::value_per_dozen(5, Money::from_cents(250)).cents(),
            104
        );
    }

    #[test]
    fn test_multiply_quantity() {
        let unit_price = Money::from_cents(299);
        let line_total = unit_price.multiply_quantity(3);
        assert_eq!(line_total.cents(), 897);
    }

    #[test]
    fn test_zero_and_checks() {
        let zero = Money::zero();
        assert!(zero.is_zero());
        assert!(!zero.is_positive());
        assert!(!zero.is_negative());

        let positive = Money::from_cents(100);
        assert!(positive.is_positive());

        let negative = Money::from_cents(-100);
        assert!(negative.is_negative());
        assert_eq!(negative.abs().cents(), 100);
    }
}
