//! # Ledger Rules
//!
//! Pure ledger arithmetic: credit gating, sale totals, egg valuation, and
//! credit aging. Nothing in this module touches the database; the db layer
//! encodes the same rules as guarded SQL updates, and both are held
//! together by the integration tests.
//!
//! ## Rule Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Ledger Rules (pure)                                │
//! │                                                                         │
//! │  credit_available(limit, balance, total)                                │
//! │       └── the gate every CREDIT sale must pass                          │
//! │                                                                         │
//! │  SaleTotals::compute(subtotal, discount, tax_rate, method)              │
//! │       └── total = subtotal - discount + tax                             │
//! │       └── CREDIT → (paid 0, balance total); else (paid total, 0)        │
//! │                                                                         │
//! │  collection_value(hen, hen_price, duck, duck_price)                     │
//! │       └── damaged excluded, per-dozen pro-rata                          │
//! │                                                                         │
//! │  credit_status(balance, oldest_unpaid_due, now)                         │
//! │       └── CURRENT / OVERDUE_30 / 60 / 90 / BAD_DEBT                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::money::Money;
use crate::types::{AccountKind, CreditStatus, PaymentMethod, Product, TaxRate};

// =============================================================================
// Credit Gate
// =============================================================================

/// The credit gate: can `total_cents` be added to the account's balance
/// without exceeding its limit?
///
/// This is the decision rule only. The authoritative evaluation happens as
/// an atomic conditional UPDATE at commit time; callers must never trust a
/// passing result from an earlier read.
#[inline]
pub const fn credit_available(limit_cents: i64, balance_cents: i64, total_cents: i64) -> bool {
    limit_cents - balance_cents >= total_cents
}

// =============================================================================
// Sale Totals
// =============================================================================

/// Computed monetary breakdown of a sale.
///
/// ## Invariant
/// `paid_cents + balance_cents == total_cents`, enforced by construction:
/// the split is derived from the payment method, never set by callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleTotals {
    pub subtotal_cents: i64,
    pub discount_cents: i64,
    pub tax_cents: i64,
    pub total_cents: i64,
    pub paid_cents: i64,
    pub balance_cents: i64,
}

impl SaleTotals {
    /// Computes the totals for a sale.
    ///
    /// `total = subtotal - discount + tax`, tax computed on the subtotal
    /// from a basis-point rate. CREDIT defers the full total onto the
    /// account balance; every other method settles in full at creation.
    pub fn compute(
        subtotal_cents: i64,
        discount_cents: i64,
        tax_rate: TaxRate,
        method: PaymentMethod,
    ) -> Self {
        let tax_cents = Money::from_cents(subtotal_cents)
            .calculate_tax(tax_rate)
            .cents();
        let total_cents = subtotal_cents - discount_cents + tax_cents;

        let (paid_cents, balance_cents) = if method.is_credit() {
            (0, total_cents)
        } else {
            (total_cents, 0)
        };

        SaleTotals {
            subtotal_cents,
            discount_cents,
            tax_cents,
            total_cents,
            paid_cents,
            balance_cents,
        }
    }
}

// =============================================================================
// Pricing Tier
// =============================================================================

/// Resolves the unit price for a product given the buying account's kind.
///
/// Farmer and wholesale accounts get the wholesale price when the product
/// has one; walk-ins and regular customers pay retail.
pub fn unit_price_cents(product: &Product, buyer: Option<AccountKind>) -> i64 {
    match (buyer, product.wholesale_price_cents) {
        (Some(kind), Some(wholesale)) if kind.buys_wholesale() => wholesale,
        _ => product.price_cents,
    }
}

// =============================================================================
// Egg Valuation
// =============================================================================

/// Graded egg counts for one bird type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EggGrading {
    pub small: i64,
    pub medium: i64,
    pub large: i64,
    pub xl: i64,
    pub damaged: i64,
}

impl EggGrading {
    /// Eggs that count toward the payable value. Damaged eggs are recorded
    /// but never paid for.
    #[inline]
    pub const fn sellable(&self) -> i64 {
        self.small + self.medium + self.large + self.xl
    }

    /// Every egg handled, damaged included.
    #[inline]
    pub const fn total(&self) -> i64 {
        self.sellable() + self.damaged
    }
}

/// Values a collection: sellable hen eggs at the hen per-dozen price plus
/// sellable duck eggs at the duck per-dozen price, partial dozens pro-rata.
///
/// ## Example
/// ```rust
/// use agripos_core::ledger::{collection_value, EggGrading};
/// use agripos_core::money::Money;
///
/// let hen = EggGrading { small: 24, medium: 48, large: 36, xl: 12, damaged: 0 };
/// let duck = EggGrading { small: 12, medium: 18, large: 6, xl: 0, damaged: 0 };
///
/// // 120 hen eggs at $2.50/dozen + 36 duck eggs at $4.00/dozen = $37.00
/// let value = collection_value(&hen, Money::from_cents(250), &duck, Money::from_cents(400));
/// assert_eq!(value.cents(), 3_700);
/// ```
pub fn collection_value(
    hen: &EggGrading,
    hen_price_per_dozen: Money,
    duck: &EggGrading,
    duck_price_per_dozen: Money,
) -> Money {
    Money::value_per_dozen(hen.sellable(), hen_price_per_dozen)
        + Money::value_per_dozen(duck.sellable(), duck_price_per_dozen)
}

// =============================================================================
// Credit Aging
// =============================================================================

/// Derives the credit status of an account from its balance and the oldest
/// unpaid due date among its pending credit sales.
///
/// ## Buckets
/// ```text
/// nothing owed, or nothing past due   →  CURRENT
/// 1-30 days past the oldest due date  →  OVERDUE_30
/// 31-60                               →  OVERDUE_60
/// 61-90                               →  OVERDUE_90
/// over 90                             →  BAD_DEBT
/// ```
pub fn credit_status(
    balance_cents: i64,
    oldest_unpaid_due: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> CreditStatus {
    if balance_cents <= 0 {
        return CreditStatus::Current;
    }

    let due = match oldest_unpaid_due {
        Some(due) => due,
        None => return CreditStatus::Current,
    };

    let days_overdue = (now - due).num_days();
    match days_overdue {
        i64::MIN..=0 => CreditStatus::Current,
        1..=30 => CreditStatus::Overdue30,
        31..=60 => CreditStatus::Overdue60,
        61..=90 => CreditStatus::Overdue90,
        _ => CreditStatus::BadDebt,
    }
}

/// Resolves the due date of a credit sale from its creation time and the
/// account's payment terms.
#[inline]
pub fn due_date(created_at: DateTime<Utc>, payment_terms_days: i64) -> DateTime<Utc> {
    created_at + Duration::days(payment_terms_days)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_credit_available() {
        // 15000 - 0 >= 172.80
        assert!(credit_available(1_500_000, 0, 17_280));
        // Exactly at the limit passes
        assert!(credit_available(1_500_000, 1_482_720, 17_280));
        // One cent over fails
        assert!(!credit_available(1_500_000, 1_482_721, 17_280));
    }

    #[test]
    fn test_sale_totals_cash() {
        // subtotal $50.00, tax 8% = $4.00, discount 0 → total $54.00
        let totals = SaleTotals::compute(5_000, 0, TaxRate::from_bps(800), PaymentMethod::Cash);
        assert_eq!(totals.tax_cents, 400);
        assert_eq!(totals.total_cents, 5_400);
        assert_eq!(totals.paid_cents, 5_400);
        assert_eq!(totals.balance_cents, 0);
        assert_eq!(totals.paid_cents + totals.balance_cents, totals.total_cents);
    }

    #[test]
    fn test_sale_totals_credit() {
        // subtotal $160.00, tax 8% = $12.80 → total $172.80 deferred
        let totals = SaleTotals::compute(16_000, 0, TaxRate::from_bps(800), PaymentMethod::Credit);
        assert_eq!(totals.total_cents, 17_280);
        assert_eq!(totals.paid_cents, 0);
        assert_eq!(totals.balance_cents, 17_280);
    }

    #[test]
    fn test_sale_totals_discount() {
        let totals = SaleTotals::compute(10_000, 1_500, TaxRate::zero(), PaymentMethod::Cash);
        assert_eq!(totals.total_cents, 8_500);
        assert_eq!(totals.paid_cents + totals.balance_cents, totals.total_cents);
    }

    #[test]
    fn test_unit_price_tiers() {
        let mut product = test_product();
        product.price_cents = 1_000;
        product.wholesale_price_cents = Some(800);

        assert_eq!(unit_price_cents(&product, None), 1_000);
        assert_eq!(unit_price_cents(&product, Some(AccountKind::Regular)), 1_000);
        assert_eq!(unit_price_cents(&product, Some(AccountKind::Farmer)), 800);
        assert_eq!(unit_price_cents(&product, Some(AccountKind::Wholesale)), 800);

        // No wholesale tier: everyone pays retail
        product.wholesale_price_cents = None;
        assert_eq!(unit_price_cents(&product, Some(AccountKind::Farmer)), 1_000);
    }

    #[test]
    fn test_collection_value_exactness() {
        let hen = EggGrading {
            small: 24,
            medium: 48,
            large: 36,
            xl: 12,
            damaged: 0,
        };
        let duck = EggGrading {
            small: 12,
            medium: 18,
            large: 6,
            xl: 0,
            damaged: 0,
        };
        assert_eq!(hen.sellable(), 120);
        assert_eq!(duck.sellable(), 36);

        let value = collection_value(
            &hen,
            Money::from_cents(250),
            &duck,
            Money::from_cents(400),
        );
        // (120/12)*2.50 + (36/12)*4.00 = 25.00 + 12.00 = 37.00
        assert_eq!(value.cents(), 3_700);
    }

    #[test]
    fn test_collection_value_excludes_damaged() {
        let hen = EggGrading {
            small: 12,
            medium: 0,
            large: 0,
            xl: 0,
            damaged: 24,
        };
        let duck = EggGrading::default();
        let value = collection_value(
            &hen,
            Money::from_cents(250),
            &duck,
            Money::from_cents(400),
        );
        assert_eq!(value.cents(), 250);
        assert_eq!(hen.total(), 36);
    }

    #[test]
    fn test_credit_status_buckets() {
        let now = Utc.with_ymd_and_hms(2026, 8, 1, 12, 0, 0).unwrap();
        let due = |days_ago: i64| Some(now - Duration::days(days_ago));

        assert_eq!(credit_status(0, due(45), now), CreditStatus::Current);
        assert_eq!(credit_status(100, None, now), CreditStatus::Current);
        assert_eq!(credit_status(100, due(0), now), CreditStatus::Current);
        assert_eq!(credit_status(100, due(15), now), CreditStatus::Overdue30);
        assert_eq!(credit_status(100, due(30), now), CreditStatus::Overdue30);
        assert_eq!(credit_status(100, due(31), now), CreditStatus::Overdue60);
        assert_eq!(credit_status(100, due(75), now), CreditStatus::Overdue90);
        assert_eq!(credit_status(100, due(91), now), CreditStatus::BadDebt);
    }

    #[test]
    fn test_due_date() {
        let created = Utc.with_ymd_and_hms(2026, 8, 1, 9, 0, 0).unwrap();
        let due = due_date(created, 30);
        assert_eq!((due - created).num_days(), 30);
    }

    fn test_product() -> Product {
        Product {
            id: "p-1".to_string(),
            sku: "FEED-50KG".to_string(),
            name: "Layer Feed 50kg".to_string(),
            description: None,
            unit: "bag".to_string(),
            price_cents: 1_000,
            wholesale_price_cents: None,
            cost_cents: None,
            track_inventory: true,
            allow_negative_stock: false,
            current_stock: Some(10),
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            sync_version: 0,
        }
    }
}
