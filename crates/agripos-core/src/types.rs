//! # Domain Types
//!
//! Core domain types used throughout AgriPOS.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Account      │   │      Sale       │   │  PaymentRecord  │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  id (UUID)      │   │  id (UUID)      │       │
//! │  │  kind           │   │  receipt_number │   │  payment_type   │       │
//! │  │  credit_limit   │   │  paid/balance   │   │  amount_cents   │       │
//! │  │  credit_balance │   │  due_date       │   │  account_id(FK) │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │  EggCollection  │   │     Staff       │       │
//! │  │  retail +       │   │  graded counts  │   │  code + PIN     │       │
//! │  │  wholesale tier │   │  per-dozen      │   │  (credential    │       │
//! │  │  stock flags    │   │  valuation      │   │   check only)   │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dual-Key Identity Pattern
//! Every entity has:
//! - `id`: UUID v4 - immutable, used for database relations
//! - Business ID where one exists: (receipt_number, sku, staff code)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::money::Money;

// =============================================================================
// Tax Rate
// =============================================================================

/// Tax rate represented in basis points (bps).
///
/// ## Why Basis Points?
/// 1 basis point = 0.01% = 1/10000
/// 800 bps = 8%
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxRate(u32);

impl TaxRate {
    /// Creates a tax rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        TaxRate(bps)
    }

    /// Creates a tax rate from a percentage (for convenience).
    pub fn from_percentage(pct: f64) -> Self {
        TaxRate((pct * 100.0).round() as u32)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage (for display only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Zero tax rate.
    #[inline]
    pub const fn zero() -> Self {
        TaxRate(0)
    }

    /// Checks if tax rate is zero.
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
// Account
// =============================================================================

/// What kind of counterparty an account is.
///
/// Farmers and wholesale buyers purchase at the wholesale price tier;
/// regular customers pay retail. Vendors sit on the payable side of the
/// ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum AccountKind {
    /// Egg-supplying farmer. Buys at wholesale, accrues an egg payable.
    Farmer,
    /// Regular retail customer.
    Regular,
    /// Wholesale buyer (resellers, co-ops).
    Wholesale,
    /// Supplier the store purchases from.
    Vendor,
}

impl AccountKind {
    /// Whether this kind buys at the wholesale price tier.
    #[inline]
    pub const fn buys_wholesale(&self) -> bool {
        matches!(self, AccountKind::Farmer | AccountKind::Wholesale)
    }
}

/// Aging classification of an account's outstanding balance.
///
/// Never stored: derived from the balance and the oldest unpaid due date.
/// See [`crate::ledger::credit_status`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CreditStatus {
    /// No overdue balance.
    Current,
    /// Oldest unpaid sale is 1-30 days past due.
    Overdue30,
    /// 31-60 days past due.
    Overdue60,
    /// 61-90 days past due.
    Overdue90,
    /// More than 90 days past due.
    BadDebt,
}

/// A credit-bearing counterparty: customer (farmer, regular, wholesale) or
/// vendor.
///
/// ## The Balance Is The Ledger
/// `credit_balance_cents` is the single source of truth for how much is
/// owed on this account:
/// - Customer accounts: a receivable (the customer owes the store)
/// - Farmer accounts: also the running egg payable (see the payment
///   direction convention in DESIGN.md)
///
/// Every mutation of this field goes through a guarded conditional UPDATE;
/// nothing in the codebase computes a new balance in application memory and
/// writes it back.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Account {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Display name.
    pub name: String,

    /// Contact phone - business identifier for lookup at the counter.
    pub phone: Option<String>,

    /// Counterparty kind (pricing tier + ledger direction).
    pub kind: AccountKind,

    /// Maximum allowed outstanding balance, in cents. Non-negative.
    pub credit_limit_cents: i64,

    /// Current outstanding amount, in cents.
    pub credit_balance_cents: i64,

    /// Days until a credit sale is due.
    pub payment_terms_days: i64,

    /// Cumulative purchases, monotonically increasing.
    pub total_purchases_cents: i64,

    /// Cumulative egg sales value, monotonically increasing.
    pub total_egg_sales_cents: i64,

    /// Whether the account is active (soft delete).
    pub is_active: bool,

    /// When the account was created.
    pub created_at: DateTime<Utc>,

    /// When the account was last updated.
    pub updated_at: DateTime<Utc>,

    /// Sync version for offline conflict resolution.
    pub sync_version: i64,
}

impl Account {
    /// Returns the credit limit as Money.
    #[inline]
    pub fn credit_limit(&self) -> Money {
        Money::from_cents(self.credit_limit_cents)
    }

    /// Returns the current balance as Money.
    #[inline]
    pub fn credit_balance(&self) -> Money {
        Money::from_cents(self.credit_balance_cents)
    }

    /// Remaining credit headroom, in cents.
    #[inline]
    pub fn available_credit_cents(&self) -> i64 {
        self.credit_limit_cents - self.credit_balance_cents
    }
}

// =============================================================================
// Product
// =============================================================================

/// A product available for sale (feed, medicine, equipment, eggs).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Stock Keeping Unit - business identifier.
    pub sku: String,

    /// Display name shown at the counter and on receipts.
    pub name: String,

    /// Optional description.
    pub description: Option<String>,

    /// Sale unit: "bag", "bottle", "piece", "egg".
    pub unit: String,

    /// Retail price in cents.
    pub price_cents: i64,

    /// Wholesale price in cents (farmer and wholesale accounts).
    /// None means the product has no wholesale tier.
    pub wholesale_price_cents: Option<i64>,

    /// Cost in cents (for margin reporting).
    pub cost_cents: Option<i64>,

    /// Whether to track inventory for this product.
    pub track_inventory: bool,

    /// Allow selling when stock is zero or negative.
    pub allow_negative_stock: bool,

    /// Current stock level, in sale units.
    pub current_stock: Option<i64>,

    /// Whether product is active (soft delete).
    pub is_active: bool,

    /// When the product was created.
    pub created_at: DateTime<Utc>,

    /// When the product was last updated.
    pub updated_at: DateTime<Utc>,

    /// Sync version for offline conflict resolution.
    pub sync_version: i64,
}

impl Product {
    /// Returns the retail price as Money.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }

    /// Checks if product can be sold (in stock or doesn't track inventory).
    pub fn can_sell(&self, quantity: i64) -> bool {
        if !self.track_inventory {
            return true;
        }

        let stock = self.current_stock.unwrap_or(0);
        if stock >= quantity {
            return true;
        }

        self.allow_negative_stock
    }
}

// =============================================================================
// Sale
// =============================================================================

/// The status of a sale transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum SaleStatus {
    /// Fully paid at creation.
    Completed,
    /// Credit sale with an outstanding balance.
    Pending,
    /// Sale was cancelled.
    Cancelled,
}

/// How a sale or payment was tendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Physical cash.
    Cash,
    /// On account: adds to the customer's outstanding balance.
    Credit,
    /// Bank transfer.
    BankTransfer,
    /// Check.
    Check,
    /// Digital wallet / QR payment.
    Digital,
}

impl PaymentMethod {
    /// Whether this method defers payment to the account balance.
    #[inline]
    pub const fn is_credit(&self) -> bool {
        matches!(self, PaymentMethod::Credit)
    }
}

/// A sale transaction.
///
/// ## Invariant
/// `paid_cents + balance_cents == total_cents` always. For CREDIT sales
/// `paid_cents == 0` and `balance_cents == total_cents` at creation;
/// otherwise the sale is paid in full and `balance_cents == 0`.
///
/// Immutable after creation except status transitions (settle, cancel).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Sale {
    pub id: String,
    /// Human-facing receipt identifier, unique.
    pub receipt_number: String,
    /// Customer account. None for walk-in sales.
    pub customer_id: Option<String>,
    /// Staff member who rang up the sale.
    pub staff_id: String,
    pub status: SaleStatus,
    pub subtotal_cents: i64,
    pub tax_cents: i64,
    pub discount_cents: i64,
    pub total_cents: i64,
    pub payment_method: PaymentMethod,
    /// Amount settled at creation.
    pub paid_cents: i64,
    /// Amount carried onto the account balance.
    pub balance_cents: i64,
    /// Due date; set only for CREDIT sales.
    pub due_date: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Sync version for offline conflict resolution.
    pub sync_version: i64,
}

impl Sale {
    /// Returns the total as Money.
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }
}

/// A line item in a sale.
/// Uses snapshot pattern to freeze product data at time of sale.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct SaleItem {
    pub id: String,
    pub sale_id: String,
    pub product_id: String,
    /// SKU at time of sale (frozen).
    pub sku_snapshot: String,
    /// Product name at time of sale (frozen).
    pub name_snapshot: String,
    /// Unit price in cents at time of sale (frozen), tier-resolved.
    pub unit_price_cents: i64,
    /// Quantity sold.
    pub quantity: i64,
    /// Line total (unit_price × quantity).
    pub line_total_cents: i64,
    pub created_at: DateTime<Utc>,
}

impl SaleItem {
    /// Returns the unit price as Money.
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }

    /// Returns the line total as Money.
    #[inline]
    pub fn line_total(&self) -> Money {
        Money::from_cents(self.line_total_cents)
    }
}

// =============================================================================
// Egg Collection
// =============================================================================

/// A farm-gate egg procurement event.
///
/// Counts are graded per size; damaged eggs are counted for record keeping
/// but excluded from the payable value. Prices are quoted per dozen and
/// partial dozens are paid pro-rata.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct EggCollection {
    pub id: String,
    /// The supplying farmer account.
    pub farmer_id: String,
    /// Collection route, if the pickup ran on one.
    pub route_id: Option<String>,
    /// Staff member who performed the collection.
    pub staff_id: String,

    pub hen_small: i64,
    pub hen_medium: i64,
    pub hen_large: i64,
    pub hen_xl: i64,
    pub hen_damaged: i64,

    pub duck_small: i64,
    pub duck_medium: i64,
    pub duck_large: i64,
    pub duck_xl: i64,
    pub duck_damaged: i64,

    /// Hen egg price per dozen, in cents.
    pub hen_price_cents: i64,
    /// Duck egg price per dozen, in cents.
    pub duck_price_cents: i64,

    /// Valuation of the collection, in cents.
    pub total_value_cents: i64,

    /// Whether the farmer has been paid out for this collection.
    pub paid: bool,

    /// When the eggs were collected.
    pub collected_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    /// Sync version for offline conflict resolution.
    pub sync_version: i64,
}

impl EggCollection {
    /// Sellable hen eggs (damaged excluded).
    #[inline]
    pub fn sellable_hen_eggs(&self) -> i64 {
        self.hen_small + self.hen_medium + self.hen_large + self.hen_xl
    }

    /// Sellable duck eggs (damaged excluded).
    #[inline]
    pub fn sellable_duck_eggs(&self) -> i64 {
        self.duck_small + self.duck_medium + self.duck_large + self.duck_xl
    }

    /// All sellable eggs across both bird types.
    #[inline]
    pub fn sellable_eggs(&self) -> i64 {
        self.sellable_hen_eggs() + self.sellable_duck_eggs()
    }

    /// Returns the valuation as Money.
    #[inline]
    pub fn total_value(&self) -> Money {
        Money::from_cents(self.total_value_cents)
    }
}

// =============================================================================
// Payment Record
// =============================================================================

/// Direction/purpose tag of a payment record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum PaymentType {
    /// Customer pays down their receivable: balance decreases.
    CustomerPayment,
    /// Egg sale accrual on a farmer account: balance increases.
    EggPayment,
    /// Explicit charge against a farmer account: balance increases.
    Debit,
}

impl PaymentType {
    /// Signed balance delta multiplier for this record type.
    ///
    /// CustomerPayment reduces the balance; EggPayment and Debit both push
    /// the farmer's running payable up. The farmer-side convention is a
    /// deliberate product decision, pinned by tests.
    #[inline]
    pub const fn balance_sign(&self) -> i64 {
        match self {
            PaymentType::CustomerPayment => -1,
            PaymentType::EggPayment | PaymentType::Debit => 1,
        }
    }
}

/// An immutable ledger entry documenting a balance-affecting payment or
/// debit event.
///
/// Created exactly once per payment event, in the same database
/// transaction as the account balance mutation it describes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct PaymentRecord {
    pub id: String,
    pub account_id: String,
    pub staff_id: String,
    pub payment_type: PaymentType,
    pub method: PaymentMethod,
    /// Amount in cents; always positive, direction comes from payment_type.
    pub amount_cents: i64,
    /// External reference (check number, transfer id).
    pub reference: Option<String>,
    pub notes: Option<String>,
    /// When the money moved.
    pub paid_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    /// Sync version for offline conflict resolution.
    pub sync_version: i64,
}

impl PaymentRecord {
    /// Returns the amount as Money.
    #[inline]
    pub fn amount(&self) -> Money {
        Money::from_cents(self.amount_cents)
    }
}

// =============================================================================
// Staff
// =============================================================================

/// A staff member who can operate the register.
///
/// Only a credential check lives in this system: `code` plus a hashed PIN
/// resolve to a session. Roles and permissions belong to the host.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Staff {
    pub id: String,
    /// Login code - business identifier.
    pub code: String,
    pub name: String,
    /// Argon2 hash of the login PIN. Never serialized outward.
    #[serde(skip_serializing)]
    pub pin_hash: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Sync Outbox
// =============================================================================

/// An entry in the sync outbox queue.
///
/// Uses the outbox pattern for reliable offline-first sync: the row is
/// written in the same transaction as the business mutation it describes,
/// so an entity and its pending-sync marker can never disagree.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct SyncOutboxEntry {
    pub id: String,
    /// Type of entity being synced: "SALE", "PAYMENT", "EGG_COLLECTION".
    pub entity_type: String,
    /// ID of the entity being synced.
    pub entity_id: String,
    /// The full entity data as JSON.
    pub payload: String,
    /// Number of sync attempts.
    pub attempts: i64,
    /// Last error message if sync failed.
    pub last_error: Option<String>,
    pub created_at: DateTime<Utc>,
    /// When last sync was attempted.
    pub attempted_at: Option<DateTime<Utc>>,
    /// When successfully synced.
    pub synced_at: Option<DateTime<Utc>>,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tax_rate_from_bps() {
        let rate = TaxRate::from_bps(800);
        assert_eq!(rate.bps(), 800);
        assert!((rate.percentage() - 8.0).abs() < 0.001);
    }

    #[test]
    fn test_tax_rate_from_percentage() {
        let rate = TaxRate::from_percentage(8.25);
        assert_eq!(rate.bps(), 825);
    }

    #[test]
    fn test_account_kind_pricing_tier() {
        assert!(AccountKind::Farmer.buys_wholesale());
        assert!(AccountKind::Wholesale.buys_wholesale());
        assert!(!AccountKind::Regular.buys_wholesale());
        assert!(!AccountKind::Vendor.buys_wholesale());
    }

    #[test]
    fn test_payment_type_balance_sign() {
        assert_eq!(PaymentType::CustomerPayment.balance_sign(), -1);
        assert_eq!(PaymentType::EggPayment.balance_sign(), 1);
        assert_eq!(PaymentType::Debit.balance_sign(), 1);
    }

    #[test]
    fn test_payment_method_is_credit() {
        assert!(PaymentMethod::Credit.is_credit());
        assert!(!PaymentMethod::Cash.is_credit());
        assert!(!PaymentMethod::BankTransfer.is_credit());
    }
}
