//! # Error Types
//!
//! Domain-specific error types for agripos-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  agripos-core errors (this file)                                       │
//! │  ├── CoreError        - Business rule violations                       │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  agripos-db errors (separate crate)                                    │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  agripos-ledger errors (separate crate)                                │
//! │  └── LedgerError      - What callers of the ledger see                 │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → LedgerError → Caller    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (account id, amounts, SKU)
//! 3. Errors are enum variants, never String
//! 4. Each error variant maps to a user-facing message

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// These errors represent business rule violations. They are caught at the
/// ledger boundary and translated to user-facing rejections.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Account cannot be found.
    #[error("Account not found: {0}")]
    AccountNotFound(String),

    /// Product cannot be found.
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// Sale not found.
    #[error("Sale not found: {0}")]
    SaleNotFound(String),

    /// Credit gate failed: the sale total does not fit under the account's
    /// remaining credit.
    ///
    /// ## When This Occurs
    /// - A CREDIT sale is attempted and `credit_limit - credit_balance`
    ///   is smaller than the sale total, evaluated atomically at commit
    ///
    /// ## User Workflow
    /// ```text
    /// Checkout (CREDIT, total 172.80)
    ///      │
    ///      ▼
    /// Guarded balance update: limit 150.00, balance 20.00
    ///      │
    ///      ▼
    /// InsufficientCredit { limit: 15000, balance: 2000, requested: 17280 }
    ///      │
    ///      ▼
    /// UI shows: "Insufficient credit available"
    /// ```
    #[error("Insufficient credit for account {account_id}: limit {limit_cents}, balance {balance_cents}, requested {requested_cents}")]
    InsufficientCredit {
        account_id: String,
        limit_cents: i64,
        balance_cents: i64,
        requested_cents: i64,
    },

    /// Insufficient stock to complete a sale line.
    ///
    /// ## When This Occurs
    /// - Selling more than available stock of a tracked product that does
    ///   not allow negative stock
    #[error("Insufficient stock for {sku}: available {available}, requested {requested}")]
    InsufficientStock {
        sku: String,
        available: i64,
        requested: i64,
    },

    /// A CREDIT sale was submitted without a customer account.
    #[error("A credit sale requires a customer account")]
    CreditSaleRequiresAccount,

    /// Sale is not in a state that allows the requested operation.
    ///
    /// ## When This Occurs
    /// - Cancelling an already cancelled sale
    /// - Settling a sale that is not pending
    #[error("Sale {sale_id} is {current_status}, cannot perform operation")]
    InvalidSaleStatus {
        sale_id: String,
        current_status: String,
    },

    /// Cart has exceeded maximum allowed items.
    #[error("Cart cannot have more than {max} items")]
    CartTooLarge { max: usize },

    /// Item quantity exceeds maximum allowed.
    #[error("Quantity {requested} exceeds maximum allowed ({max})")]
    QuantityTooLarge { requested: i64, max: i64 },

    /// Payment amount is invalid for the targeted account.
    #[error("Invalid payment amount: {reason}")]
    InvalidPaymentAmount { reason: String },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when input doesn't meet requirements. Used for early
/// validation before business logic runs; a validation failure never leaves
/// partial state behind.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Payment amount exceeds the outstanding balance.
    ///
    /// A payment can never overshoot what is owed; the operation is
    /// rejected rather than clamped.
    #[error("payment of {amount_cents} exceeds outstanding balance of {balance_cents}")]
    ExceedsBalance {
        amount_cents: i64,
        balance_cents: i64,
    },

    /// Invalid format (e.g., invalid UUID).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Duplicate value (e.g., duplicate receipt number).
    #[error("{field} '{value}' already exists")]
    Duplicate { field: String, value: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::InsufficientCredit {
            account_id: "acc-1".to_string(),
            limit_cents: 15000,
            balance_cents: 2000,
            requested_cents: 17280,
        };
        assert_eq!(
            err.to_string(),
            "Insufficient credit for account acc-1: limit 15000, balance 2000, requested 17280"
        );

        let err = CoreError::InsufficientStock {
            sku: "FEED-50KG".to_string(),
            available: 3,
            requested: 5,
        };
        assert_eq!(
            err.to_string(),
            "Insufficient stock for FEED-50KG: available 3, requested 5"
        );
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "account".to_string(),
        };
        assert_eq!(err.to_string(), "account is required");

        let err = ValidationError::ExceedsBalance {
            amount_cents: 20000,
            balance_cents: 17280,
        };
        assert_eq!(
            err.to_string(),
            "payment of 20000 exceeds outstanding balance of 17280"
        );
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::MustBePositive {
            field: "amount".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
