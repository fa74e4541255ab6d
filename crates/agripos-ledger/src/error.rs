//! # Ledger Error Type
//!
//! Unified error type for ledger operations.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in AgriPOS                                │
//! │                                                                         │
//! │  Host (UI/CLI)               Ledger Services                            │
//! │  ─────────────               ───────────────                            │
//! │                                                                         │
//! │  checkout(...)                                                          │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  Result<T, LedgerError>                                          │  │
//! │  │                                                                  │  │
//! │  │  Business rejection? ── Core(InsufficientCredit / Validation) ──┐│  │
//! │  │         │                                                       ││  │
//! │  │  Mid-transaction fault? ── Consistency { event, delta } ───────►││  │
//! │  │         │                   (logged, transaction rolled back)   ││  │
//! │  │  Infrastructure? ────────── Db(DbError) ───────────────────────►││  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │                                                                         │
//! │  Rejections are user-facing; Consistency and Db faults are logged      │
//! │  with enough context for manual reconciliation.                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;
use tracing::error;

use agripos_core::{CoreError, ValidationError};
use agripos_db::DbError;

/// Errors returned by ledger operations.
///
/// Every operation returns a success value or one of these; nothing throws
/// across the persistence boundary.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// A business rule rejected the operation. No state was changed.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// The staff credential check failed.
    #[error("Invalid staff code or PIN")]
    InvalidCredentials,

    /// A step inside a transaction affected an unexpected number of rows
    /// after its gates had already passed.
    ///
    /// The transaction is rolled back before this is returned; nothing is
    /// half-applied. Logged with account id, attempted delta, and the
    /// originating event id so the books can be reconciled by hand if it
    /// ever fires.
    #[error("Consistency fault during {event} for account {account_id} (delta {delta_cents}): {detail}")]
    Consistency {
        event: String,
        account_id: String,
        delta_cents: i64,
        detail: String,
    },

    /// Database infrastructure failure.
    #[error(transparent)]
    Db(#[from] DbError),
}

impl LedgerError {
    /// Builds and logs a consistency fault.
    pub fn consistency(
        event: &str,
        account_id: &str,
        delta_cents: i64,
        detail: impl Into<String>,
    ) -> Self {
        let detail = detail.into();
        error!(
            event = %event,
            account_id = %account_id,
            delta_cents = %delta_cents,
            detail = %detail,
            "Ledger consistency fault"
        );
        LedgerError::Consistency {
            event: event.to_string(),
            account_id: account_id.to_string(),
            delta_cents,
            detail,
        }
    }

    /// Whether this error is a user-facing rejection (as opposed to an
    /// internal fault).
    pub fn is_rejection(&self) -> bool {
        matches!(self, LedgerError::Core(_) | LedgerError::InvalidCredentials)
    }
}

impl From<ValidationError> for LedgerError {
    fn from(err: ValidationError) -> Self {
        LedgerError::Core(CoreError::Validation(err))
    }
}

impl From<sqlx::Error> for LedgerError {
    fn from(err: sqlx::Error) -> Self {
        LedgerError::Db(DbError::from(err))
    }
}

/// Result type for ledger operations.
pub type LedgerResult<T> = Result<T, LedgerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejection_classification() {
        let err: LedgerError = ValidationError::MustBePositive {
            field: "amount".to_string(),
        }
        .into();
        assert!(err.is_rejection());

        let err = LedgerError::consistency("checkout", "acc-1", 17_280, "account row vanished");
        assert!(!err.is_rejection());

        let err: LedgerError = DbError::PoolExhausted.into();
        assert!(!err.is_rejection());
    }

    #[test]
    fn test_consistency_message() {
        let err = LedgerError::consistency("payment", "acc-9", -500, "0 rows affected");
        assert_eq!(
            err.to_string(),
            "Consistency fault during payment for account acc-9 (delta -500): 0 rows affected"
        );
    }
}
