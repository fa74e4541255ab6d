//! # Session Context
//!
//! The staff identity every ledger operation runs under.
//!
//! There is no process-global "current staff": a `Session` is resolved
//! once from a credential check and passed explicitly into every
//! operation. This keeps the ledger testable without a login flow and
//! makes each written row traceable to the staff member who caused it.

use serde::{Deserialize, Serialize};

use agripos_db::Database;

use crate::error::{LedgerError, LedgerResult};

/// An authenticated staff context.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// The staff member's UUID; stamped onto every sale, payment record,
    /// and egg collection.
    pub staff_id: String,
    /// Display name, for receipts and logs.
    pub staff_name: String,
}

impl Session {
    /// Resolves a session from a staff credential check.
    ///
    /// Returns `LedgerError::InvalidCredentials` on unknown code, wrong
    /// PIN, or deactivated staff; the caller cannot distinguish which.
    pub async fn login(db: &Database, code: &str, pin: &str) -> LedgerResult<Session> {
        let staff = db
            .staff()
            .verify_login(code, pin)
            .await?
            .ok_or(LedgerError::InvalidCredentials)?;

        Ok(Session {
            staff_id: staff.id,
            staff_name: staff.name,
        })
    }

    /// Builds a session directly from a known staff identity.
    ///
    /// For hosts that manage their own authentication and for tests.
    pub fn for_staff(staff_id: impl Into<String>, staff_name: impl Into<String>) -> Session {
        Session {
            staff_id: staff_id.into(),
            staff_name: staff_name.into(),
        }
    }
}
