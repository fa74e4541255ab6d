//! # Account Statements
//!
//! Read-side view of an account: its sales, payment records, and derived
//! credit status.
//!
//! Credit status is never stored. It is computed here from the balance and
//! the oldest unpaid due date among pending credit sales, so it can never
//! go stale.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use agripos_core::ledger::credit_status;
use agripos_core::{Account, CoreError, CreditStatus, PaymentRecord, Sale};
use agripos_db::Database;

use crate::error::LedgerResult;

/// How many rows a statement carries per section.
const STATEMENT_LIMIT: u32 = 200;

/// An account's ledger view.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountStatement {
    pub account: Account,
    /// Derived aging classification, computed at read time.
    pub credit_status: CreditStatus,
    /// Sales against this account, newest first.
    pub sales: Vec<Sale>,
    /// Payment records for this account, newest first.
    pub payments: Vec<PaymentRecord>,
}

/// Produces account statements.
#[derive(Debug, Clone)]
pub struct StatementService {
    db: Database,
}

impl StatementService {
    /// Creates a statement service.
    pub fn new(db: Database) -> Self {
        StatementService { db }
    }

    /// Builds the statement for an account.
    pub async fn statement(&self, account_id: &str) -> LedgerResult<AccountStatement> {
        let account = self
            .db
            .accounts()
            .get_by_id(account_id)
            .await?
            .ok_or_else(|| CoreError::AccountNotFound(account_id.to_string()))?;

        let oldest_due = self.db.sales().oldest_unpaid_due_date(account_id).await?;
        let status = credit_status(account.credit_balance_cents, oldest_due, Utc::now());

        let sales = self
            .db
            .sales()
            .list_for_account(account_id, STATEMENT_LIMIT)
            .await?;
        let payments = self
            .db
            .payments()
            .list_for_account(account_id, STATEMENT_LIMIT)
            .await?;

        Ok(AccountStatement {
            account,
            credit_status: status,
            sales,
            payments,
        })
    }

    /// Derives just the credit status of an account.
    pub async fn credit_status(&self, account_id: &str) -> LedgerResult<CreditStatus> {
        let account = self
            .db
            .accounts()
            .get_by_id(account_id)
            .await?
            .ok_or_else(|| CoreError::AccountNotFound(account_id.to_string()))?;

        let oldest_due = self.db.sales().oldest_unpaid_due_date(account_id).await?;
        Ok(credit_status(
            account.credit_balance_cents,
            oldest_due,
            Utc::now(),
        ))
    }
}
