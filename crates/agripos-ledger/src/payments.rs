//! # Payment Application
//!
//! Records a payment event and adjusts the paired account balance in the
//! correct direction, in one transaction.
//!
//! ## Directions
//! ```text
//! CUSTOMER_PAYMENT  balance -= amount   (gated: amount <= balance)
//! EGG_PAYMENT       balance += amount   (farmer running payable)
//! DEBIT             balance += amount
//! ```
//!
//! The farmer-side direction mirrors the store's books: a farmer's
//! `credit_balance` is their running payable total, and both egg accruals
//! and explicit debits push it up. Disbursement tracking is a separate
//! concern. The convention is pinned by tests; changing it is a product
//! decision, not a refactor.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;

use agripos_core::validation::validate_payment_amount;
use agripos_core::{CoreError, PaymentMethod, PaymentRecord, PaymentType, ValidationError};
use agripos_db::repository::{account, payment, sale, sync};
use agripos_db::Database;

use crate::error::{LedgerError, LedgerResult};
use crate::session::Session;

// =============================================================================
// Request Type
// =============================================================================

/// A request to record a payment or debit against an account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentRequest {
    pub account_id: String,
    pub payment_type: PaymentType,
    pub method: PaymentMethod,
    /// Always positive; direction comes from `payment_type`.
    pub amount_cents: i64,
    /// External reference (check number, transfer id).
    pub reference: Option<String>,
    pub notes: Option<String>,
}

// =============================================================================
// Payment Service
// =============================================================================

/// Applies payment events to accounts.
#[derive(Debug, Clone)]
pub struct PaymentService {
    db: Database,
}

impl PaymentService {
    /// Creates a payment service.
    pub fn new(db: Database) -> Self {
        PaymentService { db }
    }

    /// Records a payment event and applies its balance effect.
    ///
    /// ## Errors
    /// - `Core(Validation)` - amount <= 0, or a customer payment exceeding
    ///   the outstanding balance
    /// - `Core(AccountNotFound)`
    ///
    /// Any error leaves the database untouched: the record insert and the
    /// balance mutation share one transaction.
    pub async fn record_payment(
        &self,
        session: &Session,
        request: PaymentRequest,
    ) -> LedgerResult<PaymentRecord> {
        validate_payment_amount(request.amount_cents)?;

        let mut tx = self.db.begin().await?;

        let account_row = account::get_by_id_tx(&mut *tx, &request.account_id)
            .await?
            .filter(|a| a.is_active)
            .ok_or_else(|| CoreError::AccountNotFound(request.account_id.clone()))?;

        match request.payment_type {
            PaymentType::CustomerPayment => {
                let applied = account::try_apply_customer_payment(
                    &mut *tx,
                    &account_row.id,
                    request.amount_cents,
                )
                .await?;
                if !applied {
                    // The gate failed: the payment would overshoot the
                    // balance. Rejected, never clamped.
                    return Err(ValidationError::ExceedsBalance {
                        amount_cents: request.amount_cents,
                        balance_cents: account_row.credit_balance_cents,
                    }
                    .into());
                }

                // The snapshot is transaction-consistent: this payment is
                // the only writer inside this transaction, so the post-
                // payment balance is exactly snapshot - amount.
                if account_row.credit_balance_cents - request.amount_cents == 0 {
                    let settled =
                        sale::settle_pending_for_account_tx(&mut *tx, &account_row.id).await?;
                    if settled > 0 {
                        info!(
                            account_id = %account_row.id,
                            sales = settled,
                            "Pending credit sales settled"
                        );
                    }
                }
            }
            PaymentType::EggPayment | PaymentType::Debit => {
                let applied =
                    account::accrue_payable(&mut *tx, &account_row.id, request.amount_cents)
                        .await?;
                if !applied {
                    return Err(LedgerError::consistency(
                        "payment",
                        &account_row.id,
                        request.amount_cents,
                        "account row vanished mid-transaction",
                    ));
                }
            }
        }

        let now = Utc::now();
        let record = PaymentRecord {
            id: payment::generate_payment_id(),
            account_id: account_row.id.clone(),
            staff_id: session.staff_id.clone(),
            payment_type: request.payment_type,
            method: request.method,
            amount_cents: request.amount_cents,
            reference: request.reference.clone(),
            notes: request.notes.clone(),
            paid_at: now,
            created_at: now,
            sync_version: 0,
        };

        payment::insert_record_tx(&mut *tx, &record).await?;

        let payload = serde_json::to_string(&record)
            .map_err(|e| agripos_db::DbError::Internal(e.to_string()))?;
        sync::queue_for_sync_tx(&mut *tx, "PAYMENT", &record.id, &payload).await?;

        tx.commit().await?;

        info!(
            payment_id = %record.id,
            account_id = %record.account_id,
            amount = %record.amount_cents,
            payment_type = ?record.payment_type,
            "Payment recorded"
        );

        Ok(record)
    }
}
