//! # Payment Record Repository
//!
//! Database operations for payment records.
//!
//! Payment records are immutable ledger entries. The insert is
//! transaction-scoped: a record never exists without the paired account
//! balance mutation, and vice versa.

use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::error::DbResult;
use agripos_core::{PaymentRecord, PaymentType};

/// Repository for payment record database operations.
#[derive(Debug, Clone)]
pub struct PaymentRecordRepository {
    pool: SqlitePool,
}

const PAYMENT_COLUMNS: &str = r#"
    id, account_id, staff_id, payment_type, method, amount_cents,
    reference, notes, paid_at, created_at, sync_version
"#;

impl PaymentRecordRepository {
    /// Creates a new PaymentRecordRepository.
    pub fn new(pool: SqlitePool) -> Self {
        PaymentRecordRepository { pool }
    }

    /// Gets a payment record by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<PaymentRecord>> {
        let record = sqlx::query_as::<_, PaymentRecord>(&format!(
            "SELECT {PAYMENT_COLUMNS} FROM payment_records WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    /// Lists payment records for an account, newest first.
    pub async fn list_for_account(
        &self,
        account_id: &str,
        limit: u32,
    ) -> DbResult<Vec<PaymentRecord>> {
        let records = sqlx::query_as::<_, PaymentRecord>(&format!(
            "SELECT {PAYMENT_COLUMNS} FROM payment_records
             WHERE account_id = ?1
             ORDER BY paid_at DESC LIMIT ?2"
        ))
        .bind(account_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    /// Sums recorded amounts of a given type for an account
    /// (reconciliation aid).
    pub async fn sum_for_account(
        &self,
        account_id: &str,
        payment_type: PaymentType,
    ) -> DbResult<i64> {
        let total: Option<i64> = sqlx::query_scalar(
            r#"
            SELECT SUM(amount_cents) FROM payment_records
            WHERE account_id = ?1 AND payment_type = ?2
            "#,
        )
        .bind(account_id)
        .bind(payment_type)
        .fetch_one(&self.pool)
        .await?;

        Ok(total.unwrap_or(0))
    }
}

// =============================================================================
// Transaction-Scoped Statement Helpers
// =============================================================================

/// Inserts a payment record inside the payment transaction.
pub async fn insert_record_tx(
    conn: &mut SqliteConnection,
    record: &PaymentRecord,
) -> DbResult<()> {
    debug!(
        id = %record.id,
        account_id = %record.account_id,
        amount = %record.amount_cents,
        "Inserting payment record"
    );

    sqlx::query(
        r#"
        INSERT INTO payment_records (
            id, account_id, staff_id, payment_type, method, amount_cents,
            reference, notes, paid_at, created_at, sync_version
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
        "#,
    )
    .bind(&record.id)
    .bind(&record.account_id)
    .bind(&record.staff_id)
    .bind(record.payment_type)
    .bind(record.method)
    .bind(record.amount_cents)
    .bind(&record.reference)
    .bind(&record.notes)
    .bind(record.paid_at)
    .bind(record.created_at)
    .bind(record.sync_version)
    .execute(conn)
    .await?;

    Ok(())
}

/// Generates a new payment record ID.
pub fn generate_payment_id() -> String {
    Uuid::new_v4().to_string()
}
