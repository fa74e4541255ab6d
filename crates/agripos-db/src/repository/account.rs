//! # Account Repository
//!
//! Database operations for credit-bearing accounts.
//!
//! ## Guarded Balance Mutation
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Balance Update Strategy                              │
//! │                                                                         │
//! │  ❌ WRONG: read-modify-write (check-then-act race)                     │
//! │     let acc = get_by_id(id);                                           │
//! │     if acc.limit - acc.balance >= total { ... }   ← stale by now       │
//! │     UPDATE accounts SET credit_balance_cents = <computed>              │
//! │                                                                         │
//! │  ✅ CORRECT: the gate lives inside the write                           │
//! │     UPDATE accounts                                                     │
//! │     SET credit_balance_cents = credit_balance_cents + :total           │
//! │     WHERE id = :id                                                      │
//! │       AND credit_limit_cents - credit_balance_cents >= :total          │
//! │                                                                         │
//! │  rows_affected = 0 means the gate failed (or the account is gone).     │
//! │  Two concurrent sales can never both pass on stale balances.           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The guarded helpers take `&mut SqliteConnection` so the ledger layer can
//! run them inside the same transaction as the sale/payment/collection
//! insert they pair with.

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use agripos_core::{Account, AccountKind};

/// Repository for account database operations.
#[derive(Debug, Clone)]
pub struct AccountRepository {
    pool: SqlitePool,
}

const ACCOUNT_COLUMNS: &str = r#"
    id, name, phone, kind,
    credit_limit_cents, credit_balance_cents, payment_terms_days,
    total_purchases_cents, total_egg_sales_cents,
    is_active, created_at, updated_at, sync_version
"#;

impl AccountRepository {
    /// Creates a new AccountRepository.
    pub fn new(pool: SqlitePool) -> Self {
        AccountRepository { pool }
    }

    /// Gets an account by its ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Account>> {
        let account = sqlx::query_as::<_, Account>(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(account)
    }

    /// Gets an account by phone number (counter lookup).
    pub async fn get_by_phone(&self, phone: &str) -> DbResult<Option<Account>> {
        let account = sqlx::query_as::<_, Account>(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE phone = ?1 AND is_active = 1"
        ))
        .bind(phone)
        .fetch_optional(&self.pool)
        .await?;

        Ok(account)
    }

    /// Lists active accounts of a given kind, sorted by name.
    pub async fn list_by_kind(&self, kind: AccountKind, limit: u32) -> DbResult<Vec<Account>> {
        let accounts = sqlx::query_as::<_, Account>(&format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts
             WHERE kind = ?1 AND is_active = 1
             ORDER BY name LIMIT ?2"
        ))
        .bind(kind)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(accounts)
    }

    /// Inserts a new account.
    pub async fn insert(&self, account: &Account) -> DbResult<Account> {
        debug!(id = %account.id, name = %account.name, "Inserting account");

        sqlx::query(
            r#"
            INSERT INTO accounts (
                id, name, phone, kind,
                credit_limit_cents, credit_balance_cents, payment_terms_days,
                total_purchases_cents, total_egg_sales_cents,
                is_active, created_at, updated_at, sync_version
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)
            "#,
        )
        .bind(&account.id)
        .bind(&account.name)
        .bind(&account.phone)
        .bind(account.kind)
        .bind(account.credit_limit_cents)
        .bind(account.credit_balance_cents)
        .bind(account.payment_terms_days)
        .bind(account.total_purchases_cents)
        .bind(account.total_egg_sales_cents)
        .bind(account.is_active)
        .bind(account.created_at)
        .bind(account.updated_at)
        .bind(account.sync_version)
        .execute(&self.pool)
        .await?;

        Ok(account.clone())
    }

    /// Updates the profile fields of an account (never the balance).
    ///
    /// Balance mutations only happen through the guarded helpers below;
    /// this method cannot touch them.
    pub async fn update_profile(
        &self,
        id: &str,
        name: &str,
        phone: Option<&str>,
        credit_limit_cents: i64,
        payment_terms_days: i64,
    ) -> DbResult<()> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE accounts SET
                name = ?2,
                phone = ?3,
                credit_limit_cents = ?4,
                payment_terms_days = ?5,
                updated_at = ?6,
                sync_version = sync_version + 1
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(name)
        .bind(phone)
        .bind(credit_limit_cents)
        .bind(payment_terms_days)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Account", id));
        }

        Ok(())
    }

    /// Soft-deletes an account by setting is_active = false.
    pub async fn soft_delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Soft-deleting account");

        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE accounts SET
                is_active = 0,
                updated_at = ?2,
                sync_version = sync_version + 1
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Account", id));
        }

        Ok(())
    }
}

// =============================================================================
// Guarded Statement Helpers (transaction-scoped)
// =============================================================================

/// Fetches an account inside a transaction.
pub async fn get_by_id_tx(conn: &mut SqliteConnection, id: &str) -> DbResult<Option<Account>> {
    let account = sqlx::query_as::<_, Account>(&format!(
        "SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE id = ?1"
    ))
    .bind(id)
    .fetch_optional(conn)
    .await?;

    Ok(account)
}

/// Applies a credit sale to an account: `balance += total`,
/// `total_purchases += total`, gated on remaining credit.
///
/// Returns `false` when the gate failed (insufficient credit, inactive or
/// missing account). The caller distinguishes those cases and rolls the
/// surrounding transaction back.
pub async fn try_apply_credit_sale(
    conn: &mut SqliteConnection,
    account_id: &str,
    total_cents: i64,
) -> DbResult<bool> {
    debug!(account_id = %account_id, total = %total_cents, "Applying credit sale");

    let now = Utc::now();

    let result = sqlx::query(
        r#"
        UPDATE accounts SET
            credit_balance_cents = credit_balance_cents + ?2,
            total_purchases_cents = total_purchases_cents + ?2,
            updated_at = ?3,
            sync_version = sync_version + 1
        WHERE id = ?1
          AND is_active = 1
          AND credit_limit_cents - credit_balance_cents >= ?2
        "#,
    )
    .bind(account_id)
    .bind(total_cents)
    .bind(now)
    .execute(conn)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Records a cash-equivalent sale against the purchase counter without
/// touching the balance.
pub async fn apply_paid_sale(
    conn: &mut SqliteConnection,
    account_id: &str,
    total_cents: i64,
) -> DbResult<bool> {
    let now = Utc::now();

    let result = sqlx::query(
        r#"
        UPDATE accounts SET
            total_purchases_cents = total_purchases_cents + ?2,
            updated_at = ?3,
            sync_version = sync_version + 1
        WHERE id = ?1 AND is_active = 1
        "#,
    )
    .bind(account_id)
    .bind(total_cents)
    .bind(now)
    .execute(conn)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Applies a customer payment: `balance -= amount`, gated on the payment
/// not exceeding the outstanding balance.
///
/// Returns `false` when the gate failed. A payment is never clamped.
pub async fn try_apply_customer_payment(
    conn: &mut SqliteConnection,
    account_id: &str,
    amount_cents: i64,
) -> DbResult<bool> {
    debug!(account_id = %account_id, amount = %amount_cents, "Applying customer payment");

    let now = Utc::now();

    let result = sqlx::query(
        r#"
        UPDATE accounts SET
            credit_balance_cents = credit_balance_cents - ?2,
            updated_at = ?3,
            sync_version = sync_version + 1
        WHERE id = ?1
          AND is_active = 1
          AND credit_balance_cents >= ?2
        "#,
    )
    .bind(account_id)
    .bind(amount_cents)
    .bind(now)
    .execute(conn)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Accrues onto a farmer's running payable: `balance += amount`.
///
/// Used by EGG_PAYMENT and DEBIT record types. Both push the payable up;
/// the direction convention is pinned by tests.
pub async fn accrue_payable(
    conn: &mut SqliteConnection,
    account_id: &str,
    amount_cents: i64,
) -> DbResult<bool> {
    debug!(account_id = %account_id, amount = %amount_cents, "Accruing payable");

    let now = Utc::now();

    let result = sqlx::query(
        r#"
        UPDATE accounts SET
            credit_balance_cents = credit_balance_cents + ?2,
            updated_at = ?3,
            sync_version = sync_version + 1
        WHERE id = ?1 AND is_active = 1
        "#,
    )
    .bind(account_id)
    .bind(amount_cents)
    .bind(now)
    .execute(conn)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Accrues an egg collection onto a farmer account: `balance += value`,
/// `total_egg_sales += value`.
pub async fn accrue_egg_sales(
    conn: &mut SqliteConnection,
    account_id: &str,
    value_cents: i64,
) -> DbResult<bool> {
    debug!(account_id = %account_id, value = %value_cents, "Accruing egg sales");

    let now = Utc::now();

    let result = sqlx::query(
        r#"
        UPDATE accounts SET
            credit_balance_cents = credit_balance_cents + ?2,
            total_egg_sales_cents = total_egg_sales_cents + ?2,
            updated_at = ?3,
            sync_version = sync_version + 1
        WHERE id = ?1 AND is_active = 1
        "#,
    )
    .bind(account_id)
    .bind(value_cents)
    .bind(now)
    .execute(conn)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Helper to generate a new account ID.
pub fn generate_account_id() -> String {
    Uuid::new_v4().to_string()
}
