//! # Sale Repository
//!
//! Database operations for sales and sale items.
//!
//! ## Sale Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Sale Lifecycle                                    │
//! │                                                                         │
//! │  CHECKOUT (one transaction, driven by agripos-ledger)                  │
//! │     ├── insert_sale_tx() + insert_item_tx() per line                   │
//! │     ├── CASH/BANK/CHECK/DIGITAL → status Completed, paid in full       │
//! │     └── CREDIT → status Pending, full total on balance, due date set   │
//! │                                                                         │
//! │  SETTLEMENT                                                            │
//! │     └── settle_pending_for_account_tx() → Pending sales flip to        │
//! │         Completed once the account balance reaches zero                │
//! │                                                                         │
//! │  CANCEL                                                                │
//! │     └── cancel_sale() → status Cancelled                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use agripos_core::{Sale, SaleItem};

/// Repository for sale database operations.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
}

const SALE_COLUMNS: &str = r#"
    id, receipt_number, customer_id, staff_id, status,
    subtotal_cents, tax_cents, discount_cents, total_cents,
    payment_method, paid_cents, balance_cents,
    due_date, notes, created_at, updated_at, sync_version
"#;

impl SaleRepository {
    /// Creates a new SaleRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository { pool }
    }

    /// Gets a sale by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Sale>> {
        let sale = sqlx::query_as::<_, Sale>(&format!(
            "SELECT {SALE_COLUMNS} FROM sales WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(sale)
    }

    /// Gets a sale by its receipt number.
    pub async fn get_by_receipt(&self, receipt_number: &str) -> DbResult<Option<Sale>> {
        let sale = sqlx::query_as::<_, Sale>(&format!(
            "SELECT {SALE_COLUMNS} FROM sales WHERE receipt_number = ?1"
        ))
        .bind(receipt_number)
        .fetch_optional(&self.pool)
        .await?;

        Ok(sale)
    }

    /// Gets all items for a sale.
    pub async fn get_items(&self, sale_id: &str) -> DbResult<Vec<SaleItem>> {
        let items = sqlx::query_as::<_, SaleItem>(
            r#"
            SELECT id, sale_id, product_id, sku_snapshot, name_snapshot,
                   unit_price_cents, quantity, line_total_cents, created_at
            FROM sale_items
            WHERE sale_id = ?1
            ORDER BY created_at
            "#,
        )
        .bind(sale_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    /// Lists sales for an account, newest first.
    pub async fn list_for_account(&self, account_id: &str, limit: u32) -> DbResult<Vec<Sale>> {
        let sales = sqlx::query_as::<_, Sale>(&format!(
            "SELECT {SALE_COLUMNS} FROM sales
             WHERE customer_id = ?1
             ORDER BY created_at DESC LIMIT ?2"
        ))
        .bind(account_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(sales)
    }

    /// The due date of the oldest pending credit sale for an account.
    ///
    /// Feeds the derived credit-status aging.
    pub async fn oldest_unpaid_due_date(
        &self,
        account_id: &str,
    ) -> DbResult<Option<DateTime<Utc>>> {
        let due: Option<DateTime<Utc>> = sqlx::query_scalar(
            r#"
            SELECT MIN(due_date) FROM sales
            WHERE customer_id = ?1 AND status = 'pending' AND due_date IS NOT NULL
            "#,
        )
        .bind(account_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(due)
    }

    /// Cancels a sale. Only pending sales can be cancelled here; reversing
    /// a completed sale is a refund, which is a different flow.
    pub async fn cancel_sale(&self, sale_id: &str) -> DbResult<()> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE sales SET
                status = 'cancelled',
                updated_at = ?2,
                sync_version = sync_version + 1
            WHERE id = ?1 AND status = 'pending'
            "#,
        )
        .bind(sale_id)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Sale (pending)", sale_id));
        }

        Ok(())
    }
}

// =============================================================================
// Transaction-Scoped Statement Helpers
// =============================================================================

/// Inserts a sale inside the checkout transaction.
pub async fn insert_sale_tx(conn: &mut SqliteConnection, sale: &Sale) -> DbResult<()> {
    debug!(id = %sale.id, receipt_number = %sale.receipt_number, "Inserting sale");

    sqlx::query(
        r#"
        INSERT INTO sales (
            id, receipt_number, customer_id, staff_id, status,
            subtotal_cents, tax_cents, discount_cents, total_cents,
            payment_method, paid_cents, balance_cents,
            due_date, notes, created_at, updated_at, sync_version
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17)
        "#,
    )
    .bind(&sale.id)
    .bind(&sale.receipt_number)
    .bind(&sale.customer_id)
    .bind(&sale.staff_id)
    .bind(sale.status)
    .bind(sale.subtotal_cents)
    .bind(sale.tax_cents)
    .bind(sale.discount_cents)
    .bind(sale.total_cents)
    .bind(sale.payment_method)
    .bind(sale.paid_cents)
    .bind(sale.balance_cents)
    .bind(sale.due_date)
    .bind(&sale.notes)
    .bind(sale.created_at)
    .bind(sale.updated_at)
    .bind(sale.sync_version)
    .execute(conn)
    .await?;

    Ok(())
}

/// Inserts a sale line item inside the checkout transaction.
///
/// ## Snapshot Pattern
/// Product details (sku, name, price) are copied onto the item. The sale
/// history stays intact even if the product changes later.
pub async fn insert_item_tx(conn: &mut SqliteConnection, item: &SaleItem) -> DbResult<()> {
    debug!(sale_id = %item.sale_id, product_id = %item.product_id, "Adding sale item");

    sqlx::query(
        r#"
        INSERT INTO sale_items (
            id, sale_id, product_id, sku_snapshot, name_snapshot,
            unit_price_cents, quantity, line_total_cents, created_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
        "#,
    )
    .bind(&item.id)
    .bind(&item.sale_id)
    .bind(&item.product_id)
    .bind(&item.sku_snapshot)
    .bind(&item.name_snapshot)
    .bind(item.unit_price_cents)
    .bind(item.quantity)
    .bind(item.line_total_cents)
    .bind(item.created_at)
    .execute(conn)
    .await?;

    Ok(())
}

/// Marks every pending credit sale of an account as completed.
///
/// Called inside the payment transaction when a customer payment brings
/// the account balance to zero: every outstanding sale is now covered.
/// Sales stay immutable otherwise; this is a status-only transition.
pub async fn settle_pending_for_account_tx(
    conn: &mut SqliteConnection,
    account_id: &str,
) -> DbResult<u64> {
    let now = Utc::now();

    let result = sqlx::query(
        r#"
        UPDATE sales SET
            status = 'completed',
            updated_at = ?2,
            sync_version = sync_version + 1
        WHERE customer_id = ?1 AND status = 'pending'
        "#,
    )
    .bind(account_id)
    .bind(now)
    .execute(conn)
    .await?;

    Ok(result.rows_affected())
}

/// Generates a receipt number in format: AGR-YYMMDD-HHMMSS-NNNN
///
/// The suffix comes from sub-second clock bits, which is unique enough for
/// a single terminal; the UNIQUE constraint on the column backs it up.
pub fn generate_receipt_number() -> String {
    let now = Utc::now();
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.subsec_nanos())
        .unwrap_or(0);
    let suffix: u16 = (nanos % 10000) as u16;
    format!("AGR-{}-{:04}", now.format("%y%m%d-%H%M%S"), suffix)
}

/// Generates a new sale ID.
pub fn generate_sale_id() -> String {
    Uuid::new_v4().to_string()
}

/// Generates a new sale item ID.
pub fn generate_sale_item_id() -> String {
    Uuid::new_v4().to_string()
}
