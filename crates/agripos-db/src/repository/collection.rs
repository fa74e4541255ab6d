//! # Egg Collection Repository
//!
//! Database operations for farm-gate egg collections.
//!
//! The insert is transaction-scoped: a collection row never exists without
//! the paired farmer accrual and egg stock increment, and vice versa.

use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use agripos_core::EggCollection;

/// Repository for egg collection database operations.
#[derive(Debug, Clone)]
pub struct EggCollectionRepository {
    pool: SqlitePool,
}

const COLLECTION_COLUMNS: &str = r#"
    id, farmer_id, route_id, staff_id,
    hen_small, hen_medium, hen_large, hen_xl, hen_damaged,
    duck_small, duck_medium, duck_large, duck_xl, duck_damaged,
    hen_price_cents, duck_price_cents, total_value_cents,
    paid, collected_at, created_at, sync_version
"#;

impl EggCollectionRepository {
    /// Creates a new EggCollectionRepository.
    pub fn new(pool: SqlitePool) -> Self {
        EggCollectionRepository { pool }
    }

    /// Gets a collection by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<EggCollection>> {
        let collection = sqlx::query_as::<_, EggCollection>(&format!(
            "SELECT {COLLECTION_COLUMNS} FROM egg_collections WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(collection)
    }

    /// Lists collections for a farmer, newest first.
    pub async fn list_for_farmer(
        &self,
        farmer_id: &str,
        limit: u32,
    ) -> DbResult<Vec<EggCollection>> {
        let collections = sqlx::query_as::<_, EggCollection>(&format!(
            "SELECT {COLLECTION_COLUMNS} FROM egg_collections
             WHERE farmer_id = ?1
             ORDER BY collected_at DESC LIMIT ?2"
        ))
        .bind(farmer_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(collections)
    }

    /// Marks a collection as paid out.
    pub async fn mark_paid(&self, id: &str) -> DbResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE egg_collections SET
                paid = 1,
                sync_version = sync_version + 1
            WHERE id = ?1 AND paid = 0
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("EggCollection (unpaid)", id));
        }

        Ok(())
    }

    /// Sums the unpaid collection value for a farmer (reconciliation aid).
    pub async fn unpaid_value_for_farmer(&self, farmer_id: &str) -> DbResult<i64> {
        let total: Option<i64> = sqlx::query_scalar(
            r#"
            SELECT SUM(total_value_cents) FROM egg_collections
            WHERE farmer_id = ?1 AND paid = 0
            "#,
        )
        .bind(farmer_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(total.unwrap_or(0))
    }
}

// =============================================================================
// Transaction-Scoped Statement Helpers
// =============================================================================

/// Inserts a collection inside the collection transaction.
pub async fn insert_collection_tx(
    conn: &mut SqliteConnection,
    collection: &EggCollection,
) -> DbResult<()> {
    debug!(
        id = %collection.id,
        farmer_id = %collection.farmer_id,
        value = %collection.total_value_cents,
        "Inserting egg collection"
    );

    sqlx::query(
        r#"
        INSERT INTO egg_collections (
            id, farmer_id, route_id, staff_id,
            hen_small, hen_medium, hen_large, hen_xl, hen_damaged,
            duck_small, duck_medium, duck_large, duck_xl, duck_damaged,
            hen_price_cents, duck_price_cents, total_value_cents,
            paid, collected_at, created_at, sync_version
        ) VALUES (
            ?1, ?2, ?3, ?4,
            ?5, ?6, ?7, ?8, ?9,
            ?10, ?11, ?12, ?13, ?14,
            ?15, ?16, ?17,
            ?18, ?19, ?20, ?21
        )
        "#,
    )
    .bind(&collection.id)
    .bind(&collection.farmer_id)
    .bind(&collection.route_id)
    .bind(&collection.staff_id)
    .bind(collection.hen_small)
    .bind(collection.hen_medium)
    .bind(collection.hen_large)
    .bind(collection.hen_xl)
    .bind(collection.hen_damaged)
    .bind(collection.duck_small)
    .bind(collection.duck_medium)
    .bind(collection.duck_large)
    .bind(collection.duck_xl)
    .bind(collection.duck_damaged)
    .bind(collection.hen_price_cents)
    .bind(collection.duck_price_cents)
    .bind(collection.total_value_cents)
    .bind(collection.paid)
    .bind(collection.collected_at)
    .bind(collection.created_at)
    .bind(collection.sync_version)
    .execute(conn)
    .await?;

    Ok(())
}

/// Generates a new collection ID.
pub fn generate_collection_id() -> String {
    Uuid::new_v4().to_string()
}
