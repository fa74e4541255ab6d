//! # Sync Outbox Repository
//!
//! Manages the sync outbox queue for offline-first synchronization.
//!
//! ## The Outbox Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Outbox Pattern Implementation                        │
//! │                                                                         │
//! │  LEDGER FLOW (e.g., checkout)                                          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   SINGLE TRANSACTION                            │   │
//! │  │                                                                 │   │
//! │  │  1. INSERT INTO sales ... / UPDATE accounts ...                │   │
//! │  │                                                                 │   │
//! │  │  2. INSERT INTO sync_outbox (entity_type, entity_id, payload)  │   │
//! │  │     VALUES ('SALE', ?, <full sale JSON>)                       │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  COMMIT ← Both succeed or both fail                                    │
//! │                                                                         │
//! │  A later sync worker drains rows where synced_at IS NULL. Offline?     │
//! │  Entries queue up. The entity and its pending-sync marker can never    │
//! │  disagree.                                                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::error::DbResult;
use agripos_core::SyncOutboxEntry;

/// Repository for sync outbox operations.
#[derive(Debug, Clone)]
pub struct SyncOutboxRepository {
    pool: SqlitePool,
}

impl SyncOutboxRepository {
    /// Creates a new SyncOutboxRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SyncOutboxRepository { pool }
    }

    /// Gets pending entries that need to be synced, oldest first.
    pub async fn get_pending(&self, limit: u32) -> DbResult<Vec<SyncOutboxEntry>> {
        let entries = sqlx::query_as::<_, SyncOutboxEntry>(
            r#"
            SELECT id, entity_type, entity_id, payload, attempts, last_error,
                   created_at, attempted_at, synced_at
            FROM sync_outbox
            WHERE synced_at IS NULL
            ORDER BY created_at ASC
            LIMIT ?1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }

    /// Marks an entry as successfully synced.
    pub async fn mark_synced(&self, id: &str) -> DbResult<()> {
        let now = Utc::now();

        sqlx::query(
            r#"
            UPDATE sync_outbox SET synced_at = ?2, attempted_at = ?2 WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Records a sync failure.
    pub async fn mark_failed(&self, id: &str, error: &str) -> DbResult<()> {
        let now = Utc::now();

        sqlx::query(
            r#"
            UPDATE sync_outbox SET
                attempts = attempts + 1,
                last_error = ?2,
                attempted_at = ?3
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(error)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Counts pending sync entries.
    pub async fn count_pending(&self) -> DbResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM sync_outbox WHERE synced_at IS NULL")
                .fetch_one(&self.pool)
                .await?;

        Ok(count)
    }

    /// Deletes entries synced more than `days_old` days ago.
    pub async fn cleanup_old_entries(&self, days_old: u32) -> DbResult<u64> {
        let result = sqlx::query(
            r#"
            DELETE FROM sync_outbox
            WHERE synced_at IS NOT NULL
            AND synced_at < datetime('now', '-' || ?1 || ' days')
            "#,
        )
        .bind(days_old)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}

// =============================================================================
// Transaction-Scoped Statement Helpers
// =============================================================================

/// Queues an entity for sync inside the same transaction as the mutation
/// it describes.
///
/// ## Arguments
/// * `entity_type` - "SALE", "PAYMENT", "EGG_COLLECTION", "ACCOUNT"
/// * `entity_id` - The entity's UUID
/// * `payload` - JSON serialization of the full entity
pub async fn queue_for_sync_tx(
    conn: &mut SqliteConnection,
    entity_type: &str,
    entity_id: &str,
    payload: &str,
) -> DbResult<SyncOutboxEntry> {
    let now = Utc::now();

    debug!(entity_type = %entity_type, entity_id = %entity_id, "Queuing for sync");

    let entry = SyncOutboxEntry {
        id: Uuid::new_v4().to_string(),
        entity_type: entity_type.to_string(),
        entity_id: entity_id.to_string(),
        payload: payload.to_string(),
        attempts: 0,
        last_error: None,
        created_at: now,
        attempted_at: None,
        synced_at: None,
    };

    sqlx::query(
        r#"
        INSERT INTO sync_outbox (
            id, entity_type, entity_id, payload,
            attempts, last_error, created_at, attempted_at, synced_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
        "#,
    )
    .bind(&entry.id)
    .bind(&entry.entity_type)
    .bind(&entry.entity_id)
    .bind(&entry.payload)
    .bind(entry.attempts)
    .bind(&entry.last_error)
    .bind(entry.created_at)
    .bind(entry.attempted_at)
    .bind(entry.synced_at)
    .execute(conn)
    .await?;

    Ok(entry)
}
