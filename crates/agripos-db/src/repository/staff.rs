//! # Staff Repository
//!
//! Staff lookup and the credential check.
//!
//! Only a credential check lives in this system: a staff code plus PIN
//! resolve to a staff row, and the ledger layer turns that into a session.
//! Roles, permissions, and login UI belong to the host.
//!
//! PINs are stored as argon2 hashes; the plain PIN never touches the
//! database.

use argon2::password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use agripos_core::Staff;

/// Repository for staff database operations.
#[derive(Debug, Clone)]
pub struct StaffRepository {
    pool: SqlitePool,
}

const STAFF_COLUMNS: &str = r#"
    id, code, name, pin_hash, is_active, created_at, updated_at
"#;

impl StaffRepository {
    /// Creates a new StaffRepository.
    pub fn new(pool: SqlitePool) -> Self {
        StaffRepository { pool }
    }

    /// Gets a staff member by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Staff>> {
        let staff = sqlx::query_as::<_, Staff>(&format!(
            "SELECT {STAFF_COLUMNS} FROM staff WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(staff)
    }

    /// Gets a staff member by login code.
    pub async fn get_by_code(&self, code: &str) -> DbResult<Option<Staff>> {
        let staff = sqlx::query_as::<_, Staff>(&format!(
            "SELECT {STAFF_COLUMNS} FROM staff WHERE code = ?1"
        ))
        .bind(code)
        .fetch_optional(&self.pool)
        .await?;

        Ok(staff)
    }

    /// Creates a staff member, hashing the PIN.
    pub async fn create(&self, code: &str, name: &str, pin: &str) -> DbResult<Staff> {
        debug!(code = %code, "Creating staff member");

        let salt = SaltString::generate(&mut OsRng);
        let pin_hash = Argon2::default()
            .hash_password(pin.as_bytes(), &salt)
            .map_err(|e| DbError::Internal(format!("PIN hashing failed: {e}")))?
            .to_string();

        let now = Utc::now();
        let staff = Staff {
            id: Uuid::new_v4().to_string(),
            code: code.to_string(),
            name: name.to_string(),
            pin_hash,
            is_active: true,
            created_at: now,
            updated_at: now,
        };

        sqlx::query(
            r#"
            INSERT INTO staff (id, code, name, pin_hash, is_active, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&staff.id)
        .bind(&staff.code)
        .bind(&staff.name)
        .bind(&staff.pin_hash)
        .bind(staff.is_active)
        .bind(staff.created_at)
        .bind(staff.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(staff)
    }

    /// The credential check: code + PIN resolve to an active staff member.
    ///
    /// Returns `Ok(None)` on unknown code, inactive staff, or wrong PIN.
    /// Callers cannot distinguish which, and that is intentional.
    pub async fn verify_login(&self, code: &str, pin: &str) -> DbResult<Option<Staff>> {
        let staff = match self.get_by_code(code).await? {
            Some(staff) if staff.is_active => staff,
            _ => return Ok(None),
        };

        let parsed = PasswordHash::new(&staff.pin_hash)
            .map_err(|e| DbError::Internal(format!("Stored PIN hash is malformed: {e}")))?;

        if Argon2::default()
            .verify_password(pin.as_bytes(), &parsed)
            .is_ok()
        {
            Ok(Some(staff))
        } else {
            Ok(None)
        }
    }

    /// Deactivates a staff member.
    pub async fn deactivate(&self, id: &str) -> DbResult<()> {
        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE staff SET is_active = 0, updated_at = ?2 WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Staff", id));
        }

        Ok(())
    }
}
