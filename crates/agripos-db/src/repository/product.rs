//! # Product Repository
//!
//! Database operations for products.
//!
//! ## Key Operations
//! - CRUD operations
//! - Name/SKU search for counter lookup
//! - Guarded stock decrement for the checkout flow
//!
//! ## Stock Gate
//! Stock never silently goes negative: the decrement statement carries the
//! floor check, and products that explicitly allow negative stock (or
//! don't track inventory) bypass it. `rows_affected = 0` tells the
//! checkout flow to roll back and report the shortfall.

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use agripos_core::Product;

/// Repository for product database operations.
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

const PRODUCT_COLUMNS: &str = r#"
    id, sku, name, description, unit,
    price_cents, wholesale_price_cents, cost_cents,
    track_inventory, allow_negative_stock, current_stock,
    is_active, created_at, updated_at, sync_version
"#;

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Searches active products by name or SKU prefix.
    ///
    /// Empty query returns active products sorted by name.
    pub async fn search(&self, query: &str, limit: u32) -> DbResult<Vec<Product>> {
        let query = query.trim();

        debug!(query = %query, limit = %limit, "Searching products");

        if query.is_empty() {
            return self.list_active(limit).await;
        }

        let pattern = format!("{}%", query);

        let products = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products
             WHERE is_active = 1 AND (name LIKE ?1 OR sku LIKE ?1)
             ORDER BY name LIMIT ?2"
        ))
        .bind(pattern)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    /// Lists active products sorted by name.
    async fn list_active(&self, limit: u32) -> DbResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products
             WHERE is_active = 1
             ORDER BY name LIMIT ?1"
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    /// Gets a product by its ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Gets a product by its SKU.
    pub async fn get_by_sku(&self, sku: &str) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE sku = ?1"
        ))
        .bind(sku)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Inserts a new product.
    ///
    /// Fails with `DbError::UniqueViolation` if the SKU already exists.
    pub async fn insert(&self, product: &Product) -> DbResult<Product> {
        debug!(sku = %product.sku, "Inserting product");

        sqlx::query(
            r#"
            INSERT INTO products (
                id, sku, name, description, unit,
                price_cents, wholesale_price_cents, cost_cents,
                track_inventory, allow_negative_stock, current_stock,
                is_active, created_at, updated_at, sync_version
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)
            "#,
        )
        .bind(&product.id)
        .bind(&product.sku)
        .bind(&product.name)
        .bind(&product.description)
        .bind(&product.unit)
        .bind(product.price_cents)
        .bind(product.wholesale_price_cents)
        .bind(product.cost_cents)
        .bind(product.track_inventory)
        .bind(product.allow_negative_stock)
        .bind(product.current_stock)
        .bind(product.is_active)
        .bind(product.created_at)
        .bind(product.updated_at)
        .bind(product.sync_version)
        .execute(&self.pool)
        .await?;

        Ok(product.clone())
    }

    /// Updates an existing product.
    pub async fn update(&self, product: &Product) -> DbResult<()> {
        debug!(id = %product.id, "Updating product");

        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE products SET
                sku = ?2,
                name = ?3,
                description = ?4,
                unit = ?5,
                price_cents = ?6,
                wholesale_price_cents = ?7,
                cost_cents = ?8,
                track_inventory = ?9,
                allow_negative_stock = ?10,
                current_stock = ?11,
                is_active = ?12,
                updated_at = ?13,
                sync_version = sync_version + 1
            WHERE id = ?1
            "#,
        )
        .bind(&product.id)
        .bind(&product.sku)
        .bind(&product.name)
        .bind(&product.description)
        .bind(&product.unit)
        .bind(product.price_cents)
        .bind(product.wholesale_price_cents)
        .bind(product.cost_cents)
        .bind(product.track_inventory)
        .bind(product.allow_negative_stock)
        .bind(product.current_stock)
        .bind(product.is_active)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", &product.id));
        }

        Ok(())
    }

    /// Soft-deletes a product. Historical sales keep referencing it.
    pub async fn soft_delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Soft-deleting product");

        let now = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE products SET
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
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }

    /// Counts active products (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE is_active = 1")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Guarded Statement Helpers (transaction-scoped)
// =============================================================================

/// Fetches a product inside a transaction.
pub async fn get_by_id_tx(conn: &mut SqliteConnection, id: &str) -> DbResult<Option<Product>> {
    let product = sqlx::query_as::<_, Product>(&format!(
        "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?1"
    ))
    .bind(id)
    .fetch_optional(conn)
    .await?;

    Ok(product)
}

/// Decrements stock by the sold quantity, gated on the floor check.
///
/// Callers skip products that don't track inventory. Products that
/// explicitly allow negative stock always pass. Returns `false` on a
/// shortfall so the checkout flow can roll back and report it.
pub async fn try_decrement_stock(
    conn: &mut SqliteConnection,
    product_id: &str,
    quantity: i64,
) -> DbResult<bool> {
    debug!(product_id = %product_id, quantity = %quantity, "Decrementing stock");

    let now = Utc::now();

    let result = sqlx::query(
        r#"
        UPDATE products SET
            current_stock = COALESCE(current_stock, 0) - ?2,
            updated_at = ?3,
            sync_version = sync_version + 1
        WHERE id = ?1
          AND is_active = 1
          AND track_inventory = 1
          AND (
              allow_negative_stock = 1
              OR COALESCE(current_stock, 0) - ?2 >= 0
          )
        "#,
    )
    .bind(product_id)
    .bind(quantity)
    .bind(now)
    .execute(conn)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Increments stock (restocking, egg collections landing in the crate
/// room). Delta updates keep offline terminals mergeable.
pub async fn increment_stock(
    conn: &mut SqliteConnection,
    product_id: &str,
    quantity: i64,
) -> DbResult<bool> {
    debug!(product_id = %product_id, quantity = %quantity, "Incrementing stock");

    let now = Utc::now();

    let result = sqlx::query(
        r#"
        UPDATE products SET
            current_stock = COALESCE(current_stock, 0) + ?2,
            updated_at = ?3,
            sync_version = sync_version + 1
        WHERE id = ?1 AND is_active = 1
        "#,
    )
    .bind(product_id)
    .bind(quantity)
    .bind(now)
    .execute(conn)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Helper to generate a new product ID.
pub fn generate_product_id() -> String {
    Uuid::new_v4().to_string()
}
