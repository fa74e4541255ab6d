//! # Egg Collection Flow
//!
//! Converts per-grade egg counts into a monetary value owed to a farmer
//! and applies it, in one transaction.
//!
//! ## One Transaction
//! ```text
//! begin ──► INSERT egg_collections (counts, prices, valuation)
//!       ──► UPDATE accounts: balance += value, total_egg_sales += value
//!       ──► UPDATE products: egg product stock += sellable eggs
//!       ──► INSERT sync_outbox ('EGG_COLLECTION', …)
//! commit ◄── all of it, or none of it
//! ```
//!
//! Valuation is pure (agripos-core): sellable eggs per bird type at the
//! per-dozen price, partial dozens pro-rata, damaged eggs excluded.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use agripos_core::ledger::{collection_value, EggGrading};
use agripos_core::validation::validate_egg_count;
use agripos_core::{AccountKind, CoreError, EggCollection, Money, ValidationError};
use agripos_db::repository::{account, collection, product, sync};
use agripos_db::Database;

use crate::error::{LedgerError, LedgerResult};
use crate::session::Session;

// =============================================================================
// Request Type
// =============================================================================

/// A request to record a farm-gate egg collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollectionRequest {
    pub farmer_id: String,
    pub route_id: Option<String>,
    pub hen: EggGrading,
    pub duck: EggGrading,
    /// Hen egg price per dozen, in cents.
    pub hen_price_cents: i64,
    /// Duck egg price per dozen, in cents.
    pub duck_price_cents: i64,
    /// When the eggs were collected; defaults to now.
    pub collected_at: Option<DateTime<Utc>>,
}

// =============================================================================
// Collection Service
// =============================================================================

/// Records egg collections and applies their ledger effects.
#[derive(Debug, Clone)]
pub struct CollectionService {
    db: Database,
    /// The finished-egg product whose stock grows with each collection.
    /// None disables the inventory effect (e.g., eggs sold on directly).
    egg_product_id: Option<String>,
}

impl CollectionService {
    /// Creates a collection service with no linked egg product.
    pub fn new(db: Database) -> Self {
        CollectionService {
            db,
            egg_product_id: None,
        }
    }

    /// Links the finished-egg product that collected eggs flow into.
    pub fn with_egg_product(mut self, product_id: impl Into<String>) -> Self {
        self.egg_product_id = Some(product_id.into());
        self
    }

    /// Records a collection: valuation, farmer accrual, and egg stock in
    /// one transaction.
    ///
    /// ## Errors
    /// - `Core(Validation)` - negative counts or prices, or the account is
    ///   not a farmer
    /// - `Core(AccountNotFound)`
    pub async fn record_collection(
        &self,
        session: &Session,
        request: CollectionRequest,
    ) -> LedgerResult<EggCollection> {
        for count in [
            request.hen.small,
            request.hen.medium,
            request.hen.large,
            request.hen.xl,
            request.hen.damaged,
            request.duck.small,
            request.duck.medium,
            request.duck.large,
            request.duck.xl,
            request.duck.damaged,
        ] {
            validate_egg_count(count)?;
        }
        if request.hen_price_cents < 0 || request.duck_price_cents < 0 {
            return Err(ValidationError::MustBePositive {
                field: "price per dozen".to_string(),
            }
            .into());
        }

        let mut tx = self.db.begin().await?;

        let farmer = account::get_by_id_tx(&mut *tx, &request.farmer_id)
            .await?
            .filter(|a| a.is_active)
            .ok_or_else(|| CoreError::AccountNotFound(request.farmer_id.clone()))?;

        if farmer.kind != AccountKind::Farmer {
            return Err(ValidationError::InvalidFormat {
                field: "farmer_id".to_string(),
                reason: "account is not a farmer".to_string(),
            }
            .into());
        }

        let value = collection_value(
            &request.hen,
            Money::from_cents(request.hen_price_cents),
            &request.duck,
            Money::from_cents(request.duck_price_cents),
        );

        let now = Utc::now();
        let record = EggCollection {
            id: collection::generate_collection_id(),
            farmer_id: farmer.id.clone(),
            route_id: request.route_id.clone(),
            staff_id: session.staff_id.clone(),
            hen_small: request.hen.small,
            hen_medium: request.hen.medium,
            hen_large: request.hen.large,
            hen_xl: request.hen.xl,
            hen_damaged: request.hen.damaged,
            duck_small: request.duck.small,
            duck_medium: request.duck.medium,
            duck_large: request.duck.large,
            duck_xl: request.duck.xl,
            duck_damaged: request.duck.damaged,
            hen_price_cents: request.hen_price_cents,
            duck_price_cents: request.duck_price_cents,
            total_value_cents: value.cents(),
            paid: false,
            collected_at: request.collected_at.unwrap_or(now),
            created_at: now,
            sync_version: 0,
        };

        collection::insert_collection_tx(&mut *tx, &record).await?;

        let accrued = account::accrue_egg_sales(&mut *tx, &farmer.id, value.cents()).await?;
        if !accrued {
            return Err(LedgerError::consistency(
                "egg_collection",
                &farmer.id,
                value.cents(),
                "farmer account row vanished mid-transaction",
            ));
        }

        // Collected eggs land in the crate room as sellable stock, tracked
        // in whole eggs.
        if let Some(product_id) = &self.egg_product_id {
            let incremented =
                product::increment_stock(&mut *tx, product_id, record.sellable_eggs()).await?;
            if !incremented {
                return Err(LedgerError::consistency(
                    "egg_collection",
                    &farmer.id,
                    value.cents(),
                    format!("egg product {product_id} missing or inactive"),
                ));
            }
        }

        let payload = serde_json::to_string(&record)
            .map_err(|e| agripos_db::DbError::Internal(e.to_string()))?;
        sync::queue_for_sync_tx(&mut *tx, "EGG_COLLECTION", &record.id, &payload).await?;

        tx.commit().await?;

        info!(
            collection_id = %record.id,
            farmer_id = %record.farmer_id,
            value = %record.total_value_cents,
            eggs = record.sellable_eggs(),
            "Egg collection recorded"
        );

        Ok(record)
    }
}
