//! # Checkout Flow
//!
//! Converts a cart into a persisted sale and drives the consequent
//! account and inventory mutations.
//!
//! ## One Transaction
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Checkout Transaction                               │
//! │                                                                         │
//! │  begin ──► resolve account + products, price by tier                    │
//! │        ──► INSERT sale + sale_items (snapshots frozen)                  │
//! │        ──► CREDIT? guarded UPDATE accounts                              │
//! │        │          WHERE limit - balance >= total    ← the credit gate   │
//! │        ──► per line: guarded UPDATE products                            │
//! │        │          WHERE stock - qty >= 0 OR negatives allowed           │
//! │        ──► INSERT sync_outbox ('SALE', …)                               │
//! │  commit ◄── all of it, or none of it                                    │
//! │                                                                         │
//! │  A failed gate returns a typed rejection and the transaction rolls     │
//! │  back: re-querying the account or any product afterwards returns the   │
//! │  exact pre-checkout state.                                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The gates are re-evaluated by the database inside the writes. A passing
//! read before checkout means nothing; only the guarded UPDATE decides.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;

use agripos_core::ledger::{due_date, unit_price_cents, SaleTotals};
use agripos_core::validation::{validate_cart_size, validate_discount, validate_quantity};
use agripos_core::{
    Account, CoreError, PaymentMethod, Sale, SaleItem, SaleStatus, TaxRate, ValidationError,
};
use agripos_db::repository::{account, product, sale, sync};
use agripos_db::Database;

use crate::error::{LedgerError, LedgerResult};
use crate::session::Session;

// =============================================================================
// Request / Response Types
// =============================================================================

/// One cart line: a product and how many of it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartLine {
    pub product_id: String,
    pub quantity: i64,
}

/// A checkout request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutRequest {
    /// Customer account; None for walk-in sales. Required for CREDIT.
    pub customer_id: Option<String>,
    pub lines: Vec<CartLine>,
    pub payment_method: PaymentMethod,
    /// Absolute discount off the subtotal, in cents.
    pub discount_cents: i64,
    pub notes: Option<String>,
}

/// The persisted result of a successful checkout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutReceipt {
    pub sale: Sale,
    pub items: Vec<SaleItem>,
}

// =============================================================================
// Checkout Service
// =============================================================================

/// Processes carts into sales.
#[derive(Debug, Clone)]
pub struct CheckoutService {
    db: Database,
    tax_rate: TaxRate,
}

impl CheckoutService {
    /// Creates a checkout service with the store's tax rate.
    pub fn new(db: Database, tax_rate: TaxRate) -> Self {
        CheckoutService { db, tax_rate }
    }

    /// Runs the checkout flow.
    ///
    /// ## Errors
    /// - `Core(Validation)` - empty cart, bad quantity, discount out of
    ///   range, credit sale without an account
    /// - `Core(AccountNotFound)` / `Core(ProductNotFound)`
    /// - `Core(InsufficientCredit)` - the credit gate failed at commit
    /// - `Core(InsufficientStock)` - a stock gate failed
    ///
    /// Any error leaves the database untouched.
    pub async fn checkout(
        &self,
        session: &Session,
        request: CheckoutRequest,
    ) -> LedgerResult<CheckoutReceipt> {
        // Validate shape before opening a transaction.
        if request.lines.is_empty() {
            return Err(ValidationError::Required {
                field: "cart".to_string(),
            }
            .into());
        }
        validate_cart_size(request.lines.len())?;
        for line in &request.lines {
            validate_quantity(line.quantity)?;
        }
        if request.payment_method.is_credit() && request.customer_id.is_none() {
            return Err(ValidationError::Required {
                field: "customer account".to_string(),
            }
            .into());
        }

        let mut tx = self.db.begin().await?;

        // Resolve the buying account, if any.
        let buyer: Option<Account> = match &request.customer_id {
            Some(id) => Some(
                account::get_by_id_tx(&mut *tx, id)
                    .await?
                    .filter(|a| a.is_active)
                    .ok_or_else(|| CoreError::AccountNotFound(id.clone()))?,
            ),
            None => None,
        };
        let buyer_kind = buyer.as_ref().map(|a| a.kind);

        // Resolve products, freeze snapshots, price by tier.
        let sale_id = sale::generate_sale_id();
        let now = Utc::now();
        let mut items = Vec::with_capacity(request.lines.len());
        let mut products = Vec::with_capacity(request.lines.len());
        let mut subtotal_cents: i64 = 0;

        for line in &request.lines {
            let prod = product::get_by_id_tx(&mut *tx, &line.product_id)
                .await?
                .filter(|p| p.is_active)
                .ok_or_else(|| CoreError::ProductNotFound(line.product_id.clone()))?;

            let unit_price = unit_price_cents(&prod, buyer_kind);
            let line_total = unit_price * line.quantity;
            subtotal_cents += line_total;

            items.push(SaleItem {
                id: sale::generate_sale_item_id(),
                sale_id: sale_id.clone(),
                product_id: prod.id.clone(),
                sku_snapshot: prod.sku.clone(),
                name_snapshot: prod.name.clone(),
                unit_price_cents: unit_price,
                quantity: line.quantity,
                line_total_cents: line_total,
                created_at: now,
            });
            products.push(prod);
        }

        validate_discount(request.discount_cents, subtotal_cents)?;

        let totals = SaleTotals::compute(
            subtotal_cents,
            request.discount_cents,
            self.tax_rate,
            request.payment_method,
        );

        let is_credit = request.payment_method.is_credit();
        let sale_due_date = match (&buyer, is_credit) {
            (Some(acc), true) => Some(due_date(now, acc.payment_terms_days)),
            _ => None,
        };

        let sale_row = Sale {
            id: sale_id.clone(),
            receipt_number: sale::generate_receipt_number(),
            customer_id: request.customer_id.clone(),
            staff_id: session.staff_id.clone(),
            status: if is_credit {
                SaleStatus::Pending
            } else {
                SaleStatus::Completed
            },
            subtotal_cents: totals.subtotal_cents,
            tax_cents: totals.tax_cents,
            discount_cents: totals.discount_cents,
            total_cents: totals.total_cents,
            payment_method: request.payment_method,
            paid_cents: totals.paid_cents,
            balance_cents: totals.balance_cents,
            due_date: sale_due_date,
            notes: request.notes.clone(),
            created_at: now,
            updated_at: now,
            sync_version: 0,
        };

        sale::insert_sale_tx(&mut *tx, &sale_row).await?;
        for item in &items {
            sale::insert_item_tx(&mut *tx, item).await?;
        }

        // Account effect. The credit gate lives inside the UPDATE; the
        // snapshot fetched above is only used to describe a failure.
        if let Some(acc) = &buyer {
            if is_credit {
                let applied =
                    account::try_apply_credit_sale(&mut *tx, &acc.id, totals.total_cents).await?;
                if !applied {
                    return Err(CoreError::InsufficientCredit {
                        account_id: acc.id.clone(),
                        limit_cents: acc.credit_limit_cents,
                        balance_cents: acc.credit_balance_cents,
                        requested_cents: totals.total_cents,
                    }
                    .into());
                }
            } else {
                let applied =
                    account::apply_paid_sale(&mut *tx, &acc.id, totals.total_cents).await?;
                if !applied {
                    return Err(LedgerError::consistency(
                        "checkout",
                        &acc.id,
                        totals.total_cents,
                        "account row vanished mid-transaction",
                    ));
                }
            }
        }

        // Inventory effect, one guarded decrement per tracked line.
        for (item, prod) in items.iter().zip(&products) {
            if !prod.track_inventory {
                continue;
            }
            let decremented =
                product::try_decrement_stock(&mut *tx, &item.product_id, item.quantity).await?;
            if !decremented {
                return Err(CoreError::InsufficientStock {
                    sku: prod.sku.clone(),
                    available: prod.current_stock.unwrap_or(0),
                    requested: item.quantity,
                }
                .into());
            }
        }

        let payload = serde_json::to_string(&sale_row)
            .map_err(|e| agripos_db::DbError::Internal(e.to_string()))?;
        sync::queue_for_sync_tx(&mut *tx, "SALE", &sale_id, &payload).await?;

        tx.commit().await?;

        info!(
            sale_id = %sale_id,
            receipt = %sale_row.receipt_number,
            total = %sale_row.total_cents,
            method = ?sale_row.payment_method,
            items = items.len(),
            "Sale committed"
        );

        Ok(CheckoutReceipt {
            sale: sale_row,
            items,
        })
    }
}
