//! # agripos-ledger: Ledger Services for AgriPOS
//!
//! The service layer that keeps account balances correct across sales,
//! egg collections, and payments.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        AgriPOS Architecture                             │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   Host (UI / CLI / tests)                       │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │  Session + typed requests              │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ agripos-ledger (THIS CRATE) ★                   │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌─────────────┐  ┌──────────┐ │   │
//! │  │   │ checkout  │  │ payments  │  │ collections │  │statement │ │   │
//! │  │   │ cart→sale │  │ apply +   │  │ value + egg │  │ + credit │ │   │
//! │  │   │ + gates   │  │ settle    │  │ stock       │  │  status  │ │   │
//! │  │   └───────────┘  └───────────┘  └─────────────┘  └──────────┘ │   │
//! │  │                                                                 │   │
//! │  │   EVERY MULTI-ENTITY MUTATION IS ONE DATABASE TRANSACTION      │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │       agripos-core (rules)  +  agripos-db (SQLite)                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//!
//! 1. **All-or-nothing**: a failed step rolls back every prior step; no
//!    compensation paths, no partial writes
//! 2. **Gates live in the database**: credit and stock checks are part of
//!    the UPDATE statements themselves, immune to check-then-act races
//! 3. **Explicit sessions**: staff identity is a parameter, not a global
//! 4. **Typed requests**: one request/response contract per operation
//!
//! ## Example
//!
//! ```rust,ignore
//! use agripos_core::{PaymentMethod, TaxRate};
//! use agripos_db::{Database, DbConfig};
//! use agripos_ledger::{CartLine, CheckoutRequest, Ledger, Session};
//!
//! let db = Database::new(DbConfig::new("./agripos.db")).await?;
//! let ledger = Ledger::new(db, TaxRate::from_bps(800));
//!
//! let session = Session::login(ledger.db(), "maria", "4821").await?;
//! let receipt = ledger.checkout().checkout(&session, CheckoutRequest {
//!     customer_id: Some(farmer_id),
//!     lines: vec![CartLine { product_id, quantity: 2 }],
//!     payment_method: PaymentMethod::Credit,
//!     discount_cents: 0,
//!     notes: None,
//! }).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod checkout;
pub mod collections;
pub mod error;
pub mod payments;
pub mod session;
pub mod statement;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use checkout::{CartLine, CheckoutReceipt, CheckoutRequest, CheckoutService};
pub use collections::{CollectionRequest, CollectionService};
pub use error::{LedgerError, LedgerResult};
pub use payments::{PaymentRequest, PaymentService};
pub use session::Session;
pub use statement::{AccountStatement, StatementService};

use agripos_core::TaxRate;
use agripos_db::Database;

// =============================================================================
// Ledger Facade
// =============================================================================

/// Bundles the ledger services over one database handle.
#[derive(Debug, Clone)]
pub struct Ledger {
    db: Database,
    tax_rate: TaxRate,
    egg_product_id: Option<String>,
}

impl Ledger {
    /// Creates a ledger over a database with the store's tax rate.
    pub fn new(db: Database, tax_rate: TaxRate) -> Self {
        Ledger {
            db,
            tax_rate,
            egg_product_id: None,
        }
    }

    /// Links the finished-egg product that collections flow into.
    pub fn with_egg_product(mut self, product_id: impl Into<String>) -> Self {
        self.egg_product_id = Some(product_id.into());
        self
    }

    /// The underlying database handle.
    pub fn db(&self) -> &Database {
        &self.db
    }

    /// The checkout service.
    pub fn checkout(&self) -> CheckoutService {
        CheckoutService::new(self.db.clone(), self.tax_rate)
    }

    /// The payment service.
    pub fn payments(&self) -> PaymentService {
        PaymentService::new(self.db.clone())
    }

    /// The egg collection service.
    pub fn collections(&self) -> CollectionService {
        let service = CollectionService::new(self.db.clone());
        match &self.egg_product_id {
            Some(id) => service.with_egg_product(id.clone()),
            None => service,
        }
    }

    /// The statement service.
    pub fn statements(&self) -> StatementService {
        StatementService::new(self.db.clone())
    }
}
