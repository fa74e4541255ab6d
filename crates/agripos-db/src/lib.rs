//! # agripos-db: Database Layer for AgriPOS
//!
//! This crate provides database access for the AgriPOS ledger.
//! It uses SQLite for local storage with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        AgriPOS Data Flow                                │
//! │                                                                         │
//! │  Ledger operation (checkout, record_payment, record_collection)       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     agripos-db (THIS CRATE)                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │ (account.rs,  │    │  (embedded)  │  │   │
//! │  │   │               │    │  sale.rs, …)  │    │              │  │   │
//! │  │   │ SqlitePool    │◄───│ guarded       │    │ 001_init.sql │  │   │
//! │  │   │ Transactions  │    │ conditional   │    │              │  │   │
//! │  │   │               │    │ updates       │    │              │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │                     SQLite Database (WAL mode)                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations (account, sale, etc.)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use agripos_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("path/to/agripos.db")).await?;
//!
//! // Point reads through repositories
//! let account = db.accounts().get_by_id("uuid").await?;
//!
//! // Multi-entity mutations compose statement helpers in one transaction
//! let mut tx = db.begin().await?;
//! let ok = agripos_db::repository::account::try_apply_customer_payment(
//!     &mut *tx, "uuid", 17_280,
//! ).await?;
//! tx.commit().await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::account::AccountRepository;
pub use repository::collection::EggCollectionRepository;
pub use repository::payment::PaymentRecordRepository;
pub use repository::product::ProductRepository;
pub use repository::sale::SaleRepository;
pub use repository::staff::StaffRepository;
pub use repository::sync::SyncOutboxRepository;
