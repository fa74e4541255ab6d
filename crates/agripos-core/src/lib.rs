//! # agripos-core: Pure Business Logic for AgriPOS
//!
//! This crate is the **heart** of the AgriPOS ledger. It contains all
//! business rules as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        AgriPOS Architecture                             │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Host UI (out of scope)                       │   │
//! │  │    POS screen ──► Credit accounts ──► Egg collection ──► ...   │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    agripos-ledger                               │   │
//! │  │    checkout, payments, collections, statements (transactional) │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ agripos-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │  ledger   │  │ validation│  │   │
//! │  │   │  Account  │  │   Money   │  │  credit   │  │   rules   │  │   │
//! │  │   │   Sale    │  │  TaxCalc  │  │  egg math │  │  checks   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    agripos-db (Database Layer)                  │   │
//! │  │              SQLite queries, migrations, repositories           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Account, Sale, EggCollection, PaymentRecord)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`ledger`] - Credit gate, sale totals, egg valuation, credit aging
//! - [`error`] - Domain error types
//! - [`validation`] - Business rule validation
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every function is deterministic - same input = same output
//! 2. **No I/O**: Database, network, file system access is FORBIDDEN here
//! 3. **Integer Money**: All monetary values are in cents (i64) to avoid float errors
//! 4. **Explicit Errors**: All errors are typed, never strings or panics
//!
//! ## Example Usage
//!
//! ```rust
//! use agripos_core::ledger::{collection_value, EggGrading};
//! use agripos_core::money::Money;
//!
//! let hen = EggGrading { small: 24, medium: 48, large: 36, xl: 12, damaged: 3 };
//! let duck = EggGrading { small: 12, medium: 18, large: 6, xl: 0, damaged: 0 };
//!
//! // Damaged eggs never count toward the payable value
//! let owed = collection_value(&hen, Money::from_cents(250), &duck, Money::from_cents(400));
//! assert_eq!(owed.cents(), 3_700);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod ledger;
pub mod money;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use agripos_core::Money` instead of
// `use agripos_core::money::Money`

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Eggs per dozen: the unit every farm-gate price is quoted against.
pub const EGGS_PER_DOZEN: i64 = 12;

/// Maximum items allowed in a single cart
///
/// Prevents runaway carts and ensures reasonable transaction sizes.
pub const MAX_CART_ITEMS: usize = 100;

/// Maximum quantity of a single item in cart
///
/// Prevents accidental over-ordering (e.g., typing 1000 instead of 10)
pub const MAX_ITEM_QUANTITY: i64 = 999;

/// Default payment terms for new credit accounts, in days.
pub const DEFAULT_PAYMENT_TERMS_DAYS: i64 = 30;
