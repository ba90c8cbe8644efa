//! # till-db: Database Layer for Till
//!
//! SQLite persistence for inventory and sales, plus the SQLite-backed
//! checkout store the engine in `till-core` runs against.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Till Data Flow                                 │
//! │                                                                         │
//! │  CheckoutEngine::checkout(&cart)          (till-core)                  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     till-db (THIS CRATE)                        │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌────────────────┐   ┌──────────────┐  │   │
//! │  │   │   Database    │    │ SqliteCheckout │   │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │ Store          │   │  (embedded)  │  │   │
//! │  │   │               │    │ (checkout.rs)  │   │              │  │   │
//! │  │   │ SqlitePool    │◄───│ ProductRepo    │   │ 001_init.sql │  │   │
//! │  │   │ DbConfig      │    │ SaleRepo       │   │              │  │   │
//! │  │   └───────────────┘    └────────────────┘   └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │           SQLite Database (TILL_DB_PATH, ./till.db)             │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Product and sale repositories
//! - [`checkout`] - Transactional checkout store
//! - [`logging`] - Subscriber setup for the binaries
//!
//! ## Usage
//!
//! ```rust,ignore
//! use till_core::{Cart, CheckoutEngine, Money, ProductId};
//! use till_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::from_env()).await?;
//! db.products().upsert(ProductId::new(101)?, "Cola", Money::from_cents(5000), 10).await?;
//!
//! let engine = CheckoutEngine::new(db.checkout_store());
//! let total = engine.checkout(&cart).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod checkout;
pub mod error;
pub mod logging;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use checkout::SqliteCheckoutStore;
pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::product::ProductRepository;
pub use repository::sale::SaleRepository;
