//! # till-core: Pure Business Logic for Till
//!
//! This crate holds the checkout transaction engine and the domain types it
//! works with. It performs no I/O: persistence is reached only through the
//! store traits in [`store`].
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Till Architecture                              │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 Caller (register, CLI, service)                 │   │
//! │  │                 builds a Cart, calls checkout()                 │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ till-core (THIS CRATE) ★                        │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │   cart    │  │ checkout  │  │   │
//! │  │   │ ProductId │  │   Money   │  │   Cart    │  │  Engine   │  │   │
//! │  │   │   Sale    │  │           │  │           │  │           │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └─────┬─────┘  │   │
//! │  │                                                      │        │   │
//! │  │                        store traits ◄────────────────┘        │   │
//! │  │              (InventoryStore, SaleRecorder, CheckoutTx)        │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │   InMemoryStore (memory.rs)   │   till-db (SQLite, sqlx)        │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (ProductId, Product, Sale, SaleLine)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`cart`] - The caller-supplied product → quantity mapping
//! - [`error`] - Domain error types
//! - [`validation`] - Field-level input checks
//! - [`store`] - Collaborator traits the engine depends on
//! - [`checkout`] - The two-phase checkout engine
//! - [`memory`] - Lock-based in-memory store
//!
//! ## Example Usage
//!
//! ```rust
//! use till_core::{Cart, CheckoutEngine, InMemoryStore, Money, ProductId};
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let store = InMemoryStore::new();
//! let coke = ProductId::new(101).unwrap();
//! store.seed_product(coke, Money::from_major_minor(50, 0), 10).await.unwrap();
//!
//! let engine = CheckoutEngine::new(store.clone());
//! let mut cart = Cart::new();
//! cart.set(coke, 2);
//!
//! let total = engine.checkout(&cart).await.unwrap();
//! assert_eq!(total, Money::from_major_minor(100, 0));
//! assert_eq!(store.stock(coke).await, 8);
//! # });
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod checkout;
pub mod error;
pub mod memory;
pub mod money;
pub mod store;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use cart::Cart;
pub use checkout::CheckoutEngine;
pub use error::{
    CheckoutError, CheckoutErrorKind, CheckoutResult, StoreError, StoreResult, ValidationError,
};
pub use memory::InMemoryStore;
pub use money::Money;
pub use store::{CheckoutStore, CheckoutTx, InventoryStore, SaleRecorder};
pub use types::*;
