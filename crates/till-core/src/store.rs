//! # Store Traits
//!
//! The seams between the checkout engine and persistence.
//!
//! ## Collaborators
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  CheckoutEngine                                                         │
//! │       │ begin(&[101, 202])                                              │
//! │       ▼                                                                 │
//! │  CheckoutStore ──────────► Box<dyn CheckoutTx>                          │
//! │                              │                                          │
//! │                              ├── InventoryStore                         │
//! │                              │     get_stock / get_price                │
//! │                              │     decrease_stock                       │
//! │                              │                                          │
//! │                              ├── SaleRecorder                           │
//! │                              │     save_sale                            │
//! │                              │                                          │
//! │                              └── commit / rollback                      │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Guarantees Implementations Must Give
//! 1. Two open transactions never cover the same product id. `begin` waits
//!    until the overlapping one is committed or rolled back.
//! 2. Writes made through a transaction are invisible to everyone else until
//!    `commit` returns `Ok`, and are discarded by `rollback` or by dropping
//!    the transaction.
//! 3. Unknown (or inactive) products read as stock 0 and price 0.

use async_trait::async_trait;

use crate::error::StoreResult;
use crate::money::Money;
use crate::types::{ProductId, Sale};

/// Stock and price lookups plus stock mutation.
#[async_trait]
pub trait InventoryStore: Send {
    /// Current available quantity. Unknown id yields 0.
    async fn get_stock(&mut self, product_id: ProductId) -> StoreResult<i64>;

    /// Unit price. Unknown id yields zero.
    async fn get_price(&mut self, product_id: ProductId) -> StoreResult<Money>;

    /// Reduces recorded stock by `quantity`.
    ///
    /// Implementations reject a decrement that would take stock below zero.
    async fn decrease_stock(&mut self, product_id: ProductId, quantity: i64) -> StoreResult<()>;
}

/// Durable persistence of completed sales.
#[async_trait]
pub trait SaleRecorder: Send {
    async fn save_sale(&mut self, sale: &Sale) -> StoreResult<()>;
}

/// One checkout's transactional scope over inventory and sales.
#[async_trait]
pub trait CheckoutTx: InventoryStore + SaleRecorder {
    /// Makes every staged write visible, atomically.
    async fn commit(self: Box<Self>) -> StoreResult<()>;

    /// Discards every staged write.
    async fn rollback(self: Box<Self>) -> StoreResult<()>;
}

/// Opens checkout transactions.
#[async_trait]
pub trait CheckoutStore: Send + Sync {
    /// Opens a transaction with exclusive access to `products`.
    async fn begin(&self, products: &[ProductId]) -> StoreResult<Box<dyn CheckoutTx>>;
}

#[async_trait]
impl<S: CheckoutStore + ?Sized> CheckoutStore for std::sync::Arc<S> {
    async fn begin(&self, products: &[ProductId]) -> StoreResult<Box<dyn CheckoutTx>> {
        (**self).begin(products).await
    }
}
