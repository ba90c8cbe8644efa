//! # In-Memory Store
//!
//! A [`CheckoutStore`] backed by process memory.
//!
//! ## Locking Model
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Per-Product Locks                                    │
//! │                                                                         │
//! │  Checkout A: begin([101, 202])      Checkout B: begin([202, 303])       │
//! │       │                                  │                              │
//! │       ├── lock 101 ✓                     │                              │
//! │       ├── lock 202 ✓                     ├── lock 202 ... waits         │
//! │       │                                  │                              │
//! │       ├── read / stage decrements        │                              │
//! │       ├── stage sale                     │                              │
//! │       └── commit → apply, unlock ───────►├── lock 202 ✓                 │
//! │                                          └── lock 303 ✓                 │
//! │                                                                         │
//! │  Locks are always taken in ascending product id order, so two          │
//! │  checkouts can never wait on each other in a cycle.                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Writes are staged inside the transaction and applied on commit. Dropping
//! or rolling back a transaction discards them.
//!
//! A product's lock entry lives only while some transaction holds or waits
//! on it, so the lock table never outgrows the set of in-flight checkouts.

use std::collections::HashMap;
use std::sync::{Arc, Mutex as SyncMutex, PoisonError};

use async_trait::async_trait;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::debug;

use crate::error::{StoreError, StoreResult, ValidationError};
use crate::money::Money;
use crate::store::{CheckoutStore, CheckoutTx, InventoryStore, SaleRecorder};
use crate::types::{ProductId, Sale};
use crate::validation::{validate_price_cents, validate_stock_level};

#[derive(Debug, Clone, Copy)]
struct InventoryRecord {
    price: Money,
    stock: i64,
}

#[derive(Debug, Default)]
struct Shared {
    inventory: Mutex<HashMap<ProductId, InventoryRecord>>,
    sales: Mutex<Vec<Sale>>,
    /// Only touched between awaits, never held across one.
    locks: SyncMutex<HashMap<ProductId, Arc<Mutex<()>>>>,
}

/// In-memory inventory and sale log.
///
/// Cloning is cheap and every clone sees the same data.
///
/// ## Usage
/// ```rust
/// use till_core::{InMemoryStore, Money, ProductId};
///
/// # tokio::runtime::Runtime::new().unwrap().block_on(async {
/// let store = InMemoryStore::new();
/// let id = ProductId::new(202).unwrap();
/// store.seed_product(id, Money::from_cents(2000), 5).await.unwrap();
/// assert_eq!(store.stock(id).await, 5);
/// # });
/// ```
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    shared: Arc<Shared>,
}

impl InMemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a product's price and stock.
    pub async fn seed_product(
        &self,
        product_id: ProductId,
        price: Money,
        stock: i64,
    ) -> Result<(), ValidationError> {
        validate_price_cents(price.cents())?;
        validate_stock_level(stock)?;

        let _locks = ProductLocks::acquire(&self.shared, &[product_id]).await;
        self.shared
            .inventory
            .lock()
            .await
            .insert(product_id, InventoryRecord { price, stock });

        debug!(product_id = %product_id, price = %price, stock, "Seeded product");
        Ok(())
    }

    /// Committed stock for a product (0 if unknown).
    pub async fn stock(&self, product_id: ProductId) -> i64 {
        self.shared
            .inventory
            .lock()
            .await
            .get(&product_id)
            .map_or(0, |r| r.stock)
    }

    /// Price for a product (zero if unknown).
    pub async fn price(&self, product_id: ProductId) -> Money {
        self.shared
            .inventory
            .lock()
            .await
            .get(&product_id)
            .map_or(Money::zero(), |r| r.price)
    }

    /// Snapshot of all committed sales, oldest first.
    pub async fn sales(&self) -> Vec<Sale> {
        self.shared.sales.lock().await.clone()
    }

    /// Number of committed sales.
    pub async fn sale_count(&self) -> usize {
        self.shared.sales.lock().await.len()
    }
}

#[async_trait]
impl CheckoutStore for InMemoryStore {
    async fn begin(&self, products: &[ProductId]) -> StoreResult<Box<dyn CheckoutTx>> {
        let locks = ProductLocks::acquire(&self.shared, products).await;

        debug!(products = locks.ids.len(), "Opened in-memory checkout transaction");

        Ok(Box::new(InMemoryTx {
            shared: Arc::clone(&self.shared),
            locks,
            staged_decrements: HashMap::new(),
            staged_sales: Vec::new(),
        }))
    }
}

// =============================================================================
// Product Locks
// =============================================================================

/// Held per-product locks. Dropping releases them and prunes idle entries
/// from the lock table.
struct ProductLocks {
    shared: Arc<Shared>,
    /// Sorted, deduplicated.
    ids: Vec<ProductId>,
    guards: Vec<OwnedMutexGuard<()>>,
}

impl ProductLocks {
    /// Acquires the locks in ascending id order.
    async fn acquire(shared: &Arc<Shared>, products: &[ProductId]) -> Self {
        let mut ids = products.to_vec();
        ids.sort_unstable();
        ids.dedup();

        let mut held = ProductLocks {
            shared: Arc::clone(shared),
            ids: Vec::with_capacity(ids.len()),
            guards: Vec::with_capacity(ids.len()),
        };
        for id in ids {
            let lock = {
                let mut locks = shared.locks.lock().unwrap_or_else(PoisonError::into_inner);
                Arc::clone(locks.entry(id).or_default())
            };
            held.ids.push(id);
            held.guards.push(lock.lock_owned().await);
        }
        held
    }

    fn contains(&self, product_id: ProductId) -> bool {
        self.ids.binary_search(&product_id).is_ok()
    }
}

impl Drop for ProductLocks {
    fn drop(&mut self) {
        self.guards.clear();

        let mut locks = self
            .shared
            .locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        for id in &self.ids {
            // Count 1 means only the table refers to it: nobody holds or waits.
            if locks.get(id).map_or(false, |lock| Arc::strong_count(lock) == 1) {
                locks.remove(id);
            }
        }
    }
}

// =============================================================================
// Transaction
// =============================================================================

struct InMemoryTx {
    shared: Arc<Shared>,
    locks: ProductLocks,
    staged_decrements: HashMap<ProductId, i64>,
    staged_sales: Vec<Sale>,
}

impl InMemoryTx {
    fn staged(&self, product_id: ProductId) -> i64 {
        self.staged_decrements.get(&product_id).copied().unwrap_or(0)
    }
}

#[async_trait]
impl InventoryStore for InMemoryTx {
    async fn get_stock(&mut self, product_id: ProductId) -> StoreResult<i64> {
        let committed = self
            .shared
            .inventory
            .lock()
            .await
            .get(&product_id)
            .map_or(0, |r| r.stock);
        Ok(committed - self.staged(product_id))
    }

    async fn get_price(&mut self, product_id: ProductId) -> StoreResult<Money> {
        Ok(self
            .shared
            .inventory
            .lock()
            .await
            .get(&product_id)
            .map_or(Money::zero(), |r| r.price))
    }

    async fn decrease_stock(&mut self, product_id: ProductId, quantity: i64) -> StoreResult<()> {
        if !self.locks.contains(product_id) {
            return Err(StoreError::Rejected {
                product_id,
                reason: "product is not locked by this transaction".to_string(),
            });
        }
        if quantity <= 0 {
            return Err(StoreError::Rejected {
                product_id,
                reason: format!("decrement must be positive, got {quantity}"),
            });
        }

        let available = self.get_stock(product_id).await?;
        if quantity > available {
            return Err(StoreError::Rejected {
                product_id,
                reason: format!("stock would go negative ({available} - {quantity})"),
            });
        }

        *self.staged_decrements.entry(product_id).or_insert(0) += quantity;
        Ok(())
    }
}

#[async_trait]
impl SaleRecorder for InMemoryTx {
    async fn save_sale(&mut self, sale: &Sale) -> StoreResult<()> {
        self.staged_sales.push(sale.clone());
        Ok(())
    }
}

#[async_trait]
impl CheckoutTx for InMemoryTx {
    async fn commit(self: Box<Self>) -> StoreResult<()> {
        let mut inventory = self.shared.inventory.lock().await;
        let mut sales = self.shared.sales.lock().await;

        for (product_id, quantity) in &self.staged_decrements {
            if let Some(record) = inventory.get_mut(product_id) {
                record.stock -= quantity;
            }
        }
        sales.extend(self.staged_sales.iter().cloned());

        debug!(
            decrements = self.staged_decrements.len(),
            sales = self.staged_sales.len(),
            "Committed in-memory checkout transaction"
        );
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> StoreResult<()> {
        debug!(
            discarded = self.staged_decrements.len(),
            "Rolled back in-memory checkout transaction"
        );
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
