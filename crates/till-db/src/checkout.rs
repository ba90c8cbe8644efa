//! # SQLite Checkout Store
//!
//! [`CheckoutStore`] implementation backed by a SQLite transaction.
//!
//! ## One Checkout, One Transaction
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  begin()          BEGIN IMMEDIATE   ← takes the write lock up front     │
//! │     │                                 (others wait up to busy_timeout)  │
//! │     ▼                                                                   │
//! │  get_stock()      SELECT current_stock ... AND is_active = 1            │
//! │  get_price()      SELECT price_cents   ... AND is_active = 1            │
//! │     │                                                                   │
//! │     ▼                                                                   │
//! │  decrease_stock() UPDATE ... SET current_stock = current_stock - ?      │
//! │                   WHERE id = ? AND current_stock >= ?                   │
//! │     │                                                                   │
//! │     ▼                                                                   │
//! │  save_sale()      INSERT sales, INSERT sale_items                       │
//! │     │                                                                   │
//! │     ▼                                                                   │
//! │  commit()         COMMIT            ← all of it, or (on drop) none      │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A deferred `BEGIN` would let two checkouts read the same stock before
//! either writes. `BEGIN IMMEDIATE` makes the read-validate-decrement
//! sequence serial across connections.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Sqlite, SqlitePool, Transaction};
use tracing::debug;

use crate::error::DbError;
use crate::repository::sale::insert_sale;
use till_core::{
    CheckoutStore, CheckoutTx, InventoryStore, Money, ProductId, Sale, SaleRecorder, StoreError,
    StoreResult,
};

/// Opens one `BEGIN IMMEDIATE` transaction per checkout.
///
/// ## Usage
/// ```rust,ignore
/// let engine = CheckoutEngine::new(db.checkout_store());
/// ```
#[derive(Debug, Clone)]
pub struct SqliteCheckoutStore {
    pool: SqlitePool,
}

impl SqliteCheckoutStore {
    /// Creates a store over `pool`.
    pub fn new(pool: SqlitePool) -> Self {
        SqliteCheckoutStore { pool }
    }
}

#[async_trait]
impl CheckoutStore for SqliteCheckoutStore {
    async fn begin(&self, products: &[ProductId]) -> StoreResult<Box<dyn CheckoutTx>> {
        // The database-wide write lock covers every product in `products`.
        let tx = self
            .pool
            .begin_with("BEGIN IMMEDIATE")
            .await
            .map_err(DbError::from)?;

        debug!(products = products.len(), "Opened SQLite checkout transaction");

        Ok(Box::new(SqliteCheckoutTx { tx }))
    }
}

struct SqliteCheckoutTx {
    tx: Transaction<'static, Sqlite>,
}

#[async_trait]
impl InventoryStore for SqliteCheckoutTx {
    async fn get_stock(&mut self, product_id: ProductId) -> StoreResult<i64> {
        let stock: Option<i64> = sqlx::query_scalar(
            "SELECT current_stock FROM products WHERE id = ?1 AND is_active = 1",
        )
        .bind(product_id)
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(DbError::from)?;

        Ok(stock.unwrap_or(0))
    }

    async fn get_price(&mut self, product_id: ProductId) -> StoreResult<Money> {
        let cents: Option<i64> = sqlx::query_scalar(
            "SELECT price_cents FROM products WHERE id = ?1 AND is_active = 1",
        )
        .bind(product_id)
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(DbError::from)?;

        Ok(Money::from_cents(cents.unwrap_or(0)))
    }

    async fn decrease_stock(&mut self, product_id: ProductId, quantity: i64) -> StoreResult<()> {
        if quantity <= 0 {
            return Err(StoreError::Rejected {
                product_id,
                reason: format!("decrement must be positive, got {quantity}"),
            });
        }

        let result = sqlx::query(
            r#"
            UPDATE products
            SET
                current_stock = current_stock - ?2,
                updated_at = ?3
            WHERE id = ?1
              AND is_active = 1
              AND current_stock >= ?2
            "#,
        )
        .bind(product_id)
        .bind(quantity)
        .bind(Utc::now())
        .execute(&mut *self.tx)
        .await
        .map_err(DbError::from)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::Rejected {
                product_id,
                reason: format!("not enough stock to remove {quantity}"),
            });
        }

        Ok(())
    }
}

#[async_trait]
impl SaleRecorder for SqliteCheckoutTx {
    async fn save_sale(&mut self, sale: &Sale) -> StoreResult<()> {
        insert_sale(&mut self.tx, sale).await?;
        Ok(())
    }
}

#[async_trait]
impl CheckoutTx for SqliteCheckoutTx {
    async fn commit(self: Box<Self>) -> StoreResult<()> {
        let SqliteCheckoutTx { tx } = *self;
        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        debug!("Committed SQLite checkout transaction");
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> StoreResult<()> {
        let SqliteCheckoutTx { tx } = *self;
        tx.rollback()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        debug!("Rolled back SQLite checkout transaction");
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use till_core::{Cart, CheckoutEngine, CheckoutError, CheckoutErrorKind};

    use super::*;
    use crate::pool::{Database, DbConfig};

    fn pid(raw: i64) -> ProductId {
        ProductId::new(raw).unwrap()
    }

    fn cart(entries: &[(i64, i64)]) -> Cart {
        entries.iter().map(|&(id, qty)| (pid(id), qty)).collect()
    }

    async fn seed(db: &Database, products: &[(i64, i64, i64)]) {
        for &(id, price_cents, stock) in products {
            db.products()
                .upsert(pid(id), &format!("Product {id}"), Money::from_cents(price_cents), stock)
                .await
                .unwrap();
        }
    }

    async fn memory_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    // -------------------------------------------------------------------------
    // Store contract
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_reads_inside_transaction() {
        let db = memory_db().await;
        seed(&db, &[(101, 5000, 10)]).await;
        db.products().upsert(pid(303), "Old stock", Money::from_cents(10), 9).await.unwrap();
        db.products().deactivate(pid(303)).await.unwrap();

        let store = db.checkout_store();
        let mut tx = store.begin(&[pid(101), pid(303), pid(999)]).await.unwrap();

        assert_eq!(tx.get_stock(pid(101)).await.unwrap(), 10);
        assert_eq!(tx.get_price(pid(101)).await.unwrap(), Money::from_cents(5000));
        assert_eq!(tx.get_stock(pid(999)).await.unwrap(), 0);
        assert_eq!(tx.get_price(pid(999)).await.unwrap(), Money::zero());
        assert_eq!(tx.get_stock(pid(303)).await.unwrap(), 0);

        tx.rollback().await.unwrap();
    }

    #[tokio::test]
    async fn test_guarded_decrement() {
        let db = memory_db().await;
        seed(&db, &[(101, 5000, 2)]).await;

        let store = db.checkout_store();
        let mut tx = store.begin(&[pid(101)]).await.unwrap();

        let err = tx.decrease_stock(pid(101), 3).await.unwrap_err();
        assert!(matches!(err, StoreError::Rejected { .. }));
        let err = tx.decrease_stock(pid(101), 0).await.unwrap_err();
        assert!(matches!(err, StoreError::Rejected { .. }));

        tx.decrease_stock(pid(101), 2).await.unwrap();
        assert_eq!(tx.get_stock(pid(101)).await.unwrap(), 0);
        tx.rollback().await.unwrap();

        assert_eq!(db.products().stock(pid(101)).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_dropped_transaction_discards_writes() {
        let db = memory_db().await;
        seed(&db, &[(101, 5000, 10)]).await;

        {
            let store = db.checkout_store();
            let mut tx = store.begin(&[pid(101)]).await.unwrap();
            tx.decrease_stock(pid(101), 4).await.unwrap();
        }

        assert_eq!(db.products().stock(pid(101)).await.unwrap(), 10);
    }

    // -------------------------------------------------------------------------
    // Through the engine
    // -------------------------------------------------------------------------

    #[tokio::test]
    async fn test_checkout_two_products() {
        let db = memory_db().await;
        seed(&db, &[(101, 5000, 10), (202, 2000, 5)]).await;
        let engine = CheckoutEngine::new(db.checkout_store());

        let sale = engine
            .checkout_sale(&cart(&[(101, 2), (202, 1)]))
            .await
            .unwrap();

        assert_eq!(sale.total(), Money::from_major_minor(120, 0));
        assert_eq!(db.products().stock(pid(101)).await.unwrap(), 8);
        assert_eq!(db.products().stock(pid(202)).await.unwrap(), 4);
        assert_eq!(db.sales().count().await.unwrap(), 1);

        let stored = db.sales().get_by_id(&sale.id).await.unwrap().unwrap();
        assert_eq!(stored.total_cents, 12000);
        assert_eq!(stored.lines, sale.lines);
    }

    #[tokio::test]
    async fn test_insufficient_stock_changes_nothing() {
        let db = memory_db().await;
        seed(&db, &[(101, 5000, 1)]).await;
        let engine = CheckoutEngine::new(db.checkout_store());

        let err = engine.checkout(&cart(&[(101, 2)])).await.unwrap_err();

        assert_eq!(
            err,
            CheckoutError::InsufficientStock {
                product_id: pid(101),
                available: 1,
                requested: 2,
            }
        );
        assert_eq!(db.products().stock(pid(101)).await.unwrap(), 1);
        assert_eq!(db.sales().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_unknown_product_is_out_of_stock() {
        let db = memory_db().await;
        seed(&db, &[(101, 5000, 10)]).await;
        let engine = CheckoutEngine::new(db.checkout_store());

        let err = engine
            .checkout(&cart(&[(101, 1), (999, 1)]))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), CheckoutErrorKind::StockConflict);
        assert_eq!(err.product_id(), Some(pid(999)));
        assert_eq!(db.products().stock(pid(101)).await.unwrap(), 10);
    }

    #[tokio::test]
    async fn test_empty_cart_records_zero_sale() {
        let db = memory_db().await;
        seed(&db, &[(101, 5000, 10)]).await;
        let engine = CheckoutEngine::new(db.checkout_store());

        let sale = engine.checkout_sale(&Cart::new()).await.unwrap();

        assert_eq!(sale.total(), Money::zero());
        assert_eq!(db.products().stock(pid(101)).await.unwrap(), 10);
        assert_eq!(db.sales().count().await.unwrap(), 1);

        let stored = db.sales().get_by_id(&sale.id).await.unwrap().unwrap();
        assert!(stored.lines.is_empty());
        assert_eq!(stored.total_cents, 0);
    }

    #[tokio::test]
    async fn test_unit_count_overflow_changes_nothing() {
        let db = memory_db().await;
        seed(&db, &[(1, 0, i64::MAX), (2, 0, i64::MAX)]).await;
        let engine = CheckoutEngine::new(db.checkout_store());

        let err = engine
            .checkout(&cart(&[(1, i64::MAX), (2, 1)]))
            .await
            .unwrap_err();

        assert_eq!(err, CheckoutError::QuantityOverflow { product_id: pid(2) });
        assert_eq!(db.products().stock(pid(1)).await.unwrap(), i64::MAX);
        assert_eq!(db.products().stock(pid(2)).await.unwrap(), i64::MAX);
        assert_eq!(db.sales().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_closed_pool_is_store_failure() {
        let db = memory_db().await;
        seed(&db, &[(101, 5000, 10)]).await;
        let engine = CheckoutEngine::new(db.checkout_store());
        db.close().await;

        let err = engine.checkout(&cart(&[(101, 1)])).await.unwrap_err();

        assert!(matches!(err, CheckoutError::Store(StoreError::Unavailable(_))));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_checkouts_cannot_oversell() {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::new(
            DbConfig::new(dir.path().join("till.db"))
                .max_connections(4)
                .busy_timeout(Duration::from_secs(10)),
        )
        .await
        .unwrap();
        seed(&db, &[(101, 5000, 10)]).await;

        let engine = Arc::new(CheckoutEngine::new(db.checkout_store()));
        let handles: Vec<_> = (0..2)
            .map(|_| {
                let engine = Arc::clone(&engine);
                tokio::spawn(async move { engine.checkout(&cart(&[(101, 6)])).await })
            })
            .collect();

        let mut outcomes = Vec::new();
        for handle in handles {
            outcomes.push(handle.await.unwrap());
        }

        let successes = outcomes.iter().filter(|r| r.is_ok()).count();
        assert_eq!(successes, 1);
        assert!(outcomes.iter().any(|r| matches!(
            r,
            Err(CheckoutError::InsufficientStock { available: 4, requested: 6, .. })
        )));
        assert_eq!(db.products().stock(pid(101)).await.unwrap(), 4);
        assert_eq!(db.sales().count().await.unwrap(), 1);

        db.close().await;
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_many_checkouts_sell_exactly_stock() {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::new(
            DbConfig::new(dir.path().join("till.db"))
                .max_connections(4)
                .busy_timeout(Duration::from_secs(10)),
        )
        .await
        .unwrap();
        seed(&db, &[(101, 100, 10), (202, 250, 10)]).await;

        let engine = Arc::new(CheckoutEngine::new(db.checkout_store()));
        let handles: Vec<_> = (0..16)
            .map(|_| {
                let engine = Arc::clone(&engine);
                tokio::spawn(async move { engine.checkout(&cart(&[(101, 1), (202, 1)])).await })
            })
            .collect();

        let mut successes = 0;
        for handle in handles {
            if handle.await.unwrap().is_ok() {
                successes += 1;
            }
        }

        assert_eq!(successes, 10);
        assert_eq!(db.products().stock(pid(101)).await.unwrap(), 0);
        assert_eq!(db.products().stock(pid(202)).await.unwrap(), 0);
        assert_eq!(db.sales().count().await.unwrap(), 10);
        assert_eq!(
            db.sales().total_revenue().await.unwrap(),
            Money::from_cents(3500)
        );

        db.close().await;
    }
}
