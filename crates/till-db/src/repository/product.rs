//! # Product Repository
//!
//! Database operations for products outside of a checkout.
//!
//! ## Key Operations
//! - Seeding (`upsert`)
//! - Lookups
//! - Restocking / manual stock corrections
//!
//! ## Stock Updates
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                    Stock Update Strategy                            │
//! │                                                                     │
//! │  ❌ WRONG: Absolute update (loses concurrent sales)                │
//! │     UPDATE products SET current_stock = 7 WHERE id = ?             │
//! │                                                                     │
//! │  ✅ CORRECT: Delta update                                          │
//! │     UPDATE products SET current_stock = current_stock + 5          │
//! │                                                                     │
//! │  A restock that races a checkout adds on top of whatever the       │
//! │  checkout left behind. CHECK (current_stock >= 0) rejects any      │
//! │  correction that would go negative.                                │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use till_core::validation::{validate_price_cents, validate_product_name, validate_stock_level};
use till_core::{Money, Product, ProductId};

const PRODUCT_COLUMNS: &str =
    "id, name, price_cents, current_stock, is_active, created_at, updated_at";

/// Repository for product database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = db.products();
///
/// repo.upsert(ProductId::new(101)?, "Cola 330ml", Money::from_cents(5000), 10).await?;
/// let product = repo.get_by_id(ProductId::new(101)?).await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Inserts a product or replaces its name, price and stock.
    ///
    /// Re-seeding a deactivated product reactivates it.
    pub async fn upsert(
        &self,
        id: ProductId,
        name: &str,
        price: Money,
        stock: i64,
    ) -> DbResult<Product> {
        validate_product_name(name)?;
        validate_price_cents(price.cents())?;
        validate_stock_level(stock)?;

        debug!(id = %id, price = %price, stock, "Upserting product");

        let now = Utc::now();

        sqlx::query(
            r#"
            INSERT INTO products (
                id, name, price_cents, current_stock,
                is_active, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, 1, ?5, ?5)
            ON CONFLICT (id) DO UPDATE SET
                name = excluded.name,
                price_cents = excluded.price_cents,
                current_stock = excluded.current_stock,
                is_active = 1,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(id)
        .bind(name.trim())
        .bind(price.cents())
        .bind(stock)
        .bind(now)
        .execute(&self.pool)
        .await?;

        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Product", id))
    }

    /// Gets a product by its ID, active or not.
    pub async fn get_by_id(&self, id: ProductId) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Units available for sale: 0 for unknown or inactive products.
    pub async fn stock(&self, id: ProductId) -> DbResult<i64> {
        let stock: Option<i64> = sqlx::query_scalar(
            "SELECT current_stock FROM products WHERE id = ?1 AND is_active = 1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(stock.unwrap_or(0))
    }

    /// Adds `delta` units (negative for corrections) and returns the new level.
    ///
    /// ## Returns
    /// * `Err(DbError::NotFound)` - Product doesn't exist
    /// * `Err(DbError::ConstraintViolation)` - Stock would go below zero
    pub async fn adjust_stock(&self, id: ProductId, delta: i64) -> DbResult<i64> {
        debug!(id = %id, delta, "Adjusting stock");

        let new_stock: Option<i64> = sqlx::query_scalar(
            r#"
            UPDATE products
            SET
                current_stock = current_stock + ?2,
                updated_at = ?3
            WHERE id = ?1
            RETURNING current_stock
            "#,
        )
        .bind(id)
        .bind(delta)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        new_stock.ok_or_else(|| DbError::not_found("Product", id))
    }

    /// Soft-deletes a product by setting is_active = false.
    ///
    /// Recorded sales keep referencing it; checkouts see it as out of stock.
    pub async fn deactivate(&self, id: ProductId) -> DbResult<()> {
        debug!(id = %id, "Deactivating product");

        let result = sqlx::query(
            r#"
            UPDATE products
            SET
                is_active = 0,
                updated_at = ?2
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }

    /// Lists active products in ascending id order.
    pub async fn list_active(&self, limit: u32) -> DbResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE is_active = 1 ORDER BY id LIMIT ?1"
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    /// Counts active products.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE is_active = 1")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
