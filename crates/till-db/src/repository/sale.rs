//! # Sale Repository
//!
//! Persistence and lookup of recorded sales.
//!
//! ## Sale Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Sale Lifecycle                                    │
//! │                                                                         │
//! │  1. CHECKOUT                                                           │
//! │     └── SqliteCheckoutStore::save_sale → insert_sale() on the open     │
//! │         checkout transaction (sales + sale_items)                      │
//! │                                                                         │
//! │  2. COMMIT                                                             │
//! │     └── header, lines and stock decrements become visible together     │
//! │                                                                         │
//! │  3. READ                                                               │
//! │     └── SaleRepository::get_by_id / list_recent / total_revenue        │
//! │                                                                         │
//! │  Sales are never updated or deleted.                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use sqlx::{FromRow, SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use till_core::{Money, Sale, SaleLine, ValidationError};

/// Header row from `sales`, before its lines are attached.
#[derive(Debug, FromRow)]
struct SaleRow {
    id: String,
    total_cents: i64,
    created_at: DateTime<Utc>,
}

/// Writes a sale header and its lines on `conn`.
///
/// Callers pass a connection inside an open transaction; nothing here
/// commits.
pub(crate) async fn insert_sale(conn: &mut SqliteConnection, sale: &Sale) -> DbResult<()> {
    debug!(id = %sale.id, lines = sale.lines.len(), "Inserting sale");

    let item_count = sale.total_quantity().ok_or_else(|| {
        DbError::InvalidInput(ValidationError::OutOfRange {
            field: "item_count".to_string(),
            min: 0,
            max: i64::MAX,
        })
    })?;

    sqlx::query(
        r#"
        INSERT INTO sales (id, total_cents, item_count, created_at)
        VALUES (?1, ?2, ?3, ?4)
        "#,
    )
    .bind(&sale.id)
    .bind(sale.total_cents)
    .bind(item_count)
    .bind(sale.created_at)
    .execute(&mut *conn)
    .await?;

    // Snapshot pattern: unit price is copied so later price changes never
    // rewrite history.
    for line in &sale.lines {
        sqlx::query(
            r#"
            INSERT INTO sale_items (
                sale_id, product_id, quantity,
                unit_price_cents, line_total_cents
            ) VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(&sale.id)
        .bind(line.product_id)
        .bind(line.quantity)
        .bind(line.unit_price_cents)
        .bind(line.line_total_cents)
        .execute(&mut *conn)
        .await?;
    }

    Ok(())
}

/// Repository for sale database operations.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
}

impl SaleRepository {
    /// Creates a new SaleRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository { pool }
    }

    /// Gets a sale with its lines.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Sale>> {
        let row = sqlx::query_as::<_, SaleRow>(
            "SELECT id, total_cents, created_at FROM sales WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(Some(self.attach_lines(row).await?)),
            None => Ok(None),
        }
    }

    /// Most recent sales first.
    pub async fn list_recent(&self, limit: u32) -> DbResult<Vec<Sale>> {
        let rows = sqlx::query_as::<_, SaleRow>(
            r#"
            SELECT id, total_cents, created_at
            FROM sales
            ORDER BY created_at DESC, rowid DESC
            LIMIT ?1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        let mut sales = Vec::with_capacity(rows.len());
        for row in rows {
            sales.push(self.attach_lines(row).await?);
        }

        Ok(sales)
    }

    /// Number of recorded sales.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sales")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    /// Sum of every recorded sale's total.
    pub async fn total_revenue(&self) -> DbResult<Money> {
        let cents: i64 = sqlx::query_scalar("SELECT COALESCE(SUM(total_cents), 0) FROM sales")
            .fetch_one(&self.pool)
            .await?;

        Ok(Money::from_cents(cents))
    }

    async fn attach_lines(&self, row: SaleRow) -> DbResult<Sale> {
        let lines = sqlx::query_as::<_, SaleLine>(
            r#"
            SELECT product_id, quantity, unit_price_cents, line_total_cents
            FROM sale_items
            WHERE sale_id = ?1
            ORDER BY product_id
            "#,
        )
        .bind(&row.id)
        .fetch_all(&self.pool)
        .await?;

        Ok(Sale {
            id: row.id,
            total_cents: row.total_cents,
            lines,
            created_at: row.created_at,
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use till_core::ProductId;

    fn pid(raw: i64) -> ProductId {
        ProductId::new(raw).unwrap()
    }

    fn sale(id: &str, lines: &[(i64, i64, i64)]) -> Sale {
        let lines: Vec<SaleLine> = lines
            .iter()
            .map(|&(product, quantity, unit_price_cents)| SaleLine {
                product_id: pid(product),
                quantity,
                unit_price_cents,
                line_total_cents: unit_price_cents * quantity,
            })
            .collect();
        Sale {
            id: id.to_string(),
            total_cents: lines.iter().map(|l| l.line_total_cents).sum(),
            lines,
            created_at: Utc::now(),
        }
    }

    async fn setup() -> Database {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.products()
            .upsert(pid(101), "Cola", Money::from_cents(5000), 10)
            .await
            .unwrap();
        db.products()
            .upsert(pid(202), "Chips", Money::from_cents(2000), 5)
            .await
            .unwrap();
        db
    }

    async fn record(db: &Database, sale: &Sale) -> DbResult<()> {
        let mut tx = db.pool().begin().await?;
        insert_sale(&mut tx, sale).await?;
        tx.commit().await?;
        Ok(())
    }

    #[tokio::test]
    async fn test_insert_and_read_back() {
        let db = setup().await;
        let recorded = sale("sale-a", &[(202, 1, 2000), (101, 2, 5000)]);

        record(&db, &recorded).await.unwrap();

        let loaded = db.sales().get_by_id("sale-a").await.unwrap().unwrap();
        assert_eq!(loaded.total_cents, 12000);
        assert_eq!(loaded.total_quantity(), Some(3));
        assert_eq!(loaded.lines.len(), 2);
        assert_eq!(loaded.lines[0].product_id, pid(101));
        assert_eq!(loaded.lines[0].line_total_cents, 10000);
        assert_eq!(loaded.lines[1].unit_price(), Money::from_cents(2000));

        assert!(db.sales().get_by_id("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_line_for_unknown_product_rejected_whole() {
        let db = setup().await;
        let bad = sale("sale-b", &[(101, 1, 5000), (999, 1, 100)]);

        let err = record(&db, &bad).await.unwrap_err();

        assert!(matches!(err, DbError::ForeignKeyViolation { .. }));
        assert_eq!(db.sales().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_duplicate_sale_id_rejected() {
        let db = setup().await;
        record(&db, &sale("sale-c", &[(101, 1, 5000)])).await.unwrap();

        let err = record(&db, &sale("sale-c", &[(202, 1, 2000)]))
            .await
            .unwrap_err();

        assert!(matches!(err, DbError::UniqueViolation { .. }));
        assert_eq!(db.sales().count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_list_recent_and_revenue() {
        let db = setup().await;
        record(&db, &sale("first", &[(101, 1, 5000)])).await.unwrap();
        record(&db, &sale("second", &[(202, 2, 2000)])).await.unwrap();

        let recent = db.sales().list_recent(10).await.unwrap();
        let ids: Vec<&str> = recent.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["second", "first"]);
        assert_eq!(recent[0].lines.len(), 1);

        assert_eq!(db.sales().list_recent(1).await.unwrap().len(), 1);
        assert_eq!(db.sales().count().await.unwrap(), 2);
        assert_eq!(
            db.sales().total_revenue().await.unwrap(),
            Money::from_cents(9000)
        );
    }

    #[tokio::test]
    async fn test_sale_without_lines_recorded() {
        let db = setup().await;

        record(&db, &sale("sale-empty", &[])).await.unwrap();

        let loaded = db.sales().get_by_id("sale-empty").await.unwrap().unwrap();
        assert!(loaded.lines.is_empty());
        assert!(loaded.total().is_zero());
    }

    #[tokio::test]
    async fn test_unit_count_overflow_rejected_before_write() {
        let db = setup().await;
        let huge = sale("sale-huge", &[(101, i64::MAX, 0), (202, 1, 0)]);

        let err = record(&db, &huge).await.unwrap_err();

        assert!(matches!(err, DbError::InvalidInput(_)));
        assert_eq!(db.sales().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_empty_revenue_is_zero() {
        let db = setup().await;
        assert!(db.sales().total_revenue().await.unwrap().is_zero());
    }
}
