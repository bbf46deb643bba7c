//! # Product Repository
//!
//! Database operations for the product catalog and inventory. Reads and
//! the low-stock query live here; the sale-driven stock decrement lives
//! with the sale repository, where it shares a transaction with the line
//! marker.

use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use souq_core::Product;

/// Repository for product database operations.
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Inserts a product.
    pub async fn insert(&self, product: &Product) -> DbResult<()> {
        debug!(id = %product.id, name = %product.name, "Inserting product");

        sqlx::query(
            r#"
            INSERT INTO products (
                id, name, barcode, category_id,
                price_cents, cost_cents, stock_quantity, min_stock_level,
                is_active, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            "#,
        )
        .bind(&product.id)
        .bind(&product.name)
        .bind(&product.barcode)
        .bind(&product.category_id)
        .bind(product.price_cents)
        .bind(product.cost_cents)
        .bind(product.stock_quantity)
        .bind(product.min_stock_level)
        .bind(product.is_active)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Gets a product by its ID.
    ///
    /// ## Returns
    /// * `Ok(Some(Product))` - Product found
    /// * `Ok(None)` - Product not found
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, name, barcode, category_id,
                   price_cents, cost_cents, stock_quantity, min_stock_level,
                   is_active, created_at, updated_at
            FROM products
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    /// Lists active products sorted by name.
    pub async fn list_active(&self, limit: u32) -> DbResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, name, barcode, category_id,
                   price_cents, cost_cents, stock_quantity, min_stock_level,
                   is_active, created_at, updated_at
            FROM products
            WHERE is_active = 1
            ORDER BY name
            LIMIT ?1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    /// Counts active products.
    pub async fn count_active(&self) -> DbResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE is_active = 1")
                .fetch_one(&self.pool)
                .await?;

        Ok(count)
    }

    /// Lists active products at or below their reorder threshold.
    ///
    /// The boundary is inclusive: stock 5 with minimum 5 is returned.
    /// Sorted by urgency (furthest below threshold first).
    pub async fn low_stock(&self) -> DbResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(
            r#"
            SELECT id, name, barcode, category_id,
                   price_cents, cost_cents, stock_quantity, min_stock_level,
                   is_active, created_at, updated_at
            FROM products
            WHERE is_active = 1
              AND stock_quantity <= min_stock_level
            ORDER BY (stock_quantity - min_stock_level) ASC, name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        debug!(count = products.len(), "Low-stock products");
        Ok(products)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use chrono::Utc;
    use uuid::Uuid;

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    fn test_product(name: &str, stock: i64, min_level: i64) -> Product {
        let now = Utc::now();
        Product {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            barcode: None,
            category_id: None,
            price_cents: 10_000,
            cost_cents: 6_000,
            stock_quantity: stock,
            min_stock_level: min_level,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_insert_and_get() {
        let db = test_db().await;
        let repo = db.products();

        let product = test_product("Galaxy S24", 10, 2);
        repo.insert(&product).await.unwrap();

        let loaded = repo.get_by_id(&product.id).await.unwrap().unwrap();
        assert_eq!(loaded.name, "Galaxy S24");
        assert_eq!(loaded.stock_quantity, 10);
        assert_eq!(loaded.price_cents, 10_000);

        assert!(repo.get_by_id("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_low_stock_boundary_inclusive() {
        let db = test_db().await;
        let repo = db.products();

        // stock == min_level is low; one above is not
        let at_boundary = test_product("At Boundary", 5, 5);
        let above = test_product("Above", 6, 5);
        repo.insert(&at_boundary).await.unwrap();
        repo.insert(&above).await.unwrap();

        let low = repo.low_stock().await.unwrap();
        assert_eq!(low.len(), 1);
        assert_eq!(low[0].id, at_boundary.id);
    }

    #[tokio::test]
    async fn test_low_stock_excludes_inactive() {
        let db = test_db().await;
        let repo = db.products();

        let mut product = test_product("Retired", 0, 5);
        product.is_active = false;
        repo.insert(&product).await.unwrap();

        assert!(repo.low_stock().await.unwrap().is_empty());
    }
}
