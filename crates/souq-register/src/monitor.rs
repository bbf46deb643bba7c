//! # Low-Stock Monitor
//!
//! Read-only inventory watch: which active products sit at or below their
//! reorder threshold, how many (for the nav badge), and what to reorder.
//!
//! The boundary is inclusive: stock 5 with a minimum of 5 is low. Going
//! below zero is impossible (the decrement floors at zero), so zero-stock
//! products always show here as long as their threshold is ≥ 0.

use tracing::debug;

use souq_core::Product;
use souq_db::{Database, DbResult};

/// A restock recommendation for one low product.
#[derive(Debug, Clone)]
pub struct ReorderSuggestion {
    pub product: Product,
    /// Units needed to sit one threshold above the reorder level.
    pub suggested_quantity: i64,
}

/// Read-only low-stock queries against the catalog.
#[derive(Debug, Clone)]
pub struct LowStockMonitor {
    db: Database,
}

impl LowStockMonitor {
    /// Creates a monitor over the given database.
    pub fn new(db: Database) -> Self {
        LowStockMonitor { db }
    }

    /// Active products at or below their reorder threshold, most urgent
    /// first.
    pub async fn low_stock_products(&self) -> DbResult<Vec<Product>> {
        self.db.products().low_stock().await
    }

    /// Count for the navigation badge.
    pub async fn badge_count(&self) -> DbResult<usize> {
        let count = self.low_stock_products().await?.len();
        debug!(count, "Low-stock badge");
        Ok(count)
    }

    /// Restock suggestions: enough units to reach twice the threshold
    /// (minimum one unit, for products with a zero threshold).
    pub async fn reorder_suggestions(&self) -> DbResult<Vec<ReorderSuggestion>> {
        let suggestions = self
            .low_stock_products()
            .await?
            .into_iter()
            .map(|product| {
                let target = (product.min_stock_level * 2).max(product.min_stock_level + 1);
                let suggested_quantity = (target - product.stock_quantity).max(1);
                ReorderSuggestion {
                    product,
                    suggested_quantity,
                }
            })
            .collect();

        Ok(suggestions)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use souq_db::DbConfig;
    use uuid::Uuid;

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    async fn insert_product(db: &Database, name: &str, stock: i64, min_level: i64) -> Product {
        let now = Utc::now();
        let product = Product {
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
        };
        db.products().insert(&product).await.unwrap();
        product
    }

    #[tokio::test]
    async fn test_badge_count_inclusive_boundary() {
        let db = test_db().await;
        insert_product(&db, "At Boundary", 5, 5).await;
        insert_product(&db, "Below", 0, 5).await;
        insert_product(&db, "Healthy", 6, 5).await;

        let monitor = LowStockMonitor::new(db);
        assert_eq!(monitor.badge_count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_most_urgent_first() {
        let db = test_db().await;
        insert_product(&db, "Slightly Low", 4, 5).await;
        insert_product(&db, "Empty", 0, 5).await;

        let monitor = LowStockMonitor::new(db);
        let low = monitor.low_stock_products().await.unwrap();
        assert_eq!(low[0].name, "Empty");
        assert_eq!(low[1].name, "Slightly Low");
    }

    #[tokio::test]
    async fn test_reorder_suggestions() {
        let db = test_db().await;
        // threshold 5, stock 2: target 10, suggest 8
        insert_product(&db, "Cable", 2, 5).await;
        // threshold 0, stock 0: still suggests at least one unit
        insert_product(&db, "Oddball", 0, 0).await;

        let monitor = LowStockMonitor::new(db);
        let suggestions = monitor.reorder_suggestions().await.unwrap();
        assert_eq!(suggestions.len(), 2);

        let cable = suggestions
            .iter()
            .find(|s| s.product.name == "Cable")
            .unwrap();
        assert_eq!(cable.suggested_quantity, 8);

        let oddball = suggestions
            .iter()
            .find(|s| s.product.name == "Oddball")
            .unwrap();
        assert!(oddball.suggested_quantity >= 1);
    }
}
