//! # Stats Repository
//!
//! Windowed revenue aggregation and the top-products ranking.
//!
//! ## Query Shape
//! Every window query is the same half-open predicate:
//! ```sql
//! WHERE sale_date >= ?start AND sale_date < ?end
//! ```
//! A sale stamped exactly at the boundary lands in the newer window, never
//! in both. Aggregates are computed on demand; nothing is materialized.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use souq_core::stats::{percent_change, PeriodKind, StatWindow};

/// One row of the top-products ranking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopProduct {
    /// Product name as it appeared on the sale lines.
    pub name: String,
    /// Units sold across all sales.
    pub total_quantity: i64,
    /// Revenue attributed to this product, in cents.
    pub total_revenue_cents: i64,
}

/// Current-versus-previous aggregation for one period kind.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PeriodComparison {
    pub kind: PeriodKind,
    pub current: StatWindow,
    pub previous: StatWindow,
    /// Percent change in revenue, zero-previous policy applied.
    pub revenue_change_pct: f64,
    /// Percent change in sale count, same policy.
    pub count_change_pct: f64,
}

/// Repository for sales aggregation queries.
#[derive(Debug, Clone)]
pub struct StatsRepository {
    pool: SqlitePool,
}

impl StatsRepository {
    /// Creates a new StatsRepository.
    pub fn new(pool: SqlitePool) -> Self {
        StatsRepository { pool }
    }

    /// Revenue and sale count over `[starts_at, ends_before)`.
    pub async fn revenue_and_count(
        &self,
        starts_at: DateTime<Utc>,
        ends_before: DateTime<Utc>,
    ) -> DbResult<StatWindow> {
        let (revenue_cents, sale_count): (i64, i64) = sqlx::query_as(
            r#"
            SELECT COALESCE(SUM(total_cents), 0), COUNT(*)
            FROM sales
            WHERE sale_date >= ?1 AND sale_date < ?2
            "#,
        )
        .bind(starts_at)
        .bind(ends_before)
        .fetch_one(&self.pool)
        .await?;

        Ok(StatWindow {
            starts_at,
            ends_before,
            revenue_cents,
            sale_count,
        })
    }

    /// Period-over-period comparison relative to `now`.
    ///
    /// Runs the current and previous window aggregates concurrently.
    pub async fn period_comparison(
        &self,
        kind: PeriodKind,
        now: DateTime<Utc>,
    ) -> DbResult<PeriodComparison> {
        let windows = kind.windows(now);

        let (current, previous) = tokio::try_join!(
            self.revenue_and_count(windows.current.starts_at, windows.current.ends_before),
            self.revenue_and_count(windows.previous.starts_at, windows.previous.ends_before),
        )?;

        debug!(
            ?kind,
            current_revenue = current.revenue_cents,
            previous_revenue = previous.revenue_cents,
            "Period comparison"
        );

        Ok(PeriodComparison {
            kind,
            current,
            previous,
            revenue_change_pct: percent_change(current.revenue_cents, previous.revenue_cents),
            count_change_pct: percent_change(current.sale_count, previous.sale_count),
        })
    }

    /// The best-selling products by units sold.
    ///
    /// Grouped by name snapshot; ties in quantity break toward the product
    /// that entered the sales history first.
    pub async fn top_products(&self, limit: u32) -> DbResult<Vec<TopProduct>> {
        let rows: Vec<(String, i64, i64)> = sqlx::query_as(
            r#"
            SELECT name_snapshot,
                   SUM(quantity) AS total_quantity,
                   SUM(line_total_cents) AS total_revenue_cents
            FROM sale_items
            GROUP BY name_snapshot
            ORDER BY total_quantity DESC, MIN(rowid) ASC
            LIMIT ?1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(name, total_quantity, total_revenue_cents)| TopProduct {
                name,
                total_quantity,
                total_revenue_cents,
            })
            .collect())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
