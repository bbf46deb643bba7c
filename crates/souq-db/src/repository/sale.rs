//! # Sale Repository
//!
//! Database operations for committed sales, the sale number sequence, and
//! the stock-application markers the reconciler reads.
//!
//! ## Sale Number Sequence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  counters table                                                         │
//! │                                                                         │
//! │  UPDATE counters SET value = value + 1                                  │
//! │  WHERE name = 'sale_number'                                             │
//! │  RETURNING value                                                        │
//! │                                                                         │
//! │  One statement, one row lock: two registers can never draw the same    │
//! │  number. The UNIQUE index on sales.sale_number is the backstop.        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Stock Markers
//! Every sale line carries a `stock_applied` flag, set in the same
//! transaction as its inventory decrement. A crash between the sale insert
//! and the last decrement leaves fully unmarked lines behind; the
//! reconciler finds and replays them.
//!
//! ## Atomic Decrement-With-Floor
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │              How the stock decrement stays race-free                    │
//! │                                                                         │
//! │  Two registers sell the last unit at the same moment:                  │
//! │                                                                         │
//! │  NAIVE (read, subtract, write)          ATOMIC (single UPDATE)         │
//! │  ──────────────────────────────         ─────────────────────────      │
//! │  A reads 1        B reads 1             A: MAX(0, 1-1) → 0             │
//! │  A writes 0       B writes 0            B: MAX(0, 0-1) → 0 (clamped)   │
//! │  stock "fine", one unit lost            B's clamp is flagged           │
//! │                                                                         │
//! │  The decrement and the floor are one indivisible statement; the        │
//! │  CHECK constraint on the column is the last-resort backstop.           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, warn};

use crate::error::{DbError, DbResult};
use souq_core::{Sale, SaleLine};

/// Outcome of one atomic stock decrement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StockAdjustment {
    /// Stock level before the decrement.
    pub prior: i64,
    /// Stock level after the decrement (never negative).
    pub remaining: i64,
    /// True when the requested quantity exceeded the prior stock and the
    /// decrement stopped at zero.
    pub clamped: bool,
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

    /// Draws the next sale number from the store sequence.
    ///
    /// Formats as `INV-000001`, `INV-000002`, ... The increment-and-return
    /// is a single statement, so concurrent callers get distinct numbers.
    pub async fn next_sale_number(&self) -> DbResult<String> {
        let value: i64 = sqlx::query_scalar(
            r#"
            UPDATE counters
            SET value = value + 1
            WHERE name = 'sale_number'
            RETURNING value
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(format!("INV-{:06}", value))
    }

    /// Inserts a sale header.
    pub async fn insert_sale(&self, sale: &Sale) -> DbResult<()> {
        debug!(id = %sale.id, sale_number = %sale.sale_number, "Inserting sale");

        sqlx::query(
            r#"
            INSERT INTO sales (
                id, sale_number,
                subtotal_cents, tax_cents, discount_cents, total_cents,
                payment_method, sale_date,
                customer_name, customer_phone, notes,
                stock_applied, stock_flagged, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)
            "#,
        )
        .bind(&sale.id)
        .bind(&sale.sale_number)
        .bind(sale.subtotal_cents)
        .bind(sale.tax_cents)
        .bind(sale.discount_cents)
        .bind(sale.total_cents)
        .bind(sale.payment_method)
        .bind(sale.sale_date)
        .bind(&sale.customer_name)
        .bind(&sale.customer_phone)
        .bind(&sale.notes)
        .bind(sale.stock_applied)
        .bind(sale.stock_flagged)
        .bind(sale.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Inserts a sale line.
    ///
    /// ## Snapshot Pattern
    /// Name and unit price were frozen in the cart; the line stores those
    /// snapshots so later catalog edits never rewrite sale history.
    pub async fn insert_line(&self, line: &SaleLine) -> DbResult<()> {
        debug!(sale_id = %line.sale_id, product_id = %line.product_id, "Inserting sale line");

        sqlx::query(
            r#"
            INSERT INTO sale_items (
                id, sale_id, product_id,
                name_snapshot, unit_price_cents, quantity, line_total_cents,
                stock_applied, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(&line.id)
        .bind(&line.sale_id)
        .bind(&line.product_id)
        .bind(&line.name_snapshot)
        .bind(line.unit_price_cents)
        .bind(line.quantity)
        .bind(line.line_total_cents)
        .bind(line.stock_applied)
        .bind(line.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Gets a sale by its ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Sale>> {
        let sale = sqlx::query_as::<_, Sale>(
            r#"
            SELECT id, sale_number,
                   subtotal_cents, tax_cents, discount_cents, total_cents,
                   payment_method, sale_date,
                   customer_name, customer_phone, notes,
                   stock_applied, stock_flagged, created_at
            FROM sales
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(sale)
    }

    /// Gets all lines for a sale in insertion order.
    pub async fn get_lines(&self, sale_id: &str) -> DbResult<Vec<SaleLine>> {
        let lines = sqlx::query_as::<_, SaleLine>(
            r#"
            SELECT id, sale_id, product_id,
                   name_snapshot, unit_price_cents, quantity, line_total_cents,
                   stock_applied, created_at
            FROM sale_items
            WHERE sale_id = ?1
            ORDER BY rowid
            "#,
        )
        .bind(sale_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(lines)
    }

    /// Lists the most recent sales, newest first.
    pub async fn list_recent(&self, limit: u32) -> DbResult<Vec<Sale>> {
        let sales = sqlx::query_as::<_, Sale>(
            r#"
            SELECT id, sale_number,
                   subtotal_cents, tax_cents, discount_cents, total_cents,
                   payment_method, sale_date,
                   customer_name, customer_phone, notes,
                   stock_applied, stock_flagged, created_at
            FROM sales
            ORDER BY sale_date DESC
            LIMIT ?1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(sales)
    }

    /// Applies one line's stock decrement and its marker in a single
    /// transaction.
    ///
    /// The decrement and the `stock_applied` marker land together or not
    /// at all, so a crash can never leave a decrement the reconciler
    /// would replay. Both the commit workflow and the reconciler go
    /// through here.
    ///
    /// ## Returns
    /// The [`StockAdjustment`] of the decrement. `NotFound` if the line
    /// doesn't exist (the decrement is rolled back).
    pub async fn apply_line_stock(
        &self,
        line_id: &str,
        product_id: &str,
        quantity: i64,
    ) -> DbResult<StockAdjustment> {
        let mut tx = self.pool.begin().await?;

        let prior: i64 =
            sqlx::query_scalar("SELECT stock_quantity FROM products WHERE id = ?1")
                .bind(product_id)
                .fetch_one(&mut *tx)
                .await?;

        let now = Utc::now();
        let remaining: i64 = sqlx::query_scalar(
            r#"
            UPDATE products
            SET stock_quantity = MAX(0, stock_quantity - ?1),
                updated_at = ?2
            WHERE id = ?3
            RETURNING stock_quantity
            "#,
        )
        .bind(quantity)
        .bind(now)
        .bind(product_id)
        .fetch_one(&mut *tx)
        .await?;

        let marked = sqlx::query("UPDATE sale_items SET stock_applied = 1 WHERE id = ?1")
            .bind(line_id)
            .execute(&mut *tx)
            .await?;
        if marked.rows_affected() == 0 {
            // dropping the transaction rolls the decrement back
            return Err(DbError::not_found("SaleLine", line_id));
        }

        tx.commit().await?;

        let clamped = prior < quantity;
        if clamped {
            warn!(
                product_id = %product_id,
                requested = quantity,
                prior,
                "Stock decrement clamped at zero"
            );
        }

        Ok(StockAdjustment {
            prior,
            remaining,
            clamped,
        })
    }

    /// Marks a sale's stock fully applied (all line decrements landed).
    pub async fn mark_sale_stock_applied(&self, sale_id: &str) -> DbResult<()> {
        sqlx::query("UPDATE sales SET stock_applied = 1 WHERE id = ?1")
            .bind(sale_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Flags a sale whose stock decrement was clamped at zero.
    ///
    /// The sale stands; the flag marks the inventory count as suspect so
    /// the store can recount.
    pub async fn flag_stock_discrepancy(&self, sale_id: &str) -> DbResult<()> {
        sqlx::query("UPDATE sales SET stock_flagged = 1 WHERE id = ?1")
            .bind(sale_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Lines whose stock decrement never landed, oldest first.
    ///
    /// These are the residue of a crash mid-commit; the reconciler replays
    /// them.
    pub async fn unapplied_lines(&self) -> DbResult<Vec<SaleLine>> {
        let lines = sqlx::query_as::<_, SaleLine>(
            r#"
            SELECT id, sale_id, product_id,
                   name_snapshot, unit_price_cents, quantity, line_total_cents,
                   stock_applied, created_at
            FROM sale_items
            WHERE stock_applied = 0
            ORDER BY rowid
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(lines)
    }

    /// Marks every sale whose lines are now all applied.
    ///
    /// ## Returns
    /// Number of sales transitioned to `stock_applied`.
    pub async fn mark_reconciled_sales(&self) -> DbResult<u64> {
        let result = sqlx::query(
            r#"
            UPDATE sales
            SET stock_applied = 1
            WHERE stock_applied = 0
              AND NOT EXISTS (
                  SELECT 1 FROM sale_items
                  WHERE sale_items.sale_id = sales.id
                    AND sale_items.stock_applied = 0
              )
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
