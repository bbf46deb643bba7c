//! # Stock Reconciliation
//!
//! The commit workflow writes the sale before it applies the stock
//! decrements, and it never rolls back. A crash in between leaves sale
//! lines with `stock_applied = 0`: the sale is real, the inventory count
//! is stale.
//!
//! This module is the maintenance operation that closes that gap:
//!
//! ```text
//! check()  ── lists the divergences (read-only, for an admin view)
//! repair() ── replays the missing atomic decrements, marks the lines,
//!             then transitions any sale whose lines are all applied
//! ```
//!
//! `repair()` is idempotent: applied lines are never touched again, so
//! running it twice decrements nothing twice.

use tracing::{info, warn};

use souq_core::SaleLine;
use souq_db::{Database, DbResult};

/// One sale line recorded but never applied to inventory.
#[derive(Debug, Clone)]
pub struct StockDivergence {
    pub line: SaleLine,
}

/// Summary of one repair run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RepairReport {
    /// Lines whose decrement was replayed and marked.
    pub lines_repaired: usize,
    /// Replayed decrements that clamped at zero stock.
    pub lines_clamped: usize,
    /// Sales transitioned to fully stock-applied.
    pub sales_completed: u64,
}

/// Maintenance operation reconciling sales against inventory.
#[derive(Debug, Clone)]
pub struct StockReconciler {
    db: Database,
}

impl StockReconciler {
    /// Creates a reconciler over the given database.
    pub fn new(db: Database) -> Self {
        StockReconciler { db }
    }

    /// Lists sale lines recorded but never applied to inventory.
    ///
    /// Read-only; an empty result means sales and stock agree.
    pub async fn check(&self) -> DbResult<Vec<StockDivergence>> {
        let lines = self.db.sales().unapplied_lines().await?;

        if !lines.is_empty() {
            warn!(count = lines.len(), "Unapplied sale lines found");
        }

        Ok(lines
            .into_iter()
            .map(|line| StockDivergence { line })
            .collect())
    }

    /// Replays the missing decrements and marks the lines applied.
    ///
    /// Each replay goes through the same single-transaction
    /// decrement-plus-marker as the live commit, so an unmarked line
    /// always means an unapplied decrement and a replay never repeats
    /// one. A replayed decrement can clamp at zero just like a live one;
    /// the owning sale gets flagged the same way.
    pub async fn repair(&self) -> DbResult<RepairReport> {
        let divergences = self.check().await?;
        let mut report = RepairReport::default();

        let sales = self.db.sales();

        for divergence in divergences {
            let line = divergence.line;

            let adjustment = sales
                .apply_line_stock(&line.id, &line.product_id, line.quantity)
                .await?;

            if adjustment.clamped {
                warn!(
                    sale_id = %line.sale_id,
                    product = %line.name_snapshot,
                    "Replayed decrement clamped at zero"
                );
                sales.flag_stock_discrepancy(&line.sale_id).await?;
                report.lines_clamped += 1;
            }

            report.lines_repaired += 1;
        }

        report.sales_completed = sales.mark_reconciled_sales().await?;

        if report.lines_repaired > 0 {
            info!(
                lines = report.lines_repaired,
                clamped = report.lines_clamped,
                sales = report.sales_completed,
                "Stock reconciliation repaired divergences"
            );
        }

        Ok(report)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
