//! # Receipt Printer Port
//!
//! The commit workflow hands finished receipt text to a [`ReceiptPrinter`]
//! and moves on. Printing is fire-and-forget: the sale is already durable
//! when the printer is called, and a printer failure never invalidates it.
//!
//! The default implementation logs the receipt. A real ESC/POS driver
//! would implement the same trait.

use tracing::info;

/// Port for receipt delivery.
///
/// Implementations must not block the commit path; anything slow belongs
/// on the implementation's own queue.
pub trait ReceiptPrinter: Send + Sync {
    /// Delivers receipt text. Failures are the implementation's problem to
    /// log or retry; they are not reported back to the commit workflow.
    fn print(&self, sale_number: &str, receipt: &str);
}

/// Printer stub that writes receipts to the log.
#[derive(Debug, Default)]
pub struct LogPrinter;

impl ReceiptPrinter for LogPrinter {
    fn print(&self, sale_number: &str, receipt: &str) {
        info!(sale_number = %sale_number, "Printing receipt\n{}", receipt);
    }
}
