//! # souq-register: Checkout Workflow for Souq POS
//!
//! This crate orchestrates everything that happens at the register:
//! committing a cart into a sale, keeping inventory honest, and telling
//! the rest of the app what changed.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Souq POS Layers                                  │
//! │                                                                         │
//! │  UI / API surface                                                       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  souq-register (THIS CRATE)                     │   │
//! │  │                                                                 │   │
//! │  │   Checkout ── commit saga, per-step timeouts                    │   │
//! │  │   LowStockMonitor ── badge counts, reorder suggestions          │   │
//! │  │   StockReconciler ── replays decrements lost to a crash         │   │
//! │  │   InvalidationBus ── broadcast cache invalidation               │   │
//! │  │   ReceiptPrinter ── fire-and-forget printer port                │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                          │                                      │
//! │       ▼                          ▼                                      │
//! │  souq-core (pure logic)     souq-db (SQLite repositories)               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`checkout`] - The sale commit workflow
//! - [`monitor`] - Low-stock monitoring
//! - [`reconcile`] - Crash-recovery stock reconciliation
//! - [`events`] - Cache invalidation broadcast
//! - [`printer`] - Receipt printer port and the logging stub
//! - [`error`] - Checkout error types

// =============================================================================
// Module Declarations
// =============================================================================

pub mod checkout;
pub mod error;
pub mod events;
pub mod monitor;
pub mod printer;
pub mod reconcile;

// =============================================================================
// Re-exports
// =============================================================================

pub use checkout::{Checkout, CheckoutRequest, CommittedSale};
pub use error::{CheckoutError, CheckoutResult, CommitStep};
pub use events::{Invalidation, InvalidationBus};
pub use monitor::{LowStockMonitor, ReorderSuggestion};
pub use printer::{LogPrinter, ReceiptPrinter};
pub use reconcile::{RepairReport, StockDivergence, StockReconciler};
