//! # Checkout Error Types
//!
//! Errors for the commit workflow, tagged with the step that failed.
//!
//! ## Error Hierarchy
//! ```text
//! CheckoutError
//! ├── Validation   ← CoreError, raised before any side effect
//! ├── SaleNumber   ← sequence draw or duplicate number
//! ├── Persistence  ← DbError, tagged with the failing CommitStep
//! └── Timeout      ← a store call exceeded its per-step budget
//! ```
//!
//! The step tag is what makes a half-committed sale diagnosable: an error
//! at `ApplyStock` means the sale header is durable and the reconciler
//! will finish the decrements.

use thiserror::Error;

use souq_core::CoreError;
use souq_db::DbError;

/// The steps of the commit workflow, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitStep {
    /// Drawing the next sale number from the sequence.
    DrawSaleNumber,
    /// Inserting the sale header.
    InsertSale,
    /// Inserting the sale lines.
    InsertLines,
    /// Applying stock decrements and markers.
    ApplyStock,
    /// Loading store configuration for the receipt.
    LoadConfig,
}

impl std::fmt::Display for CommitStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            CommitStep::DrawSaleNumber => "draw_sale_number",
            CommitStep::InsertSale => "insert_sale",
            CommitStep::InsertLines => "insert_lines",
            CommitStep::ApplyStock => "apply_stock",
            CommitStep::LoadConfig => "load_config",
        };
        write!(f, "{}", name)
    }
}

/// Errors from the sale commit workflow.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// The cart or request failed validation; nothing was written and the
    /// cart is untouched.
    #[error(transparent)]
    Validation(#[from] CoreError),

    /// The sale number could not be assigned (sequence failure or a
    /// duplicate slipped past it). Retryable: the next attempt draws a
    /// fresh number.
    #[error("Sale number assignment failed: {0}")]
    SaleNumber(String),

    /// A database write failed at the given step.
    #[error("Commit failed at {step}: {source}")]
    Persistence {
        step: CommitStep,
        #[source]
        source: DbError,
    },

    /// A store call exceeded its per-step time budget.
    #[error("Commit timed out at {step}")]
    Timeout { step: CommitStep },
}

impl CheckoutError {
    /// Whether the caller may simply retry the commit.
    ///
    /// Validation failures need a changed cart or request first; a
    /// persistence failure past `InsertSale` needs reconciliation, not a
    /// retry (the sale number is already burned).
    pub fn is_retryable(&self) -> bool {
        match self {
            CheckoutError::Validation(_) => false,
            CheckoutError::SaleNumber(_) => true,
            CheckoutError::Timeout { .. } => true,
            CheckoutError::Persistence { step, .. } => {
                matches!(step, CommitStep::DrawSaleNumber | CommitStep::InsertSale)
            }
        }
    }
}

/// Result type for checkout operations.
pub type CheckoutResult<T> = Result<T, CheckoutError>;
