//! # Error Types
//!
//! Domain-specific error types for souq-core.
//!
//! ## Error Hierarchy
//! ```text
//! souq-core errors (this file)
//! ├── CoreError        - Business rule violations
//! └── ValidationError  - Input validation failures
//!
//! souq-db errors
//! └── DbError          - Database operation failures
//!
//! souq-register errors
//! └── CheckoutError    - Commit workflow failures (wraps the above)
//! ```
//!
//! ## Design Principles
//! 1. `thiserror` derive macros, not manual impls
//! 2. Context in error messages (product name, quantities)
//! 3. Errors are enum variants, never String

use thiserror::Error;

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The cart has no lines; a sale cannot be committed from it.
    #[error("Cart is empty")]
    EmptyCart,

    /// The product has no stock; the cart rejects the add.
    ///
    /// Stock is validated again at commit time, so this is a front-line
    /// guard, not the final word.
    #[error("'{name}' is out of stock")]
    OutOfStock { name: String },

    /// Cart has reached the maximum number of lines.
    #[error("Cart cannot have more than {max} lines")]
    CartTooLarge { max: usize },

    /// Line quantity exceeds the maximum allowed.
    #[error("Quantity {requested} exceeds maximum allowed ({max})")]
    QuantityTooLarge { requested: i64, max: i64 },

    /// The discount exceeds the taxed subtotal; a sale total may not go
    /// negative.
    #[error("Sale total would be negative ({total_cents} cents)")]
    NegativeTotal { total_cents: i64 },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

/// Input validation errors.
///
/// Raised before business logic runs; commit refuses to start on these and
/// leaves the cart untouched.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    MustNotBeNegative { field: String },
}

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::OutOfStock {
            name: "Galaxy S24".to_string(),
        };
        assert_eq!(err.to_string(), "'Galaxy S24' is out of stock");

        let err = CoreError::NegativeTotal { total_cents: -500 };
        assert_eq!(err.to_string(), "Sale total would be negative (-500 cents)");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::MustBePositive {
            field: "quantity".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
