//! # souq-core: Pure Business Logic for Souq POS
//!
//! This crate is the **heart** of Souq POS. It contains all business logic
//! as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                        Souq POS Architecture                        │
//! │                                                                     │
//! │  ┌───────────────────────────────────────────────────────────────┐ │
//! │  │                    souq-register                              │ │
//! │  │   Sale commit workflow, low-stock monitor, reconciliation     │ │
//! │  └─────────────────────────────┬─────────────────────────────────┘ │
//! │                                │                                    │
//! │  ┌─────────────────────────────▼─────────────────────────────────┐ │
//! │  │               ★ souq-core (THIS CRATE) ★                      │ │
//! │  │                                                               │ │
//! │  │   ┌─────────┐  ┌───────┐  ┌──────┐  ┌───────┐  ┌─────────┐   │ │
//! │  │   │  types  │  │ money │  │ cart │  │ stats │  │ receipt │   │ │
//! │  │   └─────────┘  └───────┘  └──────┘  └───────┘  └─────────┘   │ │
//! │  │                                                               │ │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS          │ │
//! │  └─────────────────────────────┬─────────────────────────────────┘ │
//! │                                │                                    │
//! │  ┌─────────────────────────────▼─────────────────────────────────┐ │
//! │  │                    souq-db (Database Layer)                   │ │
//! │  │            SQLite queries, migrations, repositories           │ │
//! │  └───────────────────────────────────────────────────────────────┘ │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, Sale, SaleLine, StoreConfig)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`cart`] - The cart aggregate for an in-progress sale
//! - [`stats`] - Stat windows and period-comparison math
//! - [`receipt`] - Plain-text receipt formatting
//! - [`error`] - Domain error types
//! - [`validation`] - Business rule validation
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: same input, same output
//! 2. **Integer Money**: all monetary values are cents (i64), never floats
//! 3. **Explicit Errors**: typed errors, never strings or panics
//! 4. **Explicit Configuration**: tax rate and store settings are threaded
//!    in as values, never read from ambient global state

pub mod cart;
pub mod error;
pub mod money;
pub mod receipt;
pub mod stats;
pub mod types;
pub mod validation;

pub use cart::{Cart, CartLine};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use receipt::format_receipt;
pub use stats::{percent_change, PeriodKind, StatWindow};
pub use types::*;

/// Maximum lines allowed in a single cart.
///
/// Prevents runaway carts and keeps transactions a reasonable size.
pub const MAX_CART_LINES: usize = 100;

/// Maximum quantity of a single line in a cart.
///
/// Prevents accidental over-ordering (e.g., typing 1000 instead of 10).
pub const MAX_LINE_QUANTITY: i64 = 999;

/// Default store tax rate in basis points (15%).
///
/// Used only as a fallback when the `tax_rate` setting is missing or
/// unparseable; the commit workflow always receives its rate explicitly.
pub const DEFAULT_TAX_RATE_BPS: u32 = 1500;
