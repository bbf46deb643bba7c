//! # Domain Types
//!
//! Core domain types used throughout Souq POS.
//!
//! ## Dual-Key Identity Pattern
//! Every persisted entity has:
//! - `id`: UUID v4 - immutable, used for database relations
//! - Business ID where one exists: `sale_number` for sales (human-facing,
//!   assigned by the store sequence)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::money::Money;

// =============================================================================
// Tax Rate
// =============================================================================

/// Tax rate represented in basis points (bps).
///
/// 1 basis point = 0.01% = 1/10000. The store default of 15% is 1500 bps.
/// Basis points keep tax math in integers end to end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxRate(u32);

impl TaxRate {
    /// Creates a tax rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        TaxRate(bps)
    }

    /// Creates a tax rate from a fraction, e.g. `0.15` for 15%.
    ///
    /// This is how the `tax_rate` store setting is written, so the settings
    /// loader parses through here.
    pub fn from_fraction(fraction: f64) -> Self {
        TaxRate((fraction * 10_000.0).round() as u32)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage (for display only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Zero tax rate.
    #[inline]
    pub const fn zero() -> Self {
        TaxRate(0)
    }

    /// Checks if the tax rate is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl Default for TaxRate {
    fn default() -> Self {
        TaxRate::zero()
    }
}

// =============================================================================
// Product
// =============================================================================

/// A product available for sale.
///
/// The commit workflow mutates only `stock_quantity` (atomic
/// decrement-with-floor); everything else belongs to catalog management.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Display name shown to the cashier and on receipts.
    pub name: String,

    /// Barcode (EAN-13, UPC-A, etc.), if labelled.
    pub barcode: Option<String>,

    /// Owning category, if assigned.
    pub category_id: Option<String>,

    /// Sale price in cents.
    pub price_cents: i64,

    /// Acquisition cost in cents (for margin reporting).
    pub cost_cents: i64,

    /// Current stock level. Never decremented below zero.
    pub stock_quantity: i64,

    /// Reorder threshold: at or below this level the product is low-stock.
    pub min_stock_level: i64,

    /// Whether the product is active (soft delete).
    pub is_active: bool,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Returns the price as a Money value.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }

    /// Checks whether the product counts as low-stock.
    ///
    /// The boundary is inclusive: stock 5 with minimum 5 is low.
    #[inline]
    pub fn is_low_stock(&self) -> bool {
        self.stock_quantity <= self.min_stock_level
    }

    /// Checks whether there is any stock to sell.
    #[inline]
    pub fn in_stock(&self) -> bool {
        self.stock_quantity > 0
    }
}

// =============================================================================
// Payment Method
// =============================================================================

#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Physical cash payment.
    Cash,
    /// Card payment on an external terminal.
    Card,
    /// Bank transfer.
    BankTransfer,
}

impl Default for PaymentMethod {
    fn default() -> Self {
        PaymentMethod::Cash
    }
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaymentMethod::Cash => write!(f, "cash"),
            PaymentMethod::Card => write!(f, "card"),
            PaymentMethod::BankTransfer => write!(f, "bank_transfer"),
        }
    }
}

// =============================================================================
// Sale
// =============================================================================

/// A committed sale transaction.
///
/// Created once, atomically, at commit time; immutable thereafter except
/// for the two inventory-bookkeeping flags.
///
/// Invariants: `subtotal = Σ line totals`, `tax = subtotal × rate`,
/// `total = subtotal + tax − discount`, `total ≥ 0`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Sale {
    pub id: String,
    /// Human-facing invoice number, unique, assigned by the store sequence.
    pub sale_number: String,
    pub subtotal_cents: i64,
    pub tax_cents: i64,
    pub discount_cents: i64,
    pub total_cents: i64,
    pub payment_method: PaymentMethod,
    pub sale_date: DateTime<Utc>,
    pub customer_name: Option<String>,
    pub customer_phone: Option<String>,
    pub notes: Option<String>,
    /// True once every line's stock decrement has been applied.
    pub stock_applied: bool,
    /// True when any line's decrement was clamped at zero stock.
    pub stock_flagged: bool,
    pub created_at: DateTime<Utc>,
}

impl Sale {
    /// Returns the grand total as Money.
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }
}

// =============================================================================
// Sale Line
// =============================================================================

/// A line item in a committed sale.
///
/// Uses the snapshot pattern: name and unit price are frozen at commit time
/// from the cart (which froze them at add time). Later catalog edits never
/// retroactively alter historical lines.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct SaleLine {
    pub id: String,
    pub sale_id: String,
    pub product_id: String,
    /// Product name at time of sale (frozen).
    pub name_snapshot: String,
    /// Unit price in cents at time of sale (frozen).
    pub unit_price_cents: i64,
    pub quantity: i64,
    /// unit_price × quantity.
    pub line_total_cents: i64,
    /// True once this line's stock decrement has been applied.
    pub stock_applied: bool,
    pub created_at: DateTime<Utc>,
}

impl SaleLine {
    /// Returns the line total as Money.
    #[inline]
    pub fn line_total(&self) -> Money {
        Money::from_cents(self.line_total_cents)
    }
}

// =============================================================================
// Store Configuration
// =============================================================================

/// Store configuration loaded from the `settings` collection.
///
/// Read per operation, never cached in a process-wide singleton; the commit
/// workflow and aggregation receive the values they need explicitly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    pub store_name: String,
    pub store_address: String,
    pub store_phone: String,
    /// Currency code appended to amounts on receipts, e.g. "SAR".
    pub currency: String,
    pub receipt_footer: String,
    pub tax_rate: TaxRate,
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig {
            store_name: "Souq Mobile".to_string(),
            store_address: String::new(),
            store_phone: String::new(),
            currency: "SAR".to_string(),
            receipt_footer: "Thank you for shopping with us".to_string(),
            tax_rate: TaxRate::from_bps(crate::DEFAULT_TAX_RATE_BPS),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tax_rate_from_bps() {
        let rate = TaxRate::from_bps(1500);
        assert_eq!(rate.bps(), 1500);
        assert!((rate.percentage() - 15.0).abs() < 0.001);
    }

    #[test]
    fn test_tax_rate_from_fraction() {
        assert_eq!(TaxRate::from_fraction(0.15).bps(), 1500);
        assert_eq!(TaxRate::from_fraction(0.0825).bps(), 825);
        assert_eq!(TaxRate::from_fraction(0.0).bps(), 0);
    }

    #[test]
    fn test_low_stock_boundary_inclusive() {
        let mut product = test_product();
        product.stock_quantity = 5;
        product.min_stock_level = 5;
        assert!(product.is_low_stock());

        product.stock_quantity = 6;
        assert!(!product.is_low_stock());
    }

    #[test]
    fn test_payment_method_default() {
        assert_eq!(PaymentMethod::default(), PaymentMethod::Cash);
    }

    fn test_product() -> Product {
        let now = Utc::now();
        Product {
            id: "p1".to_string(),
            name: "Test".to_string(),
            barcode: None,
            category_id: None,
            price_cents: 1000,
            cost_cents: 600,
            stock_quantity: 10,
            min_stock_level: 2,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }
}
