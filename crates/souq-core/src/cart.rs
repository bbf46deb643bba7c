//! # Cart Aggregate
//!
//! The in-memory, mutable collection of line items for one in-progress sale.
//!
//! ## Invariants
//! - Lines are unique by `product_id`; adding the same product again merges
//!   into the existing line's quantity
//! - Every line quantity is ≥ 1; a quantity driven to 0 removes the line
//!   rather than storing a zero
//! - Lines keep insertion order
//! - Each operation is a single atomic update of the line collection; there
//!   is no partially-mutated state
//!
//! ## Lifecycle
//! ```text
//! checkout session starts ──► Cart::new()
//! add / set quantity / remove ──► mutations
//! successful commit or explicit cancel ──► clear()
//! ```
//!
//! Name and unit price are **snapshotted at add time**. If the catalog
//! changes while the cart is open, the cart (and therefore the sale) keeps
//! the values the cashier saw.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::types::{Product, TaxRate};
use crate::{MAX_CART_LINES, MAX_LINE_QUANTITY};

/// A line in the cart.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartLine {
    /// Product ID (UUID), the line's unique key within the cart.
    pub product_id: String,

    /// Product name at time of adding (frozen).
    pub name: String,

    /// Price in cents at time of adding (frozen).
    pub unit_price_cents: i64,

    /// Quantity in cart, always ≥ 1.
    pub quantity: i64,

    /// When this line was first added.
    pub added_at: DateTime<Utc>,
}

impl CartLine {
    /// Creates a new cart line from a product, freezing name and price.
    pub fn from_product(product: &Product, quantity: i64) -> Self {
        CartLine {
            product_id: product.id.clone(),
            name: product.name.clone(),
            unit_price_cents: product.price_cents,
            quantity,
            added_at: Utc::now(),
        }
    }

    /// Line total in cents (unit price × quantity).
    pub fn line_total_cents(&self) -> i64 {
        self.unit_price_cents * self.quantity
    }
}

/// The cart for one in-progress sale.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    /// Creates a new empty cart.
    pub fn new() -> Self {
        Cart { lines: Vec::new() }
    }

    /// Adds a product to the cart, merging with an existing line.
    ///
    /// ## Behavior
    /// - Product already in cart: quantity is incremented by `quantity`
    /// - Otherwise: a new line is appended with frozen name/price
    /// - Product with no stock: the add is rejected (stock is re-validated
    ///   at commit time; this guard just keeps dead lines out of the cart)
    pub fn add_line(&mut self, product: &Product, quantity: i64) -> CoreResult<()> {
        if quantity <= 0 {
            return Err(ValidationError::MustBePositive {
                field: "quantity".to_string(),
            }
            .into());
        }

        if !product.in_stock() {
            return Err(CoreError::OutOfStock {
                name: product.name.clone(),
            });
        }

        if let Some(line) = self
            .lines
            .iter_mut()
            .find(|l| l.product_id == product.id)
        {
            let new_qty = line.quantity + quantity;
            if new_qty > MAX_LINE_QUANTITY {
                return Err(CoreError::QuantityTooLarge {
                    requested: new_qty,
                    max: MAX_LINE_QUANTITY,
                });
            }
            line.quantity = new_qty;
            return Ok(());
        }

        if self.lines.len() >= MAX_CART_LINES {
            return Err(CoreError::CartTooLarge {
                max: MAX_CART_LINES,
            });
        }

        if quantity > MAX_LINE_QUANTITY {
            return Err(CoreError::QuantityTooLarge {
                requested: quantity,
                max: MAX_LINE_QUANTITY,
            });
        }

        self.lines.push(CartLine::from_product(product, quantity));
        Ok(())
    }

    /// Overwrites the quantity of a line.
    ///
    /// ## Behavior
    /// - `quantity ≤ 0`: the line is removed
    /// - Unknown `product_id`: a no-op; re-adding a removed product goes
    ///   through [`add_line`](Cart::add_line), which creates a fresh line
    pub fn set_quantity(&mut self, product_id: &str, quantity: i64) {
        if quantity <= 0 {
            self.remove_line(product_id);
            return;
        }

        if let Some(line) = self.lines.iter_mut().find(|l| l.product_id == product_id) {
            line.quantity = quantity;
        }
    }

    /// Removes a line by product ID. Unknown IDs are a no-op.
    pub fn remove_line(&mut self, product_id: &str) {
        self.lines.retain(|l| l.product_id != product_id);
    }

    /// Empties the cart.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// The lines in insertion order.
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Number of distinct lines.
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Total quantity across all lines.
    pub fn total_quantity(&self) -> i64 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    /// Checks if the cart is empty.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Subtotal in cents (sum of line totals, before tax).
    pub fn subtotal_cents(&self) -> i64 {
        self.lines.iter().map(|l| l.line_total_cents()).sum()
    }

    /// Tax in cents at the given rate, computed on the subtotal.
    pub fn tax_cents(&self, rate: TaxRate) -> i64 {
        Money::from_cents(self.subtotal_cents())
            .calculate_tax(rate)
            .cents()
    }

    /// Grand total in cents: subtotal + tax − discount.
    pub fn total_cents(&self, rate: TaxRate, discount_cents: i64) -> i64 {
        self.subtotal_cents() + self.tax_cents(rate) - discount_cents
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product(id: &str, price_cents: i64, stock: i64) -> Product {
        let now = Utc::now();
        Product {
            id: id.to_string(),
            name: format!("Product {}", id),
            barcode: None,
            category_id: None,
            price_cents,
            cost_cents: 0,
            stock_quantity: stock,
            min_stock_level: 0,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_add_line() {
        let mut cart = Cart::new();
        cart.add_line(&product("a", 999, 10), 2).unwrap();

        assert_eq!(cart.line_count(), 1);
        assert_eq!(cart.total_quantity(), 2);
        assert_eq!(cart.subtotal_cents(), 1998);
    }

    #[test]
    fn test_add_same_product_merges_quantity() {
        // add(2) then add(3) is equivalent to a single add(5)
        let mut cart = Cart::new();
        let p = product("a", 999, 10);

        cart.add_line(&p, 2).unwrap();
        cart.add_line(&p, 3).unwrap();

        assert_eq!(cart.line_count(), 1);
        assert_eq!(cart.total_quantity(), 5);

        let mut single = Cart::new();
        single.add_line(&p, 5).unwrap();
        assert_eq!(single.subtotal_cents(), cart.subtotal_cents());
    }

    #[test]
    fn test_add_out_of_stock_is_rejected() {
        let mut cart = Cart::new();
        let err = cart.add_line(&product("a", 999, 0), 1).unwrap_err();
        assert!(matches!(err, CoreError::OutOfStock { .. }));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_set_quantity_zero_removes_line() {
        let mut cart = Cart::new();
        let p = product("a", 999, 10);
        cart.add_line(&p, 2).unwrap();

        cart.set_quantity("a", 0);
        assert!(cart.is_empty());

        // set_quantity on the removed id is a no-op
        cart.set_quantity("a", 4);
        assert!(cart.is_empty());

        // re-adding creates a fresh line, not a restored one
        cart.add_line(&p, 1).unwrap();
        assert_eq!(cart.lines()[0].quantity, 1);
    }

    #[test]
    fn test_set_quantity_overwrites() {
        let mut cart = Cart::new();
        cart.add_line(&product("a", 999, 10), 2).unwrap();

        cart.set_quantity("a", 7);
        assert_eq!(cart.total_quantity(), 7);
    }

    #[test]
    fn test_lines_keep_insertion_order() {
        let mut cart = Cart::new();
        cart.add_line(&product("a", 100, 5), 1).unwrap();
        cart.add_line(&product("b", 200, 5), 1).unwrap();
        cart.add_line(&product("a", 100, 5), 1).unwrap();

        let ids: Vec<&str> = cart.lines().iter().map(|l| l.product_id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn test_totals_formula() {
        // lines [(A, 100.00 × 2), (B, 50.00 × 1)] at 15% tax:
        // subtotal 250.00, tax 37.50, total 287.50
        let mut cart = Cart::new();
        cart.add_line(&product("a", 10_000, 10), 2).unwrap();
        cart.add_line(&product("b", 5_000, 10), 1).unwrap();

        let rate = TaxRate::from_bps(1500);
        assert_eq!(cart.subtotal_cents(), 25_000);
        assert_eq!(cart.tax_cents(rate), 3_750);
        assert_eq!(cart.total_cents(rate, 0), 28_750);

        // final total = subtotal + subtotal*rate - discount
        assert_eq!(cart.total_cents(rate, 750), 28_000);
    }

    #[test]
    fn test_clear() {
        let mut cart = Cart::new();
        cart.add_line(&product("a", 999, 10), 2).unwrap();
        assert!(!cart.is_empty());

        cart.clear();
        assert!(cart.is_empty());
        assert_eq!(cart.subtotal_cents(), 0);
    }

    #[test]
    fn test_quantity_limits() {
        let mut cart = Cart::new();
        let p = product("a", 999, 10);

        assert!(cart.add_line(&p, 1000).is_err());
        cart.add_line(&p, 900).unwrap();
        assert!(cart.add_line(&p, 100).is_err());
        // failed merge leaves the original quantity untouched
        assert_eq!(cart.total_quantity(), 900);
    }
}
