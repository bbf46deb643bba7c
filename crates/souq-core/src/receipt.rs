//! # Receipt Formatting
//!
//! Turns a committed sale into plain, line-oriented receipt text.
//!
//! The core's obligation ends at the text: delivery is a fire-and-forget
//! call on the printer port, and a delivery failure never invalidates the
//! sale.
//!
//! ## Layout (32 columns, thermal 58mm)
//! ```text
//! ================================
//!          Souq Mobile
//!     King Fahd Rd, Riyadh
//!         0112345678
//! ================================
//! Invoice: INV-000042
//! Date:    2026-08-23 14:30
//! Customer: Ahmed
//! Phone:    0555555555
//! --------------------------------
//! Galaxy S24
//!   2 x 100.00          200.00
//! USB-C Cable
//!   1 x 50.00            50.00
//! --------------------------------
//! Subtotal:         250.00 SAR
//! Tax (15%):         37.50 SAR
//! TOTAL:            287.50 SAR
//! Payment: cash
//! ================================
//! Thank you for shopping with us
//! ```

use crate::money::Money;
use crate::types::{Sale, SaleLine, StoreConfig};

/// Receipt width in characters.
const WIDTH: usize = 32;

/// Formats a committed sale as receipt text.
///
/// Uses the line snapshots and the sale's stored totals; nothing is
/// recomputed from the catalog.
pub fn format_receipt(sale: &Sale, lines: &[SaleLine], config: &StoreConfig) -> String {
    let mut out = String::new();
    let rule = "=".repeat(WIDTH);
    let thin_rule = "-".repeat(WIDTH);

    // Header
    out.push_str(&rule);
    out.push('\n');
    out.push_str(&center(&config.store_name));
    out.push('\n');
    if !config.store_address.is_empty() {
        out.push_str(&center(&config.store_address));
        out.push('\n');
    }
    if !config.store_phone.is_empty() {
        out.push_str(&center(&config.store_phone));
        out.push('\n');
    }
    out.push_str(&rule);
    out.push('\n');

    out.push_str(&format!("Invoice: {}\n", sale.sale_number));
    out.push_str(&format!(
        "Date:    {}\n",
        sale.sale_date.format("%Y-%m-%d %H:%M")
    ));
    if let Some(name) = &sale.customer_name {
        out.push_str(&format!("Customer: {}\n", name));
    }
    if let Some(phone) = &sale.customer_phone {
        out.push_str(&format!("Phone:    {}\n", phone));
    }
    out.push_str(&thin_rule);
    out.push('\n');

    // Line items: name on its own line, quantities and totals below
    for line in lines {
        out.push_str(&line.name_snapshot);
        out.push('\n');
        let detail = format!(
            "  {} x {}",
            line.quantity,
            Money::from_cents(line.unit_price_cents)
        );
        let total = format!("{}", line.line_total());
        out.push_str(&pad_between(&detail, &total));
        out.push('\n');
    }
    out.push_str(&thin_rule);
    out.push('\n');

    // Totals
    out.push_str(&amount_row(
        "Subtotal:",
        Money::from_cents(sale.subtotal_cents),
        &config.currency,
    ));
    out.push_str(&amount_row(
        &format!("Tax ({}%):", trim_pct(config.tax_rate.percentage())),
        Money::from_cents(sale.tax_cents),
        &config.currency,
    ));
    if sale.discount_cents > 0 {
        out.push_str(&amount_row(
            "Discount:",
            Money::from_cents(-sale.discount_cents),
            &config.currency,
        ));
    }
    out.push_str(&amount_row(
        "TOTAL:",
        Money::from_cents(sale.total_cents),
        &config.currency,
    ));
    out.push_str(&format!("Payment: {}\n", sale.payment_method));

    if let Some(notes) = &sale.notes {
        out.push_str(&thin_rule);
        out.push('\n');
        out.push_str(notes);
        out.push('\n');
    }

    // Footer
    out.push_str(&rule);
    out.push('\n');
    if !config.receipt_footer.is_empty() {
        out.push_str(&center(&config.receipt_footer));
        out.push('\n');
    }

    out
}

/// Centers text within the receipt width (text wider than the receipt is
/// left as-is).
fn center(text: &str) -> String {
    let len = text.chars().count();
    if len >= WIDTH {
        return text.to_string();
    }
    let pad = (WIDTH - len) / 2;
    format!("{}{}", " ".repeat(pad), text)
}

/// Lays out `left` and `right` on one line with the gap padded.
fn pad_between(left: &str, right: &str) -> String {
    let used = left.chars().count() + right.chars().count();
    if used >= WIDTH {
        return format!("{} {}", left, right);
    }
    format!("{}{}{}", left, " ".repeat(WIDTH - used), right)
}

/// A right-aligned amount row like `Subtotal:         250.00 SAR`.
fn amount_row(label: &str, amount: Money, currency: &str) -> String {
    let value = format!("{} {}", amount, currency);
    let mut row = pad_between(label, &value);
    row.push('\n');
    row
}

/// Drops a trailing `.0`/`.00` from a percentage for display: 15, 8.25.
fn trim_pct(pct: f64) -> String {
    let s = format!("{:.2}", pct);
    s.trim_end_matches('0').trim_end_matches('.').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PaymentMethod;
    use chrono::{TimeZone, Utc};

    fn sample_sale() -> Sale {
        let date = Utc.with_ymd_and_hms(2026, 8, 23, 14, 30, 0).unwrap();
        Sale {
            id: "s1".to_string(),
            sale_number: "INV-000042".to_string(),
            subtotal_cents: 25_000,
            tax_cents: 3_750,
            discount_cents: 0,
            total_cents: 28_750,
            payment_method: PaymentMethod::Cash,
            sale_date: date,
            customer_name: None,
            customer_phone: None,
            notes: None,
            stock_applied: true,
            stock_flagged: false,
            created_at: date,
        }
    }

    fn sample_lines() -> Vec<SaleLine> {
        let date = Utc.with_ymd_and_hms(2026, 8, 23, 14, 30, 0).unwrap();
        vec![
            SaleLine {
                id: "l1".to_string(),
                sale_id: "s1".to_string(),
                product_id: "p1".to_string(),
                name_snapshot: "Galaxy S24".to_string(),
                unit_price_cents: 10_000,
                quantity: 2,
                line_total_cents: 20_000,
                stock_applied: true,
                created_at: date,
            },
            SaleLine {
                id: "l2".to_string(),
                sale_id: "s1".to_string(),
                product_id: "p2".to_string(),
                name_snapshot: "USB-C Cable".to_string(),
                unit_price_cents: 5_000,
                quantity: 1,
                line_total_cents: 5_000,
                stock_applied: true,
                created_at: date,
            },
        ]
    }

    #[test]
    fn test_receipt_contains_all_parts() {
        let config = StoreConfig::default();
        let receipt = format_receipt(&sample_sale(), &sample_lines(), &config);

        assert!(receipt.contains("Souq Mobile"));
        assert!(receipt.contains("Invoice: INV-000042"));
        assert!(receipt.contains("2026-08-23 14:30"));
        assert!(receipt.contains("Galaxy S24"));
        assert!(receipt.contains("2 x 100.00"));
        assert!(receipt.contains("USB-C Cable"));
        assert!(receipt.contains("250.00 SAR"));
        assert!(receipt.contains("Tax (15%):"));
        assert!(receipt.contains("37.50 SAR"));
        assert!(receipt.contains("287.50 SAR"));
        assert!(receipt.contains("Payment: cash"));
        assert!(receipt.contains("Thank you for shopping with us"));
    }

    #[test]
    fn test_receipt_customer_block_is_optional() {
        let config = StoreConfig::default();
        let receipt = format_receipt(&sample_sale(), &sample_lines(), &config);
        assert!(!receipt.contains("Customer:"));

        let mut sale = sample_sale();
        sale.customer_name = Some("Ahmed".to_string());
        sale.customer_phone = Some("0555555555".to_string());
        let receipt = format_receipt(&sale, &sample_lines(), &config);
        assert!(receipt.contains("Customer: Ahmed"));
        assert!(receipt.contains("Phone:    0555555555"));
    }

    #[test]
    fn test_receipt_discount_row_only_when_nonzero() {
        let config = StoreConfig::default();
        let receipt = format_receipt(&sample_sale(), &sample_lines(), &config);
        assert!(!receipt.contains("Discount:"));

        let mut sale = sample_sale();
        sale.discount_cents = 750;
        sale.total_cents = 28_000;
        let receipt = format_receipt(&sale, &sample_lines(), &config);
        assert!(receipt.contains("Discount:"));
        assert!(receipt.contains("-7.50 SAR"));
        assert!(receipt.contains("280.00 SAR"));
    }

    #[test]
    fn test_trim_pct() {
        assert_eq!(trim_pct(15.0), "15");
        assert_eq!(trim_pct(8.25), "8.25");
        assert_eq!(trim_pct(8.5), "8.5");
    }
}
