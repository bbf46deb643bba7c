//! # Seed Data Generator
//!
//! Populates the database with test products for development.
//!
//! ## Usage
//! ```bash
//! # Generate 200 products (default)
//! cargo run -p souq-db --bin seed
//!
//! # Generate custom amount
//! cargo run -p souq-db --bin seed -- --count 1000
//!
//! # Specify database path
//! cargo run -p souq-db --bin seed -- --db ./data/souq.db
//! ```
//!
//! ## Generated Products
//! Creates phone-store product data across categories:
//! - Phones (flagship and budget handsets)
//! - Accessories (cases, cables, chargers)
//! - Audio (earbuds, headphones, speakers)
//! - Tablets and wearables
//!
//! Each product has a deterministic pseudo-random price, cost, and stock
//! level, so repeated runs produce the same catalog.

use chrono::Utc;
use std::env;

use souq_core::Product;
use souq_db::{Database, DbConfig};
use uuid::Uuid;

/// Product families for realistic test data
const CATEGORIES: &[(&str, &[&str])] = &[
    (
        "PHN",
        &[
            "Galaxy S24",
            "Galaxy S24 Ultra",
            "Galaxy A55",
            "Galaxy A15",
            "iPhone 15",
            "iPhone 15 Pro",
            "iPhone 14",
            "iPhone SE",
            "Pixel 8",
            "Pixel 8a",
            "Redmi Note 13",
            "Redmi 13C",
            "Poco X6",
            "Honor X9b",
            "Nokia G42",
        ],
    ),
    (
        "ACC",
        &[
            "Clear Case",
            "Leather Case",
            "Rugged Case",
            "Tempered Glass",
            "Privacy Screen",
            "USB-C Cable",
            "Lightning Cable",
            "Car Charger",
            "Wall Charger 25W",
            "Wall Charger 45W",
            "Wireless Charger",
            "Power Bank 10000",
            "Power Bank 20000",
            "SIM Ejector Tool",
            "Phone Stand",
        ],
    ),
    (
        "AUD",
        &[
            "Galaxy Buds FE",
            "Galaxy Buds 2 Pro",
            "AirPods 3",
            "AirPods Pro 2",
            "Redmi Buds 5",
            "Soundcore Life P2",
            "JBL Tune 510BT",
            "JBL Go 3",
            "Sony WH-CH520",
            "Wired Earphones",
        ],
    ),
    (
        "TAB",
        &[
            "Galaxy Tab A9",
            "Galaxy Tab S9 FE",
            "iPad 10th Gen",
            "iPad Air",
            "Redmi Pad SE",
            "Galaxy Watch 6",
            "Mi Band 8",
            "Apple Watch SE",
        ],
    ),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .init();

    // Parse command line arguments
    let args: Vec<String> = env::args().collect();

    let mut count: usize = 200;
    let mut db_path = String::from("./souq_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--count" | "-c" => {
                if i + 1 < args.len() {
                    count = args[i + 1].parse().unwrap_or(200);
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Souq POS Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --count <N>    Number of products to generate (default: 200)");
                println!("  -d, --db <PATH>    Database file path (default: ./souq_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Souq POS Seed Data Generator");
    println!("===============================");
    println!("Database: {}", db_path);
    println!("Products: {}", count);
    println!();

    // Connect to database
    let config = DbConfig::new(&db_path);
    let db = Database::new(config).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    // Check existing products
    let existing = db.products().count_active().await?;
    if existing > 0 {
        println!("⚠ Database already has {} products", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    // Categories first: products carry a foreign key to them
    for (code, _) in CATEGORIES {
        sqlx::query("INSERT OR IGNORE INTO categories (id, name, created_at) VALUES (?1, ?2, ?3)")
            .bind(code)
            .bind(category_name(code))
            .bind(Utc::now())
            .execute(db.pool())
            .await?;
    }
    println!("✓ Categories created");

    // Generate products
    println!();
    println!("Generating products...");

    let mut generated = 0;
    let start = std::time::Instant::now();

    'outer: for (category_idx, (category_code, names)) in CATEGORIES.iter().enumerate() {
        // cycle through colors/variants until the count is reached
        for variant in 0..((count / names.len()) + 1) {
            for (product_idx, name) in names.iter().enumerate() {
                if generated >= count {
                    break 'outer;
                }

                let product = generate_product(
                    category_code,
                    name,
                    variant,
                    category_idx * 1000 + variant * 100 + product_idx,
                );

                if let Err(e) = db.products().insert(&product).await {
                    eprintln!("Failed to insert {}: {}", product.name, e);
                    continue;
                }

                generated += 1;

                if generated % 100 == 0 {
                    println!("  Generated {} products...", generated);
                }
            }
        }
    }

    let elapsed = start.elapsed();
    println!();
    println!("✓ Generated {} products in {:?}", generated, elapsed);

    let low = db.products().low_stock().await?;
    println!("  Low-stock products: {}", low.len());

    println!();
    println!("✓ Seed complete!");

    Ok(())
}

/// Display name for a category code.
fn category_name(code: &str) -> &'static str {
    match code {
        "PHN" => "Phones",
        "ACC" => "Accessories",
        "AUD" => "Audio",
        "TAB" => "Tablets & Wearables",
        _ => "Other",
    }
}

/// Variant suffixes appended past the first pass through the name list.
const VARIANTS: &[&str] = &["", " Black", " White", " Blue", " Green", " 256GB"];

/// Generates a single product with deterministic pseudo-random data.
fn generate_product(category: &str, name: &str, variant: usize, seed: usize) -> Product {
    let now = Utc::now();

    let suffix = VARIANTS[variant % VARIANTS.len()];
    let full_name = format!("{}{}", name, suffix);

    // Barcode (EAN-13 format, not a valid checksum)
    let barcode = Some(format!("628{:010}", seed));

    // Price: accessories 15.00-95.00, everything else 400.00-3600.00
    let price_cents = if category == "ACC" {
        1_500 + ((seed * 37) % 8_000) as i64
    } else {
        40_000 + ((seed * 997) % 320_000) as i64
    };

    // Cost at 60-80% of price
    let cost_pct = 60 + (seed % 20) as i64;
    let cost_cents = price_cents * cost_pct / 100;

    // Stock 0-30, reorder threshold 2-6
    let stock_quantity = (seed % 31) as i64;
    let min_stock_level = 2 + (seed % 5) as i64;

    Product {
        id: Uuid::new_v4().to_string(),
        name: full_name,
        barcode,
        category_id: Some(category.to_string()),
        price_cents,
        cost_cents,
        stock_quantity,
        min_stock_level,
        is_active: true,
        created_at: now,
        updated_at: now,
    }
}
