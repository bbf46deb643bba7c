//! # Settings Repository
//!
//! Key/value store configuration.
//!
//! ## Known Keys
//! ```text
//! store_name      │ Display name on receipts
//! store_address   │ Optional, on receipts when set
//! store_phone     │ Optional, on receipts when set
//! tax_rate        │ Fraction as text, e.g. "0.15" for 15%
//! currency        │ Currency code, e.g. "SAR"
//! receipt_footer  │ Closing line on receipts
//! ```
//!
//! Settings are read per operation, never cached in a process-wide
//! singleton. A malformed value falls back to its default with a warning
//! rather than failing the operation that needed it.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::warn;

use crate::error::DbResult;
use souq_core::{StoreConfig, TaxRate};

/// Repository for store settings.
#[derive(Debug, Clone)]
pub struct SettingsRepository {
    pool: SqlitePool,
}

impl SettingsRepository {
    /// Creates a new SettingsRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SettingsRepository { pool }
    }

    /// Gets a setting value by key.
    pub async fn get(&self, key: &str) -> DbResult<Option<String>> {
        let value: Option<String> =
            sqlx::query_scalar("SELECT value FROM settings WHERE key = ?1")
                .bind(key)
                .fetch_optional(&self.pool)
                .await?;

        Ok(value)
    }

    /// Sets a setting value, inserting or overwriting.
    pub async fn set(&self, key: &str, value: &str) -> DbResult<()> {
        let now = Utc::now();

        sqlx::query(
            r#"
            INSERT INTO settings (key, value, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(key) DO UPDATE SET value = ?2, updated_at = ?3
            "#,
        )
        .bind(key)
        .bind(value)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Lists all settings as (key, value) pairs.
    pub async fn all(&self) -> DbResult<Vec<(String, String)>> {
        let rows: Vec<(String, String)> =
            sqlx::query_as("SELECT key, value FROM settings ORDER BY key")
                .fetch_all(&self.pool)
                .await?;

        Ok(rows)
    }

    /// Loads the assembled store configuration.
    ///
    /// Missing keys take their [`StoreConfig`] defaults. A `tax_rate` value
    /// that doesn't parse as a fraction falls back to the default rate with
    /// a warning.
    pub async fn store_config(&self) -> DbResult<StoreConfig> {
        let mut config = StoreConfig::default();

        for (key, value) in self.all().await? {
            match key.as_str() {
                "store_name" => config.store_name = value,
                "store_address" => config.store_address = value,
                "store_phone" => config.store_phone = value,
                "currency" => config.currency = value,
                "receipt_footer" => config.receipt_footer = value,
                "tax_rate" => match value.parse::<f64>() {
                    Ok(fraction) if (0.0..=1.0).contains(&fraction) => {
                        config.tax_rate = TaxRate::from_fraction(fraction);
                    }
                    _ => {
                        warn!(value = %value, "Malformed tax_rate setting, using default");
                    }
                },
                _ => {}
            }
        }

        Ok(config)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
