//! # Storefront Configuration
//!
//! Configuration is loaded from environment variables with fallback to
//! defaults, and is read-only afterwards.
//!
//! | Variable                        | Default    | Meaning                          |
//! |---------------------------------|------------|----------------------------------|
//! | `RENTSHELF_DATABASE_PATH`       | (unset)    | SQLite file; unset = in-memory   |
//! | `RENTSHELF_CURRENCY`            | `USD`      | Catalog and charge currency      |
//! | `RENTSHELF_DISPLAY_CURRENCY`    | `INR`      | Currency prices are shown in     |
//! | `RENTSHELF_DISPLAY_RATE`        | `83`       | Fixed catalog → display rate     |
//! | `RENTSHELF_RETURN_WINDOW_DAYS`  | `30`       | Days until a rental is due back  |
//! | `RENTSHELF_LOG`                 | `info`     | Log filter when `RUST_LOG` unset |

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use rentshelf_core::pricing::format_currency;
use rentshelf_core::{CoreResult, Money, RETURN_WINDOW_DAYS};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Storefront configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorefrontConfig {
    /// SQLite database file. `None` selects the in-memory stores.
    pub database_path: Option<PathBuf>,

    /// ISO 4217 code of catalog prices and payment captures.
    pub currency: String,

    /// ISO 4217 code prices are displayed in.
    pub display_currency: String,

    /// Multiplier from `currency` to `display_currency`.
    pub display_rate: Decimal,

    /// Days between order creation and the return due date.
    pub return_window_days: i64,

    /// Fallback tracing filter.
    pub log_level: String,
}

impl Default for StorefrontConfig {
    fn default() -> Self {
        StorefrontConfig {
            database_path: None,
            currency: "USD".to_string(),
            display_currency: "INR".to_string(),
            display_rate: Decimal::from(83),
            return_window_days: RETURN_WINDOW_DAYS,
            log_level: "info".to_string(),
        }
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = StorefrontConfig::default();

        let config = StorefrontConfig {
            database_path: lookup("RENTSHELF_DATABASE_PATH")
                .filter(|p| !p.trim().is_empty())
                .map(PathBuf::from),

            currency: lookup("RENTSHELF_CURRENCY")
                .map(|c| c.trim().to_uppercase())
                .unwrap_or(defaults.currency),

            display_currency: lookup("RENTSHELF_DISPLAY_CURRENCY")
                .map(|c| c.trim().to_uppercase())
                .unwrap_or(defaults.display_currency),

            display_rate: match lookup("RENTSHELF_DISPLAY_RATE") {
                Some(raw) => Decimal::from_str(raw.trim())
                    .map_err(|_| ConfigError::InvalidValue("RENTSHELF_DISPLAY_RATE".to_string()))?,
                None => defaults.display_rate,
            },

            return_window_days: match lookup("RENTSHELF_RETURN_WINDOW_DAYS") {
                Some(raw) => raw.trim().parse().map_err(|_| {
                    ConfigError::InvalidValue("RENTSHELF_RETURN_WINDOW_DAYS".to_string())
                })?,
                None => defaults.return_window_days,
            },

            log_level: lookup("RENTSHELF_LOG").unwrap_or(defaults.log_level),
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !is_known_currency(&self.currency) {
            return Err(ConfigError::InvalidValue("RENTSHELF_CURRENCY".to_string()));
        }
        if !is_known_currency(&self.display_currency) {
            return Err(ConfigError::InvalidValue(
                "RENTSHELF_DISPLAY_CURRENCY".to_string(),
            ));
        }
        if self.display_rate <= Decimal::ZERO {
            return Err(ConfigError::InvalidValue("RENTSHELF_DISPLAY_RATE".to_string()));
        }
        if self.return_window_days <= 0 {
            return Err(ConfigError::InvalidValue(
                "RENTSHELF_RETURN_WINDOW_DAYS".to_string(),
            ));
        }
        Ok(())
    }

    /// Formats an amount in the catalog currency.
    pub fn format_price(&self, amount: Money) -> CoreResult<String> {
        format_currency(amount, &self.currency)
    }

    /// Converts an amount at the fixed display rate and formats it in the
    /// display currency. Stored amounts are never converted.
    pub fn display_price(&self, amount: Money) -> CoreResult<String> {
        format_currency(amount.convert(self.display_rate)?, &self.display_currency)
    }
}

fn is_known_currency(code: &str) -> bool {
    format_currency(Money::ZERO, code).is_ok()
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<StorefrontConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        StorefrontConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[]).unwrap();
        assert!(config.database_path.is_none());
        assert_eq!(config.currency, "USD");
        assert_eq!(config.display_currency, "INR");
        assert_eq!(config.display_rate, dec!(83));
        assert_eq!(config.return_window_days, 30);
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("RENTSHELF_DATABASE_PATH", "/tmp/shelf.db"),
            ("RENTSHELF_CURRENCY", "eur"),
            ("RENTSHELF_DISPLAY_RATE", "1.5"),
            ("RENTSHELF_RETURN_WINDOW_DAYS", "14"),
        ])
        .unwrap();
        assert_eq!(config.database_path, Some(PathBuf::from("/tmp/shelf.db")));
        assert_eq!(config.currency, "EUR");
        assert_eq!(config.display_rate, dec!(1.5));
        assert_eq!(config.return_window_days, 14);
    }

    #[test]
    fn test_invalid_values() {
        for (key, value) in [
            ("RENTSHELF_DISPLAY_RATE", "abc"),
            ("RENTSHELF_DISPLAY_RATE", "-1"),
            ("RENTSHELF_RETURN_WINDOW_DAYS", "0"),
            ("RENTSHELF_RETURN_WINDOW_DAYS", "thirty"),
            ("RENTSHELF_CURRENCY", "XYZ"),
        ] {
            let err = load(&[(key, value)]).unwrap_err();
            assert_eq!(err.to_string(), format!("Invalid value for {key}"));
        }
    }

    #[test]
    fn test_format_price() {
        let config = load(&[]).unwrap();
        assert_eq!(config.format_price(Money::from_major(41)).unwrap(), "$41.00");
    }

    #[test]
    fn test_display_price_converts() {
        let config = load(&[("RENTSHELF_DISPLAY_CURRENCY", "USD"), ("RENTSHELF_DISPLAY_RATE", "2")]).unwrap();
        assert_eq!(config.display_price(Money::new(dec!(10.25))).unwrap(), "$20.50");
    }
}
