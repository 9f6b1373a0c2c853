//! Shop-level settings used in messages and inventory defaults.

use serde::{Deserialize, Serialize};

fn default_currency_symbol() -> String {
    "₹".to_string()
}

const fn default_min_stock() -> i64 {
    5
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BusinessConfig {
    /// Display name of the shop.
    #[serde(default)]
    pub name: String,

    /// Prefix for amounts in notifications and CLI output.
    #[serde(default = "default_currency_symbol")]
    pub currency_symbol: String,

    /// `min_stock_level` for products created without one.
    #[serde(default = "default_min_stock")]
    pub default_min_stock: i64,
}

impl Default for BusinessConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            currency_symbol: default_currency_symbol(),
            default_min_stock: default_min_stock(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_correct() {
        let config = BusinessConfig::default();
        assert!(config.name.is_empty());
        assert_eq!(config.currency_symbol, "₹");
        assert_eq!(config.default_min_stock, 5);
    }
}
