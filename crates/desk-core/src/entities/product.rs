use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::ProductStatus;

/// A sellable item with its stock level.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Product {
    pub id: String,
    pub name: String,
    pub sku: String,
    pub description: Option<String>,
    pub category: String,
    pub supplier: Option<String>,
    #[schemars(with = "String")]
    pub price: Decimal,
    #[schemars(with = "String")]
    pub cost_price: Decimal,
    pub stock_level: i64,
    pub min_stock_level: i64,
    pub status: ProductStatus,
    pub images: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// At or below the configured minimum.
    #[must_use]
    pub const fn is_low_stock(&self) -> bool {
        self.stock_level <= self.min_stock_level
    }
}
