//! Product update builder.

use desk_core::enums::ProductStatus;
use desk_core::errors::CoreError;
use desk_core::inputs::{require, require_count};
use desk_core::money::{Decimal, ensure_amount};
use serde::{Deserialize, Serialize};

use super::double_option;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub description: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub supplier: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost_price: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stock_level: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_stock_level: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ProductStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<String>>,
}

impl ProductUpdate {
    /// Apply the create-time rules to the fields that are present.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::Validation` naming the first offending field.
    pub fn validate(&self) -> Result<(), CoreError> {
        if let Some(name) = &self.name {
            require("name", name)?;
        }
        if let Some(sku) = &self.sku {
            require("sku", sku)?;
        }
        if let Some(category) = &self.category {
            require("category", category)?;
        }
        if let Some(price) = self.price {
            ensure_amount("price", price)?;
        }
        if let Some(cost) = self.cost_price {
            ensure_amount("cost_price", cost)?;
        }
        if let Some(stock) = self.stock_level {
            require_count("stock_level", stock, 0)?;
        }
        if let Some(min) = self.min_stock_level {
            require_count("min_stock_level", min, 0)?;
        }
        Ok(())
    }
}

pub struct ProductUpdateBuilder(ProductUpdate);

impl ProductUpdateBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self(ProductUpdate::default())
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.0.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn sku(mut self, sku: impl Into<String>) -> Self {
        self.0.sku = Some(sku.into());
        self
    }

    #[must_use]
    pub fn description(mut self, description: Option<String>) -> Self {
        self.0.description = Some(description);
        self
    }

    #[must_use]
    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.0.category = Some(category.into());
        self
    }

    #[must_use]
    pub fn supplier(mut self, supplier: Option<String>) -> Self {
        self.0.supplier = Some(supplier);
        self
    }

    #[must_use]
    pub const fn price(mut self, price: Decimal) -> Self {
        self.0.price = Some(price);
        self
    }

    #[must_use]
    pub const fn cost_price(mut self, cost_price: Decimal) -> Self {
        self.0.cost_price = Some(cost_price);
        self
    }

    #[must_use]
    pub const fn stock_level(mut self, stock_level: i64) -> Self {
        self.0.stock_level = Some(stock_level);
        self
    }

    #[must_use]
    pub const fn min_stock_level(mut self, min_stock_level: i64) -> Self {
        self.0.min_stock_level = Some(min_stock_level);
        self
    }

    #[must_use]
    pub const fn status(mut self, status: ProductStatus) -> Self {
        self.0.status = Some(status);
        self
    }

    #[must_use]
    pub fn images(mut self, images: Vec<String>) -> Self {
        self.0.images = Some(images);
        self
    }

    #[must_use]
    pub fn build(self) -> ProductUpdate {
        self.0
    }
}

impl Default for ProductUpdateBuilder {
    fn default() -> Self {
        Self::new()
    }
}
