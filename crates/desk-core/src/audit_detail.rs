//! Typed audit detail payloads.
//!
//! Each audit action can carry a structured `detail` JSON blob. These types
//! give the common shapes a schema.

use rust_decimal::Decimal;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Detail for `AuditAction::StatusChanged`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct StatusChangedDetail {
    pub from: String,
    pub to: String,
}

/// Detail for `AuditAction::StockAdjusted`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct StockAdjustedDetail {
    pub delta: i64,
    pub new_level: i64,
    /// Entity that caused the movement (a sale, an order), if any.
    pub reference: Option<String>,
}

/// Detail for `AuditAction::Created` on transactions and orders.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct SaleDetail {
    #[schemars(with = "String")]
    pub total_amount: Decimal,
    pub items: usize,
    pub customer_phone: Option<String>,
}
