use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A completed point-of-sale checkout.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Transaction {
    pub id: String,
    pub items: Vec<TransactionItem>,
    #[schemars(with = "String")]
    pub total_amount: Decimal,
    #[schemars(with = "String")]
    pub tax: Decimal,
    #[schemars(with = "String")]
    pub discount: Decimal,
    /// Sum of `(price - cost_price) * quantity` over all lines, computed at sale time.
    #[schemars(with = "String")]
    pub profit: Decimal,
    pub payment_method: String,
    pub customer_name: Option<String>,
    pub customer_phone: Option<String>,
    pub notes: Option<String>,
    pub created_by: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// One line of a sale.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct TransactionItem {
    pub product_id: String,
    pub name: String,
    pub quantity: i64,
    #[schemars(with = "String")]
    pub price: Decimal,
    #[schemars(with = "String")]
    pub subtotal: Decimal,
}
