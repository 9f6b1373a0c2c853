use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::{OrderStatus, OrderType};

/// A customer order, possibly custom-made, tracked through production.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Order {
    pub id: String,
    pub customer_name: String,
    pub customer_phone: String,
    pub items: Vec<OrderItem>,
    #[schemars(with = "String")]
    pub total_amount: Decimal,
    pub status: OrderStatus,
    pub order_type: OrderType,
    pub due_date: Option<NaiveDate>,
    pub notes: Option<String>,
    pub payment_method: Option<String>,
    pub is_paid: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct OrderItem {
    pub product_id: String,
    pub name: String,
    pub quantity: i64,
    #[schemars(with = "String")]
    pub price: Decimal,
    pub custom_notes: Option<String>,
    #[schemars(with = "String")]
    pub subtotal: Decimal,
}
