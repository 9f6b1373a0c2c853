//! Response types returned as JSON by the API and the `desk` CLI.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::entities::User;
use crate::enums::ExpenseCategory;

/// Revenue, expense, and profit totals over all recorded activity.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct FinancialSummary {
    /// Sum of POS transaction totals.
    #[schemars(with = "String")]
    pub pos_revenue: Decimal,
    /// Sum of totals of paid orders.
    #[schemars(with = "String")]
    pub order_revenue: Decimal,
    #[schemars(with = "String")]
    pub total_revenue: Decimal,
    #[schemars(with = "String")]
    pub total_expenses: Decimal,
    /// `total_revenue - total_expenses`.
    #[schemars(with = "String")]
    pub net_profit: Decimal,
    /// Sum of per-sale profit (price minus cost) over POS transactions.
    #[schemars(with = "String")]
    pub gross_profit: Decimal,
    #[schemars(with = "BTreeMap<String, String>")]
    pub expense_breakdown: BTreeMap<ExpenseCategory, Decimal>,
}

/// Response from `POST /auth/login`.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct LoginResponse {
    pub token: String,
    pub user: User,
}

/// Response from `GET /notifications/unread-count`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct UnreadCount {
    pub count: i64,
}

/// Response from every `DELETE` route.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct DeletedResponse {
    pub id: String,
    pub deleted: bool,
}

impl DeletedResponse {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            deleted: true,
        }
    }
}
