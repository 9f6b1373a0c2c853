//! Order update builder.
//!
//! Status is not here: it moves only through `update_order_status`.

use chrono::NaiveDate;
use desk_core::enums::OrderType;
use desk_core::errors::CoreError;
use desk_core::inputs::require;
use serde::{Deserialize, Serialize};

use super::double_option;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrderUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_phone: Option<String>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub due_date: Option<Option<NaiveDate>>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub notes: Option<Option<String>>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub payment_method: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_paid: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_type: Option<OrderType>,
}

impl OrderUpdate {
    /// # Errors
    ///
    /// Returns `CoreError::Validation` for a blank customer name or phone.
    pub fn validate(&self) -> Result<(), CoreError> {
        if let Some(name) = &self.customer_name {
            require("customer_name", name)?;
        }
        if let Some(phone) = &self.customer_phone {
            require("customer_phone", phone)?;
        }
        Ok(())
    }
}

pub struct OrderUpdateBuilder(OrderUpdate);

impl OrderUpdateBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self(OrderUpdate::default())
    }

    #[must_use]
    pub fn customer_name(mut self, name: impl Into<String>) -> Self {
        self.0.customer_name = Some(name.into());
        self
    }

    #[must_use]
    pub fn customer_phone(mut self, phone: impl Into<String>) -> Self {
        self.0.customer_phone = Some(phone.into());
        self
    }

    #[must_use]
    pub const fn due_date(mut self, due_date: Option<NaiveDate>) -> Self {
        self.0.due_date = Some(due_date);
        self
    }

    #[must_use]
    pub fn notes(mut self, notes: Option<String>) -> Self {
        self.0.notes = Some(notes);
        self
    }

    #[must_use]
    pub fn payment_method(mut self, payment_method: Option<String>) -> Self {
        self.0.payment_method = Some(payment_method);
        self
    }

    #[must_use]
    pub const fn is_paid(mut self, is_paid: bool) -> Self {
        self.0.is_paid = Some(is_paid);
        self
    }

    #[must_use]
    pub const fn order_type(mut self, order_type: OrderType) -> Self {
        self.0.order_type = Some(order_type);
        self
    }

    #[must_use]
    pub fn build(self) -> OrderUpdate {
        self.0
    }
}

impl Default for OrderUpdateBuilder {
    fn default() -> Self {
        Self::new()
    }
}
