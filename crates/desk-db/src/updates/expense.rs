//! Expense update builder.

use chrono::{DateTime, Utc};
use desk_core::enums::ExpenseCategory;
use desk_core::errors::CoreError;
use desk_core::inputs::require;
use desk_core::money::{Decimal, ensure_amount};
use serde::{Deserialize, Serialize};

use super::double_option;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExpenseUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<ExpenseCategory>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<DateTime<Utc>>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub notes: Option<Option<String>>,
}

impl ExpenseUpdate {
    /// # Errors
    ///
    /// Returns `CoreError::Validation` for a blank title or negative amount.
    pub fn validate(&self) -> Result<(), CoreError> {
        if let Some(title) = &self.title {
            require("title", title)?;
        }
        if let Some(amount) = self.amount {
            ensure_amount("amount", amount)?;
        }
        Ok(())
    }
}

pub struct ExpenseUpdateBuilder(ExpenseUpdate);

impl ExpenseUpdateBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self(ExpenseUpdate::default())
    }

    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.0.title = Some(title.into());
        self
    }

    #[must_use]
    pub const fn amount(mut self, amount: Decimal) -> Self {
        self.0.amount = Some(amount);
        self
    }

    #[must_use]
    pub const fn category(mut self, category: ExpenseCategory) -> Self {
        self.0.category = Some(category);
        self
    }

    #[must_use]
    pub const fn date(mut self, date: DateTime<Utc>) -> Self {
        self.0.date = Some(date);
        self
    }

    #[must_use]
    pub fn notes(mut self, notes: Option<String>) -> Self {
        self.0.notes = Some(notes);
        self
    }

    #[must_use]
    pub fn build(self) -> ExpenseUpdate {
        self.0
    }
}

impl Default for ExpenseUpdateBuilder {
    fn default() -> Self {
        Self::new()
    }
}
