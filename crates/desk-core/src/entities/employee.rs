use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::EmployeeStatus;

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Employee {
    pub id: String,
    /// Human-facing code such as `EMP001`.
    pub employee_code: String,
    /// Link to the system user this employee logs in as.
    pub user_id: Option<String>,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub designation: String,
    pub department: String,
    pub date_of_joining: NaiveDate,
    pub date_of_birth: Option<NaiveDate>,
    pub address: Option<String>,
    pub status: EmployeeStatus,
    pub salary: Option<Salary>,
    pub documents: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Employee {
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Monthly pay, stored as a JSON column on the employee row.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Salary {
    #[schemars(with = "String")]
    pub base: Decimal,
    #[schemars(with = "String")]
    #[serde(default)]
    pub allowances: Decimal,
    #[serde(default = "default_currency")]
    pub currency: String,
}

fn default_currency() -> String {
    "INR".to_string()
}
