//! Employee update builder.

use chrono::NaiveDate;
use desk_core::entities::Salary;
use desk_core::enums::EmployeeStatus;
use desk_core::errors::CoreError;
use desk_core::inputs::{require, require_email, validate_salary};
use serde::{Deserialize, Serialize};

use super::double_option;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EmployeeUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub employee_code: Option<String>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub user_id: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub designation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_of_joining: Option<NaiveDate>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub date_of_birth: Option<Option<NaiveDate>>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub address: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<EmployeeStatus>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub salary: Option<Option<Salary>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub documents: Option<Vec<String>>,
}

impl EmployeeUpdate {
    /// # Errors
    ///
    /// Returns `CoreError::Validation` naming the first offending field.
    pub fn validate(&self) -> Result<(), CoreError> {
        let required = [
            ("employee_code", &self.employee_code),
            ("first_name", &self.first_name),
            ("last_name", &self.last_name),
            ("phone", &self.phone),
            ("designation", &self.designation),
            ("department", &self.department),
        ];
        for (field, value) in required {
            if let Some(value) = value {
                require(field, value)?;
            }
        }
        if let Some(email) = &self.email {
            require_email(email)?;
        }
        if let Some(Some(salary)) = &self.salary {
            validate_salary(salary)?;
        }
        Ok(())
    }
}

pub struct EmployeeUpdateBuilder(EmployeeUpdate);

impl EmployeeUpdateBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self(EmployeeUpdate::default())
    }

    #[must_use]
    pub fn employee_code(mut self, code: impl Into<String>) -> Self {
        self.0.employee_code = Some(code.into());
        self
    }

    #[must_use]
    pub fn user_id(mut self, user_id: Option<String>) -> Self {
        self.0.user_id = Some(user_id);
        self
    }

    #[must_use]
    pub fn first_name(mut self, first_name: impl Into<String>) -> Self {
        self.0.first_name = Some(first_name.into());
        self
    }

    #[must_use]
    pub fn last_name(mut self, last_name: impl Into<String>) -> Self {
        self.0.last_name = Some(last_name.into());
        self
    }

    #[must_use]
    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.0.email = Some(email.into());
        self
    }

    #[must_use]
    pub fn phone(mut self, phone: impl Into<String>) -> Self {
        self.0.phone = Some(phone.into());
        self
    }

    #[must_use]
    pub fn designation(mut self, designation: impl Into<String>) -> Self {
        self.0.designation = Some(designation.into());
        self
    }

    #[must_use]
    pub fn department(mut self, department: impl Into<String>) -> Self {
        self.0.department = Some(department.into());
        self
    }

    #[must_use]
    pub const fn status(mut self, status: EmployeeStatus) -> Self {
        self.0.status = Some(status);
        self
    }

    #[must_use]
    pub fn salary(mut self, salary: Option<Salary>) -> Self {
        self.0.salary = Some(salary);
        self
    }

    #[must_use]
    pub fn build(self) -> EmployeeUpdate {
        self.0
    }
}

impl Default for EmployeeUpdateBuilder {
    fn default() -> Self {
        Self::new()
    }
}
