//! Create-request payloads.
//!
//! These are the typed bodies accepted by `POST` routes and by the storage
//! layer's `create_*` methods. Each carries a `validate()` that enforces the
//! field rules before anything touches the database. Money fields accept
//! JSON numbers or strings.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::entities::Salary;
use crate::enums::{AttendanceStatus, EmployeeStatus, ExpenseCategory, OrderType, ProductStatus};
use crate::errors::CoreError;
use crate::money::ensure_amount;
use crate::permissions::{Permission, WILDCARD};

/// Minimum accepted password length.
pub const MIN_PASSWORD_LEN: usize = 6;

/// Reject blank strings.
///
/// # Errors
///
/// Returns `CoreError::Validation` naming `field`.
pub fn require(field: &str, value: &str) -> Result<(), CoreError> {
    if value.trim().is_empty() {
        return Err(CoreError::Validation(format!("{field} is required")));
    }
    Ok(())
}

/// # Errors
///
/// Returns `CoreError::Validation` when `value < min`.
pub fn require_count(field: &str, value: i64, min: i64) -> Result<(), CoreError> {
    if value < min {
        return Err(CoreError::Validation(format!(
            "{field} must be at least {min} (got {value})"
        )));
    }
    Ok(())
}

/// # Errors
///
/// Returns `CoreError::Validation` unless `value` looks like `local@domain`.
pub fn require_email(value: &str) -> Result<(), CoreError> {
    require("email", value)?;
    let (local, domain) = value
        .split_once('@')
        .ok_or_else(|| CoreError::Validation(format!("invalid email '{value}'")))?;
    if local.is_empty() || domain.is_empty() {
        return Err(CoreError::Validation(format!("invalid email '{value}'")));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Inventory
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewProduct {
    pub name: String,
    pub sku: String,
    #[serde(default)]
    pub description: Option<String>,
    pub category: String,
    #[serde(default)]
    pub supplier: Option<String>,
    pub price: Decimal,
    #[serde(default)]
    pub cost_price: Decimal,
    #[serde(default)]
    pub stock_level: i64,
    /// Falls back to the configured shop default when absent.
    #[serde(default)]
    pub min_stock_level: Option<i64>,
    #[serde(default)]
    pub status: ProductStatus,
    #[serde(default)]
    pub images: Vec<String>,
}

impl NewProduct {
    /// # Errors
    ///
    /// Returns `CoreError::Validation` naming the first offending field.
    pub fn validate(&self) -> Result<(), CoreError> {
        require("name", &self.name)?;
        require("sku", &self.sku)?;
        require("category", &self.category)?;
        ensure_amount("price", self.price)?;
        ensure_amount("cost_price", self.cost_price)?;
        require_count("stock_level", self.stock_level, 0)?;
        if let Some(min) = self.min_stock_level {
            require_count("min_stock_level", min, 0)?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// POS
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewTransaction {
    pub items: Vec<NewTransactionItem>,
    pub total_amount: Decimal,
    #[serde(default)]
    pub tax: Decimal,
    #[serde(default)]
    pub discount: Decimal,
    pub payment_method: String,
    #[serde(default)]
    pub customer_name: Option<String>,
    #[serde(default)]
    pub customer_phone: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewTransactionItem {
    pub product_id: String,
    /// Defaults to the product's name.
    #[serde(default)]
    pub name: Option<String>,
    pub quantity: i64,
    pub price: Decimal,
    /// Defaults to `price * quantity`.
    #[serde(default)]
    pub subtotal: Option<Decimal>,
}

impl NewTransaction {
    /// # Errors
    ///
    /// Returns `CoreError::Validation` naming the first offending field.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.items.is_empty() {
            return Err(CoreError::Validation(
                "a sale needs at least one item".into(),
            ));
        }
        for item in &self.items {
            require("items.product_id", &item.product_id)?;
            require_count("items.quantity", item.quantity, 1)?;
            ensure_amount("items.price", item.price)?;
            if let Some(subtotal) = item.subtotal {
                ensure_amount("items.subtotal", subtotal)?;
            }
        }
        ensure_amount("total_amount", self.total_amount)?;
        ensure_amount("tax", self.tax)?;
        ensure_amount("discount", self.discount)?;
        require("payment_method", &self.payment_method)
    }
}

// ---------------------------------------------------------------------------
// Orders
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewOrder {
    pub customer_name: String,
    pub customer_phone: String,
    pub items: Vec<NewOrderItem>,
    pub total_amount: Decimal,
    #[serde(default)]
    pub order_type: OrderType,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub payment_method: Option<String>,
    #[serde(default)]
    pub is_paid: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewOrderItem {
    pub product_id: String,
    #[serde(default)]
    pub name: Option<String>,
    pub quantity: i64,
    pub price: Decimal,
    #[serde(default)]
    pub custom_notes: Option<String>,
    #[serde(default)]
    pub subtotal: Option<Decimal>,
}

impl NewOrder {
    /// # Errors
    ///
    /// Returns `CoreError::Validation` naming the first offending field.
    pub fn validate(&self) -> Result<(), CoreError> {
        require("customer_name", &self.customer_name)?;
        require("customer_phone", &self.customer_phone)?;
        if self.items.is_empty() {
            return Err(CoreError::Validation(
                "an order needs at least one item".into(),
            ));
        }
        for item in &self.items {
            require("items.product_id", &item.product_id)?;
            require_count("items.quantity", item.quantity, 1)?;
            ensure_amount("items.price", item.price)?;
            if let Some(subtotal) = item.subtotal {
                ensure_amount("items.subtotal", subtotal)?;
            }
        }
        ensure_amount("total_amount", self.total_amount)
    }
}

// ---------------------------------------------------------------------------
// CRM
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewCustomer {
    pub name: String,
    pub phone: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl NewCustomer {
    /// # Errors
    ///
    /// Returns `CoreError::Validation` naming the first offending field.
    pub fn validate(&self) -> Result<(), CoreError> {
        require("name", &self.name)?;
        require("phone", &self.phone)?;
        if let Some(email) = &self.email {
            require_email(email)?;
        }
        Ok(())
    }
}

/// An enquiry as left by a prospective customer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewEnquiry {
    pub name: String,
    pub phone: String,
    pub message: String,
    pub category: String,
}

impl NewEnquiry {
    /// # Errors
    ///
    /// Returns `CoreError::Validation` naming the first blank field.
    pub fn validate(&self) -> Result<(), CoreError> {
        require("name", &self.name)?;
        require("phone", &self.phone)?;
        require("message", &self.message)?;
        require("category", &self.category)
    }
}

// ---------------------------------------------------------------------------
// HR
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewEmployee {
    pub employee_code: String,
    #[serde(default)]
    pub user_id: Option<String>,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub designation: String,
    pub department: String,
    pub date_of_joining: NaiveDate,
    #[serde(default)]
    pub date_of_birth: Option<NaiveDate>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub status: EmployeeStatus,
    #[serde(default)]
    pub salary: Option<Salary>,
    #[serde(default)]
    pub documents: Vec<String>,
}

impl NewEmployee {
    /// # Errors
    ///
    /// Returns `CoreError::Validation` naming the first offending field.
    pub fn validate(&self) -> Result<(), CoreError> {
        require("employee_code", &self.employee_code)?;
        require("first_name", &self.first_name)?;
        require("last_name", &self.last_name)?;
        require_email(&self.email)?;
        require("phone", &self.phone)?;
        require("designation", &self.designation)?;
        require("department", &self.department)?;
        if let Some(salary) = &self.salary {
            validate_salary(salary)?;
        }
        Ok(())
    }
}

/// # Errors
///
/// Returns `CoreError::Validation` for negative pay or a blank currency.
pub fn validate_salary(salary: &Salary) -> Result<(), CoreError> {
    ensure_amount("salary.base", salary.base)?;
    ensure_amount("salary.allowances", salary.allowances)?;
    require("salary.currency", &salary.currency)
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewAttendance {
    pub employee_id: String,
    /// Defaults to today (UTC).
    #[serde(default)]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub check_in: Option<DateTime<Utc>>,
    #[serde(default)]
    pub check_out: Option<DateTime<Utc>>,
    #[serde(default)]
    pub status: AttendanceStatus,
    #[serde(default)]
    pub note: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
}

impl NewAttendance {
    /// # Errors
    ///
    /// Returns `CoreError::Validation` for a missing employee or a check-out
    /// before check-in.
    pub fn validate(&self) -> Result<(), CoreError> {
        require("employee_id", &self.employee_id)?;
        if let (Some(check_in), Some(check_out)) = (self.check_in, self.check_out) {
            if check_out < check_in {
                return Err(CoreError::Validation(
                    "check_out must not be before check_in".into(),
                ));
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Finance
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewExpense {
    pub title: String,
    pub amount: Decimal,
    #[serde(default)]
    pub category: ExpenseCategory,
    /// Defaults to now.
    #[serde(default)]
    pub date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl NewExpense {
    /// # Errors
    ///
    /// Returns `CoreError::Validation` naming the first offending field.
    pub fn validate(&self) -> Result<(), CoreError> {
        require("title", &self.title)?;
        ensure_amount("amount", self.amount)
    }
}

// ---------------------------------------------------------------------------
// Access
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl NewUser {
    /// # Errors
    ///
    /// Returns `CoreError::Validation` naming the first offending field.
    pub fn validate(&self) -> Result<(), CoreError> {
        require("name", &self.name)?;
        require_email(&self.email)?;
        validate_password(&self.password)
    }
}

/// # Errors
///
/// Returns `CoreError::Validation` for passwords shorter than [`MIN_PASSWORD_LEN`].
pub fn validate_password(password: &str) -> Result<(), CoreError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(CoreError::Validation(format!(
            "password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewRole {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub permissions: Vec<String>,
}

impl NewRole {
    /// # Errors
    ///
    /// Returns `CoreError::Validation` for an empty name or an unknown
    /// permission string.
    pub fn validate(&self) -> Result<(), CoreError> {
        require("name", &self.name)?;
        validate_permissions(&self.permissions)
    }
}

/// Every entry must be `*` or a catalogue permission.
///
/// # Errors
///
/// Returns `CoreError::Validation` naming the first unknown permission.
pub fn validate_permissions(permissions: &[String]) -> Result<(), CoreError> {
    for p in permissions {
        let known = p == WILDCARD || Permission::ALL.iter().any(|k| k.as_str() == p);
        if !known {
            return Err(CoreError::Validation(format!("unknown permission '{p}'")));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn product() -> NewProduct {
        NewProduct {
            name: "Walnut Frame".into(),
            sku: "FRM-01".into(),
            category: "Frames".into(),
            price: dec("450"),
            ..NewProduct::default()
        }
    }

    fn sale_item(quantity: i64) -> NewTransactionItem {
        NewTransactionItem {
            product_id: "prd-00000001".into(),
            quantity,
            price: dec("10"),
            ..NewTransactionItem::default()
        }
    }

    #[test]
    fn valid_product_passes() {
        assert!(product().validate().is_ok());
    }

    #[test]
    fn product_without_sku_rejected() {
        let mut p = product();
        p.sku = "  ".into();
        let err = p.validate().unwrap_err();
        assert!(err.to_string().contains("sku"));
    }

    #[test]
    fn product_negative_stock_rejected() {
        let mut p = product();
        p.stock_level = -1;
        assert!(matches!(p.validate(), Err(CoreError::Validation(_))));
    }

    #[test]
    fn sale_needs_items() {
        let sale = NewTransaction {
            payment_method: "cash".into(),
            ..NewTransaction::default()
        };
        assert!(sale.validate().is_err());
    }

    #[test]
    fn sale_quantity_must_be_positive() {
        let sale = NewTransaction {
            items: vec![sale_item(0)],
            payment_method: "cash".into(),
            ..NewTransaction::default()
        };
        let err = sale.validate().unwrap_err();
        assert!(err.to_string().contains("quantity"));
    }

    #[test]
    fn sale_needs_payment_method() {
        let sale = NewTransaction {
            items: vec![sale_item(1)],
            total_amount: dec("10"),
            ..NewTransaction::default()
        };
        let err = sale.validate().unwrap_err();
        assert!(err.to_string().contains("payment_method"));
    }

    #[test]
    fn sale_accepts_numbers_for_money() {
        let sale: NewTransaction = serde_json::from_value(serde_json::json!({
            "items": [{"product_id": "prd-00000001", "quantity": 2, "price": 12.5}],
            "total_amount": "25",
            "payment_method": "card"
        }))
        .unwrap();
        assert!(sale.validate().is_ok());
        assert_eq!(sale.items[0].price, dec("12.5"));
        assert_eq!(sale.tax, Decimal::ZERO);
    }

    #[test]
    fn order_requires_customer_phone() {
        let order = NewOrder {
            customer_name: "Meera".into(),
            items: vec![NewOrderItem {
                product_id: "prd-00000001".into(),
                quantity: 1,
                price: dec("1"),
                ..NewOrderItem::default()
            }],
            ..NewOrder::default()
        };
        let err = order.validate().unwrap_err();
        assert!(err.to_string().contains("customer_phone"));
    }

    #[test]
    fn order_rejects_unknown_type() {
        let result: Result<NewOrder, _> = serde_json::from_value(serde_json::json!({
            "customer_name": "Meera",
            "customer_phone": "9123456780",
            "items": [],
            "total_amount": 0,
            "order_type": "wholesale"
        }));
        assert!(result.is_err());
    }

    #[test]
    fn attendance_checkout_before_checkin_rejected() {
        let now = Utc::now();
        let record = NewAttendance {
            employee_id: "emp-00000001".into(),
            check_in: Some(now),
            check_out: Some(now - chrono::Duration::hours(1)),
            ..NewAttendance::default()
        };
        assert!(record.validate().is_err());
    }

    #[test]
    fn user_email_and_password_checked() {
        let mut user = NewUser {
            name: "Asha".into(),
            email: "asha.example.com".into(),
            password: "hunter22".into(),
        };
        assert!(user.validate().is_err());
        user.email = "asha@example.com".into();
        assert!(user.validate().is_ok());
        user.password = "123".into();
        assert!(user.validate().is_err());
    }

    #[test]
    fn role_rejects_unknown_permission() {
        let role = NewRole {
            name: "CASHIER".into(),
            description: None,
            permissions: vec!["pos.access".into(), "pos.refund".into()],
        };
        let err = role.validate().unwrap_err();
        assert!(err.to_string().contains("pos.refund"));
    }

    #[test]
    fn role_accepts_wildcard() {
        let role = NewRole {
            name: "OWNER".into(),
            description: None,
            permissions: vec!["*".into()],
        };
        assert!(role.validate().is_ok());
    }

    #[test]
    fn expense_amount_non_negative() {
        let expense = NewExpense {
            title: "Rent".into(),
            amount: dec("-1"),
            ..NewExpense::default()
        };
        assert!(expense.validate().is_err());
    }

    #[test]
    fn enquiry_needs_every_field() {
        let mut enquiry = NewEnquiry {
            name: "Ravi".into(),
            phone: "9000000002".into(),
            message: "Do you frame canvases?".into(),
            category: "custom frame".into(),
        };
        assert!(enquiry.validate().is_ok());
        enquiry.message = "  ".into();
        let err = enquiry.validate().unwrap_err();
        assert!(err.to_string().contains("message"));
    }
}
