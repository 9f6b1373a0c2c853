//! Status enums, categories, entity types, and audit actions for Shopdesk.
//!
//! All enums use `snake_case` serialization via `#[serde(rename_all = "snake_case")]`,
//! and the same string is what gets stored in SQL. `OrderStatus` carries the
//! only state machine in the system and exposes `allowed_next_states()` to
//! enforce valid transitions at the application layer.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// ProductStatus
// ---------------------------------------------------------------------------

/// Catalogue status of a product.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum ProductStatus {
    #[default]
    Active,
    OutOfStock,
    Discontinued,
}

impl ProductStatus {
    /// Return the string representation used in SQL storage.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::OutOfStock => "out_of_stock",
            Self::Discontinued => "discontinued",
        }
    }
}

impl fmt::Display for ProductStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// OrderStatus
// ---------------------------------------------------------------------------

/// Fulfilment status of a customer order.
///
/// ```text
/// pending → in_production → ready_for_pickup → delivered
///         → ready_for_pickup
///         → delivered
/// (any non-terminal) → cancelled
/// ```
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    Pending,
    InProduction,
    ReadyForPickup,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    /// Valid next states from the current state.
    ///
    /// Open orders move freely between the working states so a mistaken
    /// status can be corrected. Only an order not yet handed over can be
    /// cancelled, and a cancelled order never moves again.
    #[must_use]
    pub const fn allowed_next_states(self) -> &'static [Self] {
        match self {
            Self::Pending => &[
                Self::InProduction,
                Self::ReadyForPickup,
                Self::Delivered,
                Self::Cancelled,
            ],
            Self::InProduction => &[
                Self::Pending,
                Self::ReadyForPickup,
                Self::Delivered,
                Self::Cancelled,
            ],
            Self::ReadyForPickup => &[
                Self::Pending,
                Self::InProduction,
                Self::Delivered,
                Self::Cancelled,
            ],
            Self::Delivered => &[Self::Pending, Self::InProduction, Self::ReadyForPickup],
            Self::Cancelled => &[],
        }
    }

    /// Check whether transitioning to `next` is allowed.
    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        self.allowed_next_states().contains(&next)
    }

    #[must_use]
    pub const fn is_terminal(self) -> bool {
        self.allowed_next_states().is_empty()
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProduction => "in_production",
            Self::ReadyForPickup => "ready_for_pickup",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// OrderType
// ---------------------------------------------------------------------------

/// Whether an order is a plain retail order or a custom-made piece.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum OrderType {
    #[default]
    Retail,
    Custom,
}

impl OrderType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Retail => "retail",
            Self::Custom => "custom",
        }
    }
}

impl fmt::Display for OrderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// EmployeeStatus
// ---------------------------------------------------------------------------

/// Employment status of a staff member.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum EmployeeStatus {
    #[default]
    Active,
    OnLeave,
    Resigned,
    Terminated,
}

impl EmployeeStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::OnLeave => "on_leave",
            Self::Resigned => "resigned",
            Self::Terminated => "terminated",
        }
    }
}

impl fmt::Display for EmployeeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// AttendanceStatus
// ---------------------------------------------------------------------------

/// Attendance outcome for one employee on one day.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum AttendanceStatus {
    #[default]
    Present,
    Absent,
    Late,
    OnLeave,
    HalfDay,
}

impl AttendanceStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Present => "present",
            Self::Absent => "absent",
            Self::Late => "late",
            Self::OnLeave => "on_leave",
            Self::HalfDay => "half_day",
        }
    }
}

impl fmt::Display for AttendanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// ExpenseCategory
// ---------------------------------------------------------------------------

/// Bookkeeping category of an expense.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum ExpenseCategory {
    RawMaterials,
    Rent,
    Utilities,
    Salary,
    Marketing,
    Maintenance,
    #[default]
    Other,
}

impl ExpenseCategory {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::RawMaterials => "raw_materials",
            Self::Rent => "rent",
            Self::Utilities => "utilities",
            Self::Salary => "salary",
            Self::Marketing => "marketing",
            Self::Maintenance => "maintenance",
            Self::Other => "other",
        }
    }

    /// Human-readable label for reports.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::RawMaterials => "Raw Materials",
            Self::Rent => "Rent",
            Self::Utilities => "Utilities",
            Self::Salary => "Salary",
            Self::Marketing => "Marketing",
            Self::Maintenance => "Maintenance",
            Self::Other => "Other",
        }
    }
}

impl fmt::Display for ExpenseCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// NotificationKind
// ---------------------------------------------------------------------------

/// Severity of an in-app notification.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    #[default]
    Info,
    Warning,
    Success,
    Error,
}

impl NotificationKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Success => "success",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// AuditAction
// ---------------------------------------------------------------------------

/// Type of action recorded in the audit trail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    Created,
    Updated,
    Deleted,
    StatusChanged,
    StockAdjusted,
}

impl AuditAction {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Updated => "updated",
            Self::Deleted => "deleted",
            Self::StatusChanged => "status_changed",
            Self::StockAdjusted => "stock_adjusted",
        }
    }
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// EntityType
// ---------------------------------------------------------------------------

/// Type of entity in the system, used in the audit trail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    Product,
    Transaction,
    Order,
    Customer,
    Employee,
    Attendance,
    Expense,
    Notification,
    Role,
    User,
    Enquiry,
}

impl EntityType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Product => "product",
            Self::Transaction => "transaction",
            Self::Order => "order",
            Self::Customer => "customer",
            Self::Employee => "employee",
            Self::Attendance => "attendance",
            Self::Expense => "expense",
            Self::Notification => "notification",
            Self::Role => "role",
            Self::User => "user",
            Self::Enquiry => "enquiry",
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // --- Serde roundtrip tests ---

    macro_rules! test_serde_roundtrip {
        ($name:ident, $ty:ty, $variant:expr, $expected_str:expr) => {
            #[test]
            fn $name() {
                let val = $variant;
                let json = serde_json::to_string(&val).unwrap();
                assert_eq!(json, format!("\"{}\"", $expected_str));
                let recovered: $ty = serde_json::from_str(&json).unwrap();
                assert_eq!(recovered, val);
            }
        };
    }

    test_serde_roundtrip!(
        product_out_of_stock,
        ProductStatus,
        ProductStatus::OutOfStock,
        "out_of_stock"
    );
    test_serde_roundtrip!(
        order_ready_for_pickup,
        OrderStatus,
        OrderStatus::ReadyForPickup,
        "ready_for_pickup"
    );
    test_serde_roundtrip!(
        order_in_production,
        OrderStatus,
        OrderStatus::InProduction,
        "in_production"
    );
    test_serde_roundtrip!(order_type_custom, OrderType, OrderType::Custom, "custom");
    test_serde_roundtrip!(
        employee_on_leave,
        EmployeeStatus,
        EmployeeStatus::OnLeave,
        "on_leave"
    );
    test_serde_roundtrip!(
        attendance_half_day,
        AttendanceStatus,
        AttendanceStatus::HalfDay,
        "half_day"
    );
    test_serde_roundtrip!(
        expense_raw_materials,
        ExpenseCategory,
        ExpenseCategory::RawMaterials,
        "raw_materials"
    );
    test_serde_roundtrip!(
        notification_warning,
        NotificationKind,
        NotificationKind::Warning,
        "warning"
    );
    test_serde_roundtrip!(
        audit_stock_adjusted,
        AuditAction,
        AuditAction::StockAdjusted,
        "stock_adjusted"
    );
    test_serde_roundtrip!(
        entity_type_transaction,
        EntityType,
        EntityType::Transaction,
        "transaction"
    );

    #[test]
    fn unknown_variant_is_rejected() {
        let parsed = serde_json::from_str::<OrderStatus>("\"PENDING\"");
        assert!(parsed.is_err());
    }

    // --- Transition tests ---

    #[test]
    fn order_valid_transitions() {
        assert!(OrderStatus::Pending.can_transition_to(OrderStatus::InProduction));
        assert!(OrderStatus::Pending.can_transition_to(OrderStatus::ReadyForPickup));
        assert!(OrderStatus::Pending.can_transition_to(OrderStatus::Delivered));
        assert!(OrderStatus::Pending.can_transition_to(OrderStatus::Cancelled));
        assert!(OrderStatus::InProduction.can_transition_to(OrderStatus::ReadyForPickup));
        assert!(OrderStatus::InProduction.can_transition_to(OrderStatus::Delivered));
        assert!(OrderStatus::InProduction.can_transition_to(OrderStatus::Pending));
        assert!(OrderStatus::ReadyForPickup.can_transition_to(OrderStatus::InProduction));
        assert!(OrderStatus::ReadyForPickup.can_transition_to(OrderStatus::Delivered));
        assert!(OrderStatus::ReadyForPickup.can_transition_to(OrderStatus::Cancelled));
        assert!(OrderStatus::Delivered.can_transition_to(OrderStatus::ReadyForPickup));
    }

    #[test]
    fn order_invalid_transitions() {
        assert!(!OrderStatus::Delivered.can_transition_to(OrderStatus::Cancelled));
        assert!(!OrderStatus::Cancelled.can_transition_to(OrderStatus::Pending));
        assert!(!OrderStatus::Cancelled.can_transition_to(OrderStatus::Delivered));
        assert!(!OrderStatus::Pending.can_transition_to(OrderStatus::Pending));
        assert!(!OrderStatus::Delivered.can_transition_to(OrderStatus::Delivered));
    }

    #[test]
    fn order_terminal_states() {
        assert!(OrderStatus::Cancelled.is_terminal());
        assert!(!OrderStatus::Delivered.is_terminal());
        assert!(!OrderStatus::Pending.is_terminal());
    }

    // --- Defaults ---

    #[test]
    fn defaults_match_new_record_values() {
        assert_eq!(ProductStatus::default(), ProductStatus::Active);
        assert_eq!(OrderStatus::default(), OrderStatus::Pending);
        assert_eq!(OrderType::default(), OrderType::Retail);
        assert_eq!(EmployeeStatus::default(), EmployeeStatus::Active);
        assert_eq!(AttendanceStatus::default(), AttendanceStatus::Present);
        assert_eq!(ExpenseCategory::default(), ExpenseCategory::Other);
        assert_eq!(NotificationKind::default(), NotificationKind::Info);
    }

    // --- Display / as_str tests ---

    #[test]
    fn display_matches_as_str() {
        assert_eq!(format!("{}", ProductStatus::Discontinued), "discontinued");
        assert_eq!(format!("{}", OrderStatus::ReadyForPickup), "ready_for_pickup");
        assert_eq!(format!("{}", OrderType::Retail), "retail");
        assert_eq!(format!("{}", EmployeeStatus::Terminated), "terminated");
        assert_eq!(format!("{}", AttendanceStatus::Late), "late");
        assert_eq!(format!("{}", ExpenseCategory::Maintenance), "maintenance");
        assert_eq!(format!("{}", NotificationKind::Success), "success");
        assert_eq!(format!("{}", AuditAction::Deleted), "deleted");
        assert_eq!(format!("{}", EntityType::Attendance), "attendance");
    }

    #[test]
    fn expense_labels_are_human_readable() {
        assert_eq!(ExpenseCategory::RawMaterials.label(), "Raw Materials");
        assert_eq!(ExpenseCategory::Other.label(), "Other");
    }
}
