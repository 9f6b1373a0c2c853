//! Permission catalogue and role grant rules.
//!
//! Roles store permissions as plain strings so administrators can edit them.
//! A role grants permission `p` when its set contains:
//! - the wildcard `*`,
//! - `p` itself, or
//! - for a `<area>.view` permission, the matching `<area>.manage`.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Wildcard permission held by administrators.
pub const WILDCARD: &str = "*";

/// Every permission the API checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum Permission {
    #[serde(rename = "dashboard.view")]
    DashboardView,
    #[serde(rename = "pos.access")]
    PosAccess,
    #[serde(rename = "orders.manage")]
    OrdersManage,
    #[serde(rename = "crm.manage")]
    CrmManage,
    #[serde(rename = "inventory.view")]
    InventoryView,
    #[serde(rename = "inventory.manage")]
    InventoryManage,
    #[serde(rename = "finance.view")]
    FinanceView,
    #[serde(rename = "finance.manage")]
    FinanceManage,
    #[serde(rename = "hr.view")]
    HrView,
    #[serde(rename = "hr.manage")]
    HrManage,
    #[serde(rename = "attendance.log")]
    AttendanceLog,
    #[serde(rename = "users.manage")]
    UsersManage,
}

impl Permission {
    pub const ALL: &'static [Self] = &[
        Self::DashboardView,
        Self::PosAccess,
        Self::OrdersManage,
        Self::CrmManage,
        Self::InventoryView,
        Self::InventoryManage,
        Self::FinanceView,
        Self::FinanceManage,
        Self::HrView,
        Self::HrManage,
        Self::AttendanceLog,
        Self::UsersManage,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::DashboardView => "dashboard.view",
            Self::PosAccess => "pos.access",
            Self::OrdersManage => "orders.manage",
            Self::CrmManage => "crm.manage",
            Self::InventoryView => "inventory.view",
            Self::InventoryManage => "inventory.manage",
            Self::FinanceView => "finance.view",
            Self::FinanceManage => "finance.manage",
            Self::HrView => "hr.view",
            Self::HrManage => "hr.manage",
            Self::AttendanceLog => "attendance.log",
            Self::UsersManage => "users.manage",
        }
    }

    /// The `.manage` permission that implies this `.view` permission, if any.
    #[must_use]
    pub const fn implied_by(self) -> Option<Self> {
        match self {
            Self::InventoryView => Some(Self::InventoryManage),
            Self::FinanceView => Some(Self::FinanceManage),
            Self::HrView => Some(Self::HrManage),
            _ => None,
        }
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Check whether a set of granted permission strings covers `required`.
#[must_use]
pub fn grants<S: AsRef<str>>(granted: &[S], required: Permission) -> bool {
    granted.iter().any(|g| {
        let g = g.as_ref();
        g == WILDCARD
            || g == required.as_str()
            || required.implied_by().is_some_and(|p| g == p.as_str())
    })
}

/// A role installed on first start. System roles cannot be deleted.
#[derive(Debug, Clone, Copy)]
pub struct DefaultRole {
    pub name: &'static str,
    pub description: &'static str,
    pub permissions: &'static [&'static str],
}

pub const ROLE_ADMIN: &str = "ADMIN";
pub const ROLE_MANAGER: &str = "MANAGER";
pub const ROLE_STAFF: &str = "STAFF";

pub const DEFAULT_ROLES: &[DefaultRole] = &[
    DefaultRole {
        name: ROLE_ADMIN,
        description: "Full system access",
        permissions: &[WILDCARD],
    },
    DefaultRole {
        name: ROLE_MANAGER,
        description: "Sales and team management",
        permissions: &[
            "dashboard.view",
            "pos.access",
            "orders.manage",
            "crm.manage",
            "inventory.manage",
            "finance.view",
        ],
    },
    DefaultRole {
        name: ROLE_STAFF,
        description: "Daily operations",
        permissions: &[
            "dashboard.view",
            "pos.access",
            "orders.manage",
            "crm.manage",
            "inventory.view",
        ],
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    fn role(name: &str) -> &'static DefaultRole {
        DEFAULT_ROLES.iter().find(|r| r.name == name).unwrap()
    }

    #[test]
    fn wildcard_grants_everything() {
        for p in Permission::ALL {
            assert!(grants(&["*"], *p), "wildcard should grant {p}");
        }
    }

    #[test]
    fn manage_implies_view() {
        assert!(grants(&["inventory.manage"], Permission::InventoryView));
        assert!(grants(&["hr.manage"], Permission::HrView));
        assert!(!grants(&["inventory.view"], Permission::InventoryManage));
    }

    #[test]
    fn staff_cannot_manage_inventory() {
        let staff = role(ROLE_STAFF);
        assert!(grants(staff.permissions, Permission::InventoryView));
        assert!(!grants(staff.permissions, Permission::InventoryManage));
        assert!(!grants(staff.permissions, Permission::UsersManage));
    }

    #[test]
    fn manager_sees_finance_but_cannot_edit() {
        let manager = role(ROLE_MANAGER);
        assert!(grants(manager.permissions, Permission::FinanceView));
        assert!(!grants(manager.permissions, Permission::FinanceManage));
    }

    #[test]
    fn empty_set_grants_nothing() {
        let none: [&str; 0] = [];
        assert!(!grants(&none, Permission::DashboardView));
    }

    #[test]
    fn serde_uses_dotted_names() {
        let json = serde_json::to_string(&Permission::AttendanceLog).unwrap();
        assert_eq!(json, "\"attendance.log\"");
        for p in Permission::ALL {
            let json = serde_json::to_string(p).unwrap();
            assert_eq!(json, format!("\"{}\"", p.as_str()));
        }
    }
}
