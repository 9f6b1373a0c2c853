use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::permissions::{self, Permission};

/// The authenticated caller of an operation.
///
/// Built by `desk-server` from a verified token plus the caller's role, then
/// passed to repository methods as the audit actor.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Principal {
    pub user_id: String,
    pub email: String,
    pub name: String,
    pub role: String,
    /// Permission strings of `role` at the time of the request.
    pub permissions: Vec<String>,
}

impl Principal {
    #[must_use]
    pub fn can(&self, permission: Permission) -> bool {
        permissions::grants(&self.permissions, permission)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn principal(perms: &[&str]) -> Principal {
        Principal {
            user_id: "usr-00000001".into(),
            email: "asha@example.com".into(),
            name: "Asha".into(),
            role: "STAFF".into(),
            permissions: perms.iter().map(ToString::to_string).collect(),
        }
    }

    #[test]
    fn can_follows_role_permissions() {
        let p = principal(&["pos.access", "finance.manage"]);
        assert!(p.can(Permission::PosAccess));
        assert!(p.can(Permission::FinanceView));
        assert!(!p.can(Permission::HrView));
    }
}
