//! ID prefix constants.
//!
//! Every entity ID is `"{prefix}-{8 hex chars}"`, generated by the database
//! (see `DeskDb::generate_id`).

pub const PREFIX_PRODUCT: &str = "prd";
pub const PREFIX_TRANSACTION: &str = "txn";
pub const PREFIX_ORDER: &str = "ord";
pub const PREFIX_CUSTOMER: &str = "cus";
pub const PREFIX_EMPLOYEE: &str = "emp";
pub const PREFIX_ATTENDANCE: &str = "att";
pub const PREFIX_EXPENSE: &str = "exp";
pub const PREFIX_NOTIFICATION: &str = "ntf";
pub const PREFIX_ROLE: &str = "rol";
pub const PREFIX_USER: &str = "usr";
pub const PREFIX_ENQUIRY: &str = "enq";
pub const PREFIX_AUDIT: &str = "aud";

/// All prefixes, used by tests that exercise ID generation.
pub const ALL_PREFIXES: &[&str] = &[
    PREFIX_PRODUCT,
    PREFIX_TRANSACTION,
    PREFIX_ORDER,
    PREFIX_CUSTOMER,
    PREFIX_EMPLOYEE,
    PREFIX_ATTENDANCE,
    PREFIX_EXPENSE,
    PREFIX_NOTIFICATION,
    PREFIX_ROLE,
    PREFIX_USER,
    PREFIX_ENQUIRY,
    PREFIX_AUDIT,
];

/// Short human-facing reference for an entity ID: the last six characters,
/// uppercased. Used in notification messages (`Order #A3F8B2`).
#[must_use]
pub fn short_ref(id: &str) -> String {
    let start = id.len().saturating_sub(6);
    id.get(start..).unwrap_or(id).to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_ref_takes_last_six_uppercased() {
        assert_eq!(short_ref("ord-a3f8b2c1"), "F8B2C1");
    }

    #[test]
    fn short_ref_handles_short_ids() {
        assert_eq!(short_ref("ab1"), "AB1");
    }

    #[test]
    fn prefixes_are_unique() {
        let mut seen = std::collections::HashSet::new();
        for prefix in ALL_PREFIXES {
            assert!(seen.insert(*prefix), "duplicate prefix {prefix}");
        }
    }
}
