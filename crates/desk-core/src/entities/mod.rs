//! Entity structs for all Shopdesk domain records.
//!
//! Each entity maps to a table in the libSQL database (see
//! `desk-db/migrations/001_initial.sql`). All structs derive `Serialize`,
//! `Deserialize`, and `JsonSchema` for JSON roundtrip and schema validation.
//! Money fields are `Decimal` and appear in schemas as strings.

mod attendance;
mod audit;
mod customer;
mod employee;
mod enquiry;
mod expense;
mod notification;
mod order;
mod product;
mod role;
mod transaction;
mod user;

pub use attendance::Attendance;
pub use audit::AuditEntry;
pub use customer::Customer;
pub use employee::{Employee, Salary};
pub use enquiry::Enquiry;
pub use expense::Expense;
pub use notification::Notification;
pub use order::{Order, OrderItem};
pub use product::Product;
pub use role::Role;
pub use transaction::{Transaction, TransactionItem};
pub use user::User;
