//! Repository modules. Each adds methods to `DeskService` for one entity.
//!
//! Connection-level helpers (`*_on`) take a `&libsql::Connection` so the
//! sale and order pipelines can run them inside one open transaction.

pub mod attendance;
pub mod audit;
pub mod customer;
pub mod employee;
pub mod enquiry;
pub mod expense;
pub mod finance;
pub mod notification;
pub mod order;
pub mod product;
pub mod role;
pub mod transaction;
pub mod user;
