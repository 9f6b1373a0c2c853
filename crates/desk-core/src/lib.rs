//! # desk-core
//!
//! Core types, ID prefixes, money helpers, and error types for Shopdesk.
//!
//! This crate provides the foundational types shared across all Shopdesk crates:
//! - Entity structs for every domain record (products, sales, orders, customers, ...)
//! - Status enums, including the order status state machine
//! - ID prefix constants
//! - Decimal money helpers (profit, subtotal, non-negative checks)
//! - The permission catalogue and role grant rules
//! - Cross-cutting error types
//! - API response types
//! - Validated create-request payloads
//! - Audit detail sub-types

pub mod audit_detail;
pub mod entities;
pub mod enums;
pub mod errors;
pub mod identity;
pub mod ids;
pub mod inputs;
pub mod money;
pub mod permissions;
pub mod responses;
