use std::collections::BTreeMap;

use axum::routing::get;
use axum::{Json, Router};
use desk_core::entities::{
    Attendance, AuditEntry, Customer, Employee, Enquiry, Expense, Notification, Order, Product,
    Role, Transaction, User,
};
use desk_core::responses::FinancialSummary;
use schemars::{Schema, schema_for};
use serde_json::{Value, json};

use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/version", get(version))
        .route("/meta/schema", get(entity_schemas))
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

async fn version() -> Json<Value> {
    Json(json!({
        "name": "shopdesk",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn entity_schemas() -> Json<BTreeMap<&'static str, Schema>> {
    let mut schemas = BTreeMap::new();
    schemas.insert("attendance", schema_for!(Attendance));
    schemas.insert("audit_entry", schema_for!(AuditEntry));
    schemas.insert("customer", schema_for!(Customer));
    schemas.insert("employee", schema_for!(Employee));
    schemas.insert("enquiry", schema_for!(Enquiry));
    schemas.insert("expense", schema_for!(Expense));
    schemas.insert("financial_summary", schema_for!(FinancialSummary));
    schemas.insert("notification", schema_for!(Notification));
    schemas.insert("order", schema_for!(Order));
    schemas.insert("product", schema_for!(Product));
    schemas.insert("role", schema_for!(Role));
    schemas.insert("transaction", schema_for!(Transaction));
    schemas.insert("user", schema_for!(User));
    Json(schemas)
}
