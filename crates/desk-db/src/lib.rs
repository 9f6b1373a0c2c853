//! # desk-db
//!
//! libSQL storage for Shopdesk.
//!
//! Holds every relational record: products, sales, orders, customers,
//! employees, attendance, expenses, notifications, users, roles, and the
//! audit trail. [`DeskDb`] owns the connection and schema; [`service::DeskService`]
//! hosts all repository methods and the sale/order pipelines.
//!
//! Uses the `libsql` crate (C `SQLite` fork, v0.9.29) for native FTS5 and
//! transactions.

pub mod error;
pub mod helpers;
mod migrations;
pub mod repos;
pub mod service;
mod test_support;
pub mod updates;

use error::DatabaseError;
use libsql::Builder;

/// Central database handle.
///
/// Wraps a libSQL database and its single connection. Provides ID generation.
pub struct DeskDb {
    #[allow(dead_code)]
    db: libsql::Database,
    conn: libsql::Connection,
}

impl DeskDb {
    /// Open a local database at the given path, or `":memory:"`.
    ///
    /// Creates the parent directory if needed and runs migrations.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the database cannot be opened or
    /// migrations fail.
    pub async fn open_local(path: &str) -> Result<Self, DatabaseError> {
        if path != ":memory:" {
            if let Some(parent) = std::path::Path::new(path).parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent).map_err(|e| {
                        DatabaseError::Migration(format!("create {}: {e}", parent.display()))
                    })?;
                }
            }
        }

        let db = Builder::new_local(path).build().await?;
        let conn = db.connect()?;

        // Enable foreign keys (must be per-connection in SQLite)
        conn.execute("PRAGMA foreign_keys = ON", ())
            .await
            .map_err(|e| DatabaseError::Migration(format!("PRAGMA foreign_keys: {e}")))?;

        let desk_db = Self { db, conn };
        desk_db.run_migrations().await?;
        Ok(desk_db)
    }

    /// Access the underlying libSQL connection for direct queries.
    #[must_use]
    pub const fn conn(&self) -> &libsql::Connection {
        &self.conn
    }

    /// Generate a prefixed ID via libSQL. Returns e.g., `"prd-a3f8b2c1"`.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails or returns no rows.
    pub async fn generate_id(&self, prefix: &str) -> Result<String, DatabaseError> {
        generate_id(&self.conn, prefix).await
    }
}

/// Generate a prefixed ID on a given connection or open transaction.
///
/// Uses `randomblob(4)` in SQL to produce 8-char hex, then prepends the prefix.
pub(crate) async fn generate_id(
    conn: &libsql::Connection,
    prefix: &str,
) -> Result<String, DatabaseError> {
    let mut rows = conn
        .query(
            &format!("SELECT '{prefix}-' || lower(hex(randomblob(4)))"),
            (),
        )
        .await?;
    let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
    Ok(row.get::<String>(0)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    /// Helper to create an in-memory database for testing.
    async fn test_db() -> DeskDb {
        DeskDb::open_local(":memory:").await.unwrap()
    }

    async fn table_exists(db: &DeskDb, name: &str) -> bool {
        let mut rows = db
            .conn()
            .query(
                "SELECT name FROM sqlite_master WHERE type='table' AND name=?1",
                [name],
            )
            .await
            .unwrap();
        rows.next().await.unwrap().is_some()
    }

    #[tokio::test]
    async fn open_local_creates_schema() {
        let db = test_db().await;
        let tables = [
            "roles",
            "users",
            "products",
            "customers",
            "transactions",
            "transaction_items",
            "orders",
            "order_items",
            "employees",
            "attendance",
            "expenses",
            "notifications",
            "enquiries",
            "audit_trail",
            "products_fts",
            "customers_fts",
        ];
        for table in &tables {
            assert!(table_exists(&db, table).await, "table '{table}' should exist");
        }
    }

    #[tokio::test]
    async fn open_local_creates_parent_dir() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("nested").join("shop.db");
        let db = DeskDb::open_local(path.to_str().unwrap()).await.unwrap();
        assert!(table_exists(&db, "products").await);
        assert!(path.exists());
    }

    #[tokio::test]
    async fn generate_id_correct_format() {
        let db = test_db().await;
        let id = db.generate_id("prd").await.unwrap();
        assert!(id.starts_with("prd-"), "ID should start with 'prd-': {id}");
        assert_eq!(id.len(), 12, "3 prefix + 1 dash + 8 hex: {id}");
        assert!(id[4..].chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[tokio::test]
    async fn generate_id_all_prefixes() {
        let db = test_db().await;
        for prefix in desk_core::ids::ALL_PREFIXES {
            let id = db.generate_id(prefix).await.unwrap();
            assert!(id.starts_with(&format!("{prefix}-")));
        }
    }

    #[tokio::test]
    async fn generate_id_uniqueness() {
        let db = test_db().await;
        let mut ids = HashSet::new();
        for _ in 0..100 {
            let id = db.generate_id("tst").await.unwrap();
            assert!(ids.insert(id.clone()), "Duplicate ID generated: {id}");
        }
    }

    #[tokio::test]
    async fn idempotent_migrations() {
        let db = test_db().await;
        db.run_migrations().await.unwrap();
    }

    #[tokio::test]
    async fn stock_check_constraint_rejects_negative() {
        let db = test_db().await;
        let result = db
            .conn()
            .execute(
                "INSERT INTO products (id, name, sku, category, price, stock_level) VALUES ('prd-t1', 'x', 'x', 'x', '1', -1)",
                (),
            )
            .await;
        assert!(result.is_err(), "negative stock should violate CHECK");
    }

    #[tokio::test]
    async fn fts_trigger_populates_on_insert() {
        let db = test_db().await;
        db.conn()
            .execute(
                "INSERT INTO products (id, name, sku, category, price) VALUES ('prd-t1', 'Walnut Frame', 'FRM-1', 'Frames', '10')",
                (),
            )
            .await
            .unwrap();
        let mut rows = db
            .conn()
            .query(
                "SELECT rowid FROM products_fts WHERE products_fts MATCH 'walnut'",
                (),
            )
            .await
            .unwrap();
        assert!(rows.next().await.unwrap().is_some());
    }
}
