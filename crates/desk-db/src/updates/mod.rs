//! Update builder types for entity mutations.
//!
//! Each builder produces an update struct with `Option` fields. Only `Some` fields
//! generate SET clauses in the dynamic UPDATE SQL. Nullable columns use
//! `Option<Option<T>>`: `Some(None)` clears the column. The same structs are the
//! `PATCH` request bodies, and their serialized form (changed fields only) is the
//! audit `detail` payload.

use serde::{Deserialize, Deserializer};

pub mod customer;
pub mod employee;
pub mod expense;
pub mod order;
pub mod product;
pub mod role;
pub mod user;

/// Deserialize a present field (including `null`) as `Some(..)`.
///
/// Combined with `#[serde(default)]`, an absent field stays `None`, an explicit
/// `null` becomes `Some(None)`, and a value becomes `Some(Some(v))`.
pub(crate) fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Dynamic `SET` clause accumulator shared by the update repos.
#[derive(Default)]
pub(crate) struct SetClause {
    sets: Vec<String>,
    params: Vec<libsql::Value>,
}

impl SetClause {
    pub(crate) fn push(&mut self, column: &str, value: impl Into<libsql::Value>) {
        self.params.push(value.into());
        self.sets.push(format!("{column} = ?{}", self.params.len()));
    }

    pub(crate) fn push_opt(&mut self, column: &str, value: Option<&str>) {
        let value = value.map_or(libsql::Value::Null, |v| libsql::Value::Text(v.to_string()));
        self.push(column, value);
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    /// Finish as `UPDATE {table} SET ... WHERE id = ?N`.
    pub(crate) fn into_sql(mut self, table: &str, id: &str) -> (String, Vec<libsql::Value>) {
        self.params.push(id.into());
        let sql = format!(
            "UPDATE {table} SET {} WHERE id = ?{}",
            self.sets.join(", "),
            self.params.len()
        );
        (sql, self.params)
    }
}
