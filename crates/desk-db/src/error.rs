//! Database error types for desk-db.

use desk_core::errors::CoreError;
use thiserror::Error;

/// Errors from database operations.
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// A SQL query failed or returned malformed data.
    #[error("Query failed: {0}")]
    Query(String),

    /// Schema migration failed.
    #[error("Migration failed: {0}")]
    Migration(String),

    /// Expected a result row but none was returned.
    #[error("No result returned")]
    NoResult,

    /// The addressed record does not exist.
    #[error("{entity} {id} not found")]
    NotFound { entity: String, id: String },

    /// The operation is not allowed in the record's current state
    /// (illegal status transition, deleting a system role, ...).
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Input failed validation.
    #[error("Validation error: {0}")]
    Validation(String),

    /// A sale or order asked for more units than are in stock.
    #[error("Insufficient stock for product: {product} (available {available}, requested {requested})")]
    InsufficientStock {
        product: String,
        available: i64,
        requested: i64,
    },

    /// A uniqueness constraint was violated.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Password hashing or verification failed.
    #[error("Credential error: {0}")]
    Credential(String),

    /// Underlying libSQL error.
    #[error("libSQL error: {0}")]
    LibSql(#[from] libsql::Error),

    /// Catch-all for unexpected errors.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl DatabaseError {
    pub(crate) fn not_found(entity: &str, id: &str) -> Self {
        Self::NotFound {
            entity: entity.to_string(),
            id: id.to_string(),
        }
    }

    /// Map a libSQL error to `Conflict` when it is a UNIQUE violation.
    pub(crate) fn from_write(error: libsql::Error, conflict: impl FnOnce() -> String) -> Self {
        if error.to_string().contains("UNIQUE constraint failed") {
            Self::Conflict(conflict())
        } else {
            Self::LibSql(error)
        }
    }
}

impl From<CoreError> for DatabaseError {
    fn from(error: CoreError) -> Self {
        match error {
            CoreError::NotFound { entity_type, id } => Self::NotFound {
                entity: entity_type,
                id,
            },
            CoreError::InvalidTransition {
                entity_type,
                id,
                from,
                to,
            } => Self::InvalidState(format!(
                "{entity_type} {id} cannot move from {from} to {to}"
            )),
            CoreError::Validation(msg) => Self::Validation(msg),
            CoreError::Other(e) => Self::Other(e),
        }
    }
}

impl From<serde_json::Error> for DatabaseError {
    fn from(error: serde_json::Error) -> Self {
        Self::Other(error.into())
    }
}
