//! Service layer orchestrating database mutations with audit.
//!
//! `DeskService` wraps `DeskDb` (raw database access) plus the shop settings
//! the pipelines need. All repo methods are implemented as `impl DeskService`.

use desk_config::DeskConfig;
use tokio::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::warn;

use crate::DeskDb;
use crate::error::DatabaseError;

/// Shop-level values used by repository methods.
#[derive(Debug, Clone)]
pub struct ServiceSettings {
    /// Prefix for amounts in notification messages.
    pub currency_symbol: String,
    /// `min_stock_level` for products created without one.
    pub default_min_stock: i64,
    /// Default page size for the notification feed.
    pub default_limit: u32,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self::from_config(&DeskConfig::default())
    }
}

impl ServiceSettings {
    #[must_use]
    pub fn from_config(config: &DeskConfig) -> Self {
        Self {
            currency_symbol: config.business.currency_symbol.clone(),
            default_min_stock: config.business.default_min_stock,
            default_limit: config.general.default_limit,
        }
    }
}

/// Orchestrates database mutations with the audit trail.
///
/// Every mutation method follows this protocol:
/// 1. Take the write gate
/// 2. Begin transaction
/// 3. Execute SQL
/// 4. Append audit entry (inside transaction)
/// 5. Commit, or roll back on any error
///
/// The gate serializes writers, so a stock movement always sees the level
/// left by the previous committed sale. Reads share the same connection and
/// take the gate's read side, so they never observe an open transaction.
pub struct DeskService {
    db: DeskDb,
    settings: ServiceSettings,
    gate: RwLock<()>,
}

impl DeskService {
    /// Create a new service wrapping a local database.
    ///
    /// # Arguments
    ///
    /// * `db_path` - Path to the libSQL database file, or `":memory:"` for tests.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the database cannot be opened.
    pub async fn new_local(db_path: &str, settings: ServiceSettings) -> Result<Self, DatabaseError> {
        let db = DeskDb::open_local(db_path).await?;
        Ok(Self::from_db(db, settings))
    }

    /// Create from an existing `DeskDb`.
    #[must_use]
    pub fn from_db(db: DeskDb, settings: ServiceSettings) -> Self {
        Self {
            db,
            settings,
            gate: RwLock::new(()),
        }
    }

    /// Access the underlying database handle.
    #[must_use]
    pub const fn db(&self) -> &DeskDb {
        &self.db
    }

    #[must_use]
    pub const fn settings(&self) -> &ServiceSettings {
        &self.settings
    }

    /// Take the write gate and open a transaction.
    pub(crate) async fn begin_write(
        &self,
    ) -> Result<(RwLockWriteGuard<'_, ()>, libsql::Transaction), DatabaseError> {
        let gate = self.gate.write().await;
        let tx = self.db.conn().transaction().await?;
        Ok((gate, tx))
    }

    /// Wait out any write in flight and hand back the connection for reading.
    pub(crate) async fn read(&self) -> (RwLockReadGuard<'_, ()>, &libsql::Connection) {
        (self.gate.read().await, self.db.conn())
    }
}

/// Commit `tx` if `result` is `Ok`, otherwise roll it back and return the error.
pub(crate) async fn finish<T>(
    tx: libsql::Transaction,
    result: Result<T, DatabaseError>,
) -> Result<T, DatabaseError> {
    match result {
        Ok(value) => {
            tx.commit().await?;
            Ok(value)
        }
        Err(error) => {
            if let Err(rollback) = tx.rollback().await {
                warn!(%rollback, %error, "rollback failed");
            }
            Err(error)
        }
    }
}
