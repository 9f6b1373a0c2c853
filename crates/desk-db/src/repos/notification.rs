//! Notification repository.

use desk_core::entities::Notification;
use desk_core::enums::{AuditAction, EntityType, NotificationKind};
use desk_core::ids::PREFIX_NOTIFICATION;
use tracing::debug;

use crate::error::DatabaseError;
use crate::generate_id;
use crate::helpers::{fmt_datetime, get_bool, now_utc, parse_datetime, parse_enum};
use crate::repos::audit::record_audit;
use crate::service::{DeskService, finish};

const SELECT_COLS: &str = "id, title, message, kind, read, created_at";

fn row_to_notification(row: &libsql::Row) -> Result<Notification, DatabaseError> {
    Ok(Notification {
        id: row.get::<String>(0)?,
        title: row.get::<String>(1)?,
        message: row.get::<String>(2)?,
        kind: parse_enum(&row.get::<String>(3)?)?,
        read: get_bool(row, 4)?,
        created_at: parse_datetime(&row.get::<String>(5)?)?,
    })
}

/// Insert an unread notification on `conn`.
pub(crate) async fn insert_notification(
    conn: &libsql::Connection,
    title: &str,
    message: &str,
    kind: NotificationKind,
) -> Result<Notification, DatabaseError> {
    let notification = Notification {
        id: generate_id(conn, PREFIX_NOTIFICATION).await?,
        title: title.to_string(),
        message: message.to_string(),
        kind,
        read: false,
        created_at: now_utc(),
    };
    conn.execute(
        "INSERT INTO notifications (id, title, message, kind, read, created_at)
         VALUES (?1, ?2, ?3, ?4, 0, ?5)",
        libsql::params![
            notification.id.as_str(),
            title,
            message,
            kind.as_str(),
            fmt_datetime(&notification.created_at)
        ],
    )
    .await?;
    debug!(id = %notification.id, %title, "notification emitted");
    Ok(notification)
}

async fn fetch_notification(
    conn: &libsql::Connection,
    id: &str,
) -> Result<Notification, DatabaseError> {
    let mut rows = conn
        .query(
            &format!("SELECT {SELECT_COLS} FROM notifications WHERE id = ?1"),
            [id],
        )
        .await?;
    let row = rows
        .next()
        .await?
        .ok_or_else(|| DatabaseError::not_found("notification", id))?;
    row_to_notification(&row)
}

impl DeskService {
    /// # Errors
    ///
    /// Returns `DatabaseError` if the insert fails.
    pub async fn create_notification(
        &self,
        title: &str,
        message: &str,
        kind: NotificationKind,
    ) -> Result<Notification, DatabaseError> {
        let (_gate, tx) = self.begin_write().await?;
        let result = insert_notification(&tx, title, message, kind).await;
        finish(tx, result).await
    }

    /// Most recent notifications first. `None` uses the configured default limit.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn list_notifications(
        &self,
        limit: Option<u32>,
    ) -> Result<Vec<Notification>, DatabaseError> {
        let limit = limit.unwrap_or(self.settings().default_limit);
        let (_read, conn) = self.read().await;
        let mut rows = conn
            .query(
                &format!(
                    "SELECT {SELECT_COLS} FROM notifications
                     ORDER BY created_at DESC, rowid DESC LIMIT ?1"
                ),
                [i64::from(limit)],
            )
            .await?;
        let mut out = Vec::new();
        while let Some(row) = rows.next().await? {
            out.push(row_to_notification(&row)?);
        }
        Ok(out)
    }

    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn unread_notification_count(&self) -> Result<i64, DatabaseError> {
        let (_read, conn) = self.read().await;
        let mut rows = conn
            .query("SELECT COUNT(*) FROM notifications WHERE read = 0", ())
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        Ok(row.get::<i64>(0)?)
    }

    /// # Errors
    ///
    /// Returns `DatabaseError::NotFound` if no notification has this id.
    pub async fn mark_notification_read(&self, id: &str) -> Result<Notification, DatabaseError> {
        let (_gate, tx) = self.begin_write().await?;
        let result = async {
            let changed = tx
                .execute("UPDATE notifications SET read = 1 WHERE id = ?1", [id])
                .await?;
            if changed == 0 {
                return Err(DatabaseError::not_found("notification", id));
            }
            fetch_notification(&tx, id).await
        }
        .await;
        finish(tx, result).await
    }

    /// # Errors
    ///
    /// Returns `DatabaseError::NotFound` if no notification has this id.
    pub async fn delete_notification(
        &self,
        actor: Option<&str>,
        id: &str,
    ) -> Result<(), DatabaseError> {
        let (_gate, tx) = self.begin_write().await?;
        let result = async {
            let changed = tx
                .execute("DELETE FROM notifications WHERE id = ?1", [id])
                .await?;
            if changed == 0 {
                return Err(DatabaseError::not_found("notification", id));
            }
            record_audit(&tx, actor, EntityType::Notification, id, AuditAction::Deleted, None)
                .await?;
            Ok(())
        }
        .await;
        finish(tx, result).await
    }
}
