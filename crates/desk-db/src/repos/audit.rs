//! Audit trail repository.
//!
//! Append-only audit entries recording every mutation, written in the same
//! transaction as the change they describe.

use desk_core::entities::AuditEntry;
use desk_core::enums::{AuditAction, EntityType};
use desk_core::ids::PREFIX_AUDIT;

use crate::error::DatabaseError;
use crate::generate_id;
use crate::helpers::{
    fmt_datetime, get_opt_string, now_utc, parse_datetime, parse_enum, parse_optional_json,
};
use crate::service::DeskService;

/// Filter criteria for audit queries.
#[derive(Debug, Default)]
pub struct AuditFilter {
    pub entity_type: Option<EntityType>,
    pub entity_id: Option<String>,
    pub action: Option<AuditAction>,
    pub actor: Option<String>,
    pub limit: Option<u32>,
}

/// Append an audit entry on `conn`.
pub(crate) async fn record_audit(
    conn: &libsql::Connection,
    actor: Option<&str>,
    entity_type: EntityType,
    entity_id: &str,
    action: AuditAction,
    detail: Option<serde_json::Value>,
) -> Result<AuditEntry, DatabaseError> {
    let entry = AuditEntry {
        id: generate_id(conn, PREFIX_AUDIT).await?,
        actor: actor.map(String::from),
        entity_type,
        entity_id: entity_id.to_string(),
        action,
        detail,
        created_at: now_utc(),
    };
    conn.execute(
        "INSERT INTO audit_trail (id, actor, entity_type, entity_id, action, detail, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        libsql::params![
            entry.id.as_str(),
            entry.actor.as_deref(),
            entry.entity_type.as_str(),
            entry.entity_id.as_str(),
            entry.action.as_str(),
            entry.detail.as_ref().map(std::string::ToString::to_string),
            fmt_datetime(&entry.created_at)
        ],
    )
    .await?;
    Ok(entry)
}

fn row_to_audit(row: &libsql::Row) -> Result<AuditEntry, DatabaseError> {
    Ok(AuditEntry {
        id: row.get::<String>(0)?,
        actor: get_opt_string(row, 1)?,
        entity_type: parse_enum(&row.get::<String>(2)?)?,
        entity_id: row.get::<String>(3)?,
        action: parse_enum(&row.get::<String>(4)?)?,
        detail: parse_optional_json(get_opt_string(row, 5)?.as_deref())?,
        created_at: parse_datetime(&row.get::<String>(6)?)?,
    })
}

impl DeskService {
    /// Query audit entries with optional filters, newest first.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn query_audit(&self, filter: &AuditFilter) -> Result<Vec<AuditEntry>, DatabaseError> {
        let mut conditions = Vec::new();
        let mut params: Vec<libsql::Value> = Vec::new();

        if let Some(ref et) = filter.entity_type {
            params.push(libsql::Value::Text(et.as_str().to_string()));
            conditions.push(format!("entity_type = ?{}", params.len()));
        }
        if let Some(ref eid) = filter.entity_id {
            params.push(libsql::Value::Text(eid.clone()));
            conditions.push(format!("entity_id = ?{}", params.len()));
        }
        if let Some(ref action) = filter.action {
            params.push(libsql::Value::Text(action.as_str().to_string()));
            conditions.push(format!("action = ?{}", params.len()));
        }
        if let Some(ref actor) = filter.actor {
            params.push(libsql::Value::Text(actor.clone()));
            conditions.push(format!("actor = ?{}", params.len()));
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        let limit = filter.limit.unwrap_or(100);
        let sql = format!(
            "SELECT id, actor, entity_type, entity_id, action, detail, created_at
             FROM audit_trail {where_clause}
             ORDER BY created_at DESC, rowid DESC LIMIT {limit}"
        );

        let (_read, conn) = self.read().await;
        let mut rows = conn
            .query(&sql, libsql::params_from_iter(params))
            .await?;
        let mut entries = Vec::new();
        while let Some(row) = rows.next().await? {
            entries.push(row_to_audit(&row)?);
        }
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::helpers::{seed_product, test_service};

    #[tokio::test]
    async fn record_and_query_by_entity() {
        let svc = test_service().await;
        let conn = svc.db().conn();
        for i in 0..3 {
            record_audit(
                conn,
                Some("usr-00000001"),
                EntityType::Product,
                &format!("prd-{i:08x}"),
                AuditAction::Created,
                None,
            )
            .await
            .unwrap();
        }
        record_audit(conn, None, EntityType::Order, "ord-1", AuditAction::Deleted, None)
            .await
            .unwrap();

        let all = svc.query_audit(&AuditFilter::default()).await.unwrap();
        assert_eq!(all.len(), 4);
        assert_eq!(all[0].entity_type, EntityType::Order, "newest first");

        let products = svc
            .query_audit(&AuditFilter {
                entity_type: Some(EntityType::Product),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(products.len(), 3);

        let by_actor = svc
            .query_audit(&AuditFilter {
                actor: Some("usr-00000001".into()),
                limit: Some(2),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(by_actor.len(), 2);
    }

    #[tokio::test]
    async fn detail_roundtrips_as_json() {
        let svc = test_service().await;
        record_audit(
            svc.db().conn(),
            None,
            EntityType::Order,
            "ord-1",
            AuditAction::StatusChanged,
            Some(serde_json::json!({"from": "pending", "to": "delivered"})),
        )
        .await
        .unwrap();

        let entries = svc
            .query_audit(&AuditFilter {
                action: Some(AuditAction::StatusChanged),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(entries[0].detail.as_ref().unwrap()["to"], "delivered");
    }

    #[tokio::test]
    async fn mutations_are_audited() {
        let svc = test_service().await;
        let product = seed_product(&svc, "SKU-1", "10", "5", 3).await;
        let entries = svc
            .query_audit(&AuditFilter {
                entity_id: Some(product.id.clone()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].action, AuditAction::Created);
    }
}
