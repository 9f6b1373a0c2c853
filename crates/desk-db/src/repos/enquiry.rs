//! Enquiry inbox repository.

use desk_core::entities::Enquiry;
use desk_core::enums::{AuditAction, EntityType};
use desk_core::ids::PREFIX_ENQUIRY;
use desk_core::inputs::NewEnquiry;

use crate::error::DatabaseError;
use crate::generate_id;
use crate::helpers::{fmt_datetime, now_utc, parse_datetime};
use crate::repos::audit::record_audit;
use crate::service::{DeskService, finish};

const SELECT_COLS: &str = "id, name, phone, message, category, created_at, updated_at";

fn row_to_enquiry(row: &libsql::Row) -> Result<Enquiry, DatabaseError> {
    Ok(Enquiry {
        id: row.get::<String>(0)?,
        name: row.get::<String>(1)?,
        phone: row.get::<String>(2)?,
        message: row.get::<String>(3)?,
        category: row.get::<String>(4)?,
        created_at: parse_datetime(&row.get::<String>(5)?)?,
        updated_at: parse_datetime(&row.get::<String>(6)?)?,
    })
}

async fn fetch_enquiry(conn: &libsql::Connection, id: &str) -> Result<Enquiry, DatabaseError> {
    let mut rows = conn
        .query(
            &format!("SELECT {SELECT_COLS} FROM enquiries WHERE id = ?1"),
            [id],
        )
        .await?;
    let row = rows
        .next()
        .await?
        .ok_or_else(|| DatabaseError::not_found("enquiry", id))?;
    row_to_enquiry(&row)
}

impl DeskService {
    /// File a new enquiry.
    ///
    /// # Errors
    ///
    /// Returns `Validation` when any field is blank.
    pub async fn create_enquiry(
        &self,
        actor: Option<&str>,
        input: &NewEnquiry,
    ) -> Result<Enquiry, DatabaseError> {
        input.validate()?;
        let (_gate, tx) = self.begin_write().await?;
        let result = async {
            let now = now_utc();
            let enquiry = Enquiry {
                id: generate_id(&tx, PREFIX_ENQUIRY).await?,
                name: input.name.trim().to_string(),
                phone: input.phone.trim().to_string(),
                message: input.message.trim().to_string(),
                category: input.category.trim().to_string(),
                created_at: now,
                updated_at: now,
            };
            let ts = fmt_datetime(&now);
            tx.execute(
                "INSERT INTO enquiries (id, name, phone, message, category, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                libsql::params![
                    enquiry.id.as_str(),
                    enquiry.name.as_str(),
                    enquiry.phone.as_str(),
                    enquiry.message.as_str(),
                    enquiry.category.as_str(),
                    ts.as_str(),
                    ts.as_str()
                ],
            )
            .await?;
            record_audit(
                &tx,
                actor,
                EntityType::Enquiry,
                &enquiry.id,
                AuditAction::Created,
                None,
            )
            .await?;
            Ok(enquiry)
        }
        .await;
        finish(tx, result).await
    }

    /// Every enquiry, newest first.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn list_enquiries(&self) -> Result<Vec<Enquiry>, DatabaseError> {
        let (_read, conn) = self.read().await;
        let mut rows = conn
            .query(
                &format!("SELECT {SELECT_COLS} FROM enquiries ORDER BY created_at DESC, rowid DESC"),
                (),
            )
            .await?;
        let mut enquiries = Vec::new();
        while let Some(row) = rows.next().await? {
            enquiries.push(row_to_enquiry(&row)?);
        }
        Ok(enquiries)
    }

    /// # Errors
    ///
    /// Returns `NotFound` if no enquiry has this id.
    pub async fn get_enquiry(&self, id: &str) -> Result<Enquiry, DatabaseError> {
        let (_read, conn) = self.read().await;
        fetch_enquiry(conn, id).await
    }

    /// # Errors
    ///
    /// Returns `NotFound` if no enquiry has this id.
    pub async fn delete_enquiry(&self, actor: Option<&str>, id: &str) -> Result<(), DatabaseError> {
        let (_gate, tx) = self.begin_write().await?;
        let result = async {
            let changed = tx.execute("DELETE FROM enquiries WHERE id = ?1", [id]).await?;
            if changed == 0 {
                return Err(DatabaseError::not_found("enquiry", id));
            }
            record_audit(&tx, actor, EntityType::Enquiry, id, AuditAction::Deleted, None).await?;
            Ok(())
        }
        .await;
        finish(tx, result).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repos::audit::AuditFilter;
    use crate::test_support::helpers::test_service;
    use pretty_assertions::assert_eq;

    fn enquiry(name: &str) -> NewEnquiry {
        NewEnquiry {
            name: name.into(),
            phone: "9000000003".into(),
            message: "Need a quote for a mirror frame".into(),
            category: "custom frame".into(),
        }
    }

    #[tokio::test]
    async fn list_is_newest_first() {
        let svc = test_service().await;
        for name in ["Asha", "Bala", "Chitra"] {
            svc.create_enquiry(None, &enquiry(name)).await.unwrap();
        }
        let names: Vec<String> = svc
            .list_enquiries()
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.name)
            .collect();
        assert_eq!(names, vec!["Chitra", "Bala", "Asha"]);
    }

    #[tokio::test]
    async fn blank_fields_rejected() {
        let svc = test_service().await;
        let mut input = enquiry("Asha");
        input.category = String::new();
        let err = svc.create_enquiry(None, &input).await.unwrap_err();
        assert!(matches!(err, DatabaseError::Validation(_)));
        assert!(svc.list_enquiries().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn get_and_delete() {
        let svc = test_service().await;
        let created = svc.create_enquiry(None, &enquiry("Asha")).await.unwrap();
        assert_eq!(svc.get_enquiry(&created.id).await.unwrap(), created);

        svc.delete_enquiry(Some("usr-1"), &created.id).await.unwrap();
        assert!(matches!(
            svc.get_enquiry(&created.id).await,
            Err(DatabaseError::NotFound { .. })
        ));
        assert!(matches!(
            svc.delete_enquiry(None, &created.id).await,
            Err(DatabaseError::NotFound { .. })
        ));

        let trail = svc
            .query_audit(&AuditFilter {
                entity_type: Some(EntityType::Enquiry),
                ..AuditFilter::default()
            })
            .await
            .unwrap();
        assert_eq!(trail.len(), 2);
    }
}
