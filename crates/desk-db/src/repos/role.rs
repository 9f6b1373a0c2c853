//! Role repository.
//!
//! Roles are named permission sets. The three system roles are seeded on
//! first start and cannot be deleted or renamed; their permissions stay
//! editable.

use desk_core::entities::Role;
use desk_core::enums::{AuditAction, EntityType};
use desk_core::ids::PREFIX_ROLE;
use desk_core::inputs::NewRole;
use desk_core::permissions::DEFAULT_ROLES;
use tracing::info;

use crate::error::DatabaseError;
use crate::generate_id;
use crate::helpers::{
    encode_string_list, fmt_datetime, get_bool, get_opt_string, now_utc, parse_datetime,
    parse_string_list,
};
use crate::repos::audit::record_audit;
use crate::service::{DeskService, finish};
use crate::updates::SetClause;
use crate::updates::role::RoleUpdate;

const SELECT_COLS: &str = "id, name, description, permissions, is_system, created_at, updated_at";

fn row_to_role(row: &libsql::Row) -> Result<Role, DatabaseError> {
    Ok(Role {
        id: row.get::<String>(0)?,
        name: row.get::<String>(1)?,
        description: get_opt_string(row, 2)?,
        permissions: parse_string_list(&row.get::<String>(3)?)?,
        is_system: get_bool(row, 4)?,
        created_at: parse_datetime(&row.get::<String>(5)?)?,
        updated_at: parse_datetime(&row.get::<String>(6)?)?,
    })
}

async fn fetch_role(conn: &libsql::Connection, id: &str) -> Result<Role, DatabaseError> {
    let mut rows = conn
        .query(&format!("SELECT {SELECT_COLS} FROM roles WHERE id = ?1"), [id])
        .await?;
    let row = rows
        .next()
        .await?
        .ok_or_else(|| DatabaseError::not_found("role", id))?;
    row_to_role(&row)
}

pub(crate) async fn role_by_name(
    conn: &libsql::Connection,
    name: &str,
) -> Result<Option<Role>, DatabaseError> {
    let mut rows = conn
        .query(
            &format!("SELECT {SELECT_COLS} FROM roles WHERE name = ?1"),
            [name],
        )
        .await?;
    match rows.next().await? {
        Some(row) => Ok(Some(row_to_role(&row)?)),
        None => Ok(None),
    }
}

async fn insert_role(
    conn: &libsql::Connection,
    name: &str,
    description: Option<&str>,
    permissions: &[String],
    is_system: bool,
) -> Result<Role, DatabaseError> {
    let now = now_utc();
    let role = Role {
        id: generate_id(conn, PREFIX_ROLE).await?,
        name: name.trim().to_string(),
        description: description.map(String::from),
        permissions: permissions.to_vec(),
        is_system,
        created_at: now,
        updated_at: now,
    };
    let ts = fmt_datetime(&now);
    conn.execute(
        "INSERT INTO roles (id, name, description, permissions, is_system, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        libsql::params![
            role.id.as_str(),
            role.name.as_str(),
            role.description.as_deref(),
            encode_string_list(&role.permissions)?,
            i64::from(is_system),
            ts.as_str(),
            ts.as_str()
        ],
    )
    .await
    .map_err(|e| DatabaseError::from_write(e, || format!("role '{}' already exists", role.name)))?;
    Ok(role)
}

/// Install the system roles when the roles table is empty.
///
/// Returns the number of roles inserted.
pub(crate) async fn seed_on(conn: &libsql::Connection) -> Result<usize, DatabaseError> {
    let mut rows = conn.query("SELECT COUNT(*) FROM roles", ()).await?;
    let existing = rows
        .next()
        .await?
        .ok_or(DatabaseError::NoResult)?
        .get::<i64>(0)?;
    if existing > 0 {
        return Ok(0);
    }
    for role in DEFAULT_ROLES {
        let permissions: Vec<String> = role.permissions.iter().map(ToString::to_string).collect();
        insert_role(conn, role.name, Some(role.description), &permissions, true).await?;
    }
    Ok(DEFAULT_ROLES.len())
}

impl DeskService {
    /// Install the default `ADMIN`, `MANAGER` and `STAFF` roles if no role
    /// exists yet. Safe to call on every start.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the inserts fail.
    pub async fn seed_default_roles(&self) -> Result<usize, DatabaseError> {
        let (_gate, tx) = self.begin_write().await?;
        let result = seed_on(&tx).await;
        let inserted = finish(tx, result).await?;
        if inserted > 0 {
            info!(count = inserted, "seeded default roles");
        }
        Ok(inserted)
    }

    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn list_roles(&self) -> Result<Vec<Role>, DatabaseError> {
        let (_read, conn) = self.read().await;
        let mut rows = conn
            .query(
                &format!("SELECT {SELECT_COLS} FROM roles ORDER BY is_system DESC, name"),
                (),
            )
            .await?;
        let mut roles = Vec::new();
        while let Some(row) = rows.next().await? {
            roles.push(row_to_role(&row)?);
        }
        Ok(roles)
    }

    /// # Errors
    ///
    /// Returns `NotFound` if no role has this id.
    pub async fn get_role(&self, id: &str) -> Result<Role, DatabaseError> {
        let (_read, conn) = self.read().await;
        fetch_role(conn, id).await
    }

    /// # Errors
    ///
    /// Returns `Validation` for an unknown permission or `Conflict` for a
    /// duplicate name.
    pub async fn create_role(
        &self,
        actor: Option<&str>,
        input: &NewRole,
    ) -> Result<Role, DatabaseError> {
        input.validate()?;
        let (_gate, tx) = self.begin_write().await?;
        let result = async {
            let role = insert_role(
                &tx,
                &input.name,
                input.description.as_deref(),
                &input.permissions,
                false,
            )
            .await?;
            record_audit(&tx, actor, EntityType::Role, &role.id, AuditAction::Created, None)
                .await?;
            Ok(role)
        }
        .await;
        finish(tx, result).await
    }

    /// Edit a role. Renaming carries every user holding the old name over
    /// to the new one.
    ///
    /// # Errors
    ///
    /// Returns `NotFound`, `Validation`, `Conflict`, or `InvalidState` when
    /// renaming a system role.
    pub async fn update_role(
        &self,
        actor: Option<&str>,
        id: &str,
        update: &RoleUpdate,
    ) -> Result<Role, DatabaseError> {
        update.validate()?;
        let (_gate, tx) = self.begin_write().await?;
        let result = async {
            let role = fetch_role(&tx, id).await?;

            let rename = update
                .name
                .as_deref()
                .map(str::trim)
                .filter(|name| *name != role.name);
            if rename.is_some() && role.is_system {
                return Err(DatabaseError::InvalidState(format!(
                    "system role {} cannot be renamed",
                    role.name
                )));
            }

            let mut set = SetClause::default();
            if let Some(name) = rename {
                set.push("name", name);
            }
            if let Some(ref description) = update.description {
                set.push_opt("description", description.as_deref());
            }
            if let Some(ref permissions) = update.permissions {
                set.push("permissions", encode_string_list(permissions)?);
            }
            if set.is_empty() {
                return Ok(role);
            }
            set.push("updated_at", fmt_datetime(&now_utc()));

            let (sql, params) = set.into_sql("roles", id);
            tx.execute(&sql, libsql::params_from_iter(params))
                .await
                .map_err(|e| {
                    DatabaseError::from_write(e, || {
                        format!("role '{}' already exists", rename.unwrap_or_default())
                    })
                })?;
            if let Some(name) = rename {
                tx.execute(
                    "UPDATE users SET role = ?1 WHERE role = ?2",
                    libsql::params![name, role.name.as_str()],
                )
                .await?;
            }
            record_audit(
                &tx,
                actor,
                EntityType::Role,
                id,
                AuditAction::Updated,
                Some(serde_json::to_value(update)?),
            )
            .await?;
            fetch_role(&tx, id).await
        }
        .await;
        finish(tx, result).await
    }

    /// # Errors
    ///
    /// Returns `NotFound`, or `InvalidState` for a system role or a role
    /// still assigned to users.
    pub async fn delete_role(&self, actor: Option<&str>, id: &str) -> Result<(), DatabaseError> {
        let (_gate, tx) = self.begin_write().await?;
        let result = async {
            let role = fetch_role(&tx, id).await?;
            if role.is_system {
                return Err(DatabaseError::InvalidState(format!(
                    "system role {} cannot be deleted",
                    role.name
                )));
            }
            let mut rows = tx
                .query("SELECT COUNT(*) FROM users WHERE role = ?1", [role.name.as_str()])
                .await?;
            let holders = rows
                .next()
                .await?
                .ok_or(DatabaseError::NoResult)?
                .get::<i64>(0)?;
            if holders > 0 {
                return Err(DatabaseError::InvalidState(format!(
                    "role {} is assigned to {holders} user(s)",
                    role.name
                )));
            }
            tx.execute("DELETE FROM roles WHERE id = ?1", [id]).await?;
            record_audit(&tx, actor, EntityType::Role, id, AuditAction::Deleted, None).await?;
            Ok(())
        }
        .await;
        finish(tx, result).await
    }
}
