//! User repository and credential checks.
//!
//! The password hash never leaves this module: `User` has no hash field and
//! every query outside [`DeskService::verify_credentials`] selects around it.

use desk_auth::{hash_password, verify_decoy, verify_password};
use desk_core::entities::User;
use desk_core::enums::{AuditAction, EntityType};
use desk_core::identity::Principal;
use desk_core::ids::PREFIX_USER;
use desk_core::inputs::NewUser;
use desk_core::permissions::{ROLE_ADMIN, ROLE_STAFF};
use tracing::{info, warn};

use crate::error::DatabaseError;
use crate::generate_id;
use crate::helpers::{fmt_datetime, now_utc, parse_datetime};
use crate::repos::audit::record_audit;
use crate::repos::role::{role_by_name, seed_on};
use crate::service::{DeskService, finish};
use crate::updates::SetClause;
use crate::updates::user::UserUpdate;

const SELECT_COLS: &str = "id, name, email, role, created_at, updated_at";

const BAD_CREDENTIALS: &str = "invalid email or password";

fn row_to_user(row: &libsql::Row) -> Result<User, DatabaseError> {
    Ok(User {
        id: row.get::<String>(0)?,
        name: row.get::<String>(1)?,
        email: row.get::<String>(2)?,
        role: row.get::<String>(3)?,
        created_at: parse_datetime(&row.get::<String>(4)?)?,
        updated_at: parse_datetime(&row.get::<String>(5)?)?,
    })
}

async fn fetch_user(conn: &libsql::Connection, id: &str) -> Result<User, DatabaseError> {
    let mut rows = conn
        .query(&format!("SELECT {SELECT_COLS} FROM users WHERE id = ?1"), [id])
        .await?;
    let row = rows
        .next()
        .await?
        .ok_or_else(|| DatabaseError::not_found("user", id))?;
    row_to_user(&row)
}

/// Hash on the blocking pool.
async fn hash(password: &str) -> Result<String, DatabaseError> {
    let password = password.to_owned();
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| DatabaseError::Other(e.into()))?
        .map_err(|e| DatabaseError::Credential(e.to_string()))
}

fn email_taken(email: &str) -> String {
    format!("email '{email}' is already registered")
}

impl DeskService {
    /// Register a user. The very first user becomes `ADMIN`; everyone after
    /// that starts as `STAFF`.
    ///
    /// # Errors
    ///
    /// Returns `Validation` for bad input or `Conflict` for a taken email.
    pub async fn create_user(
        &self,
        actor: Option<&str>,
        input: &NewUser,
    ) -> Result<User, DatabaseError> {
        input.validate()?;
        let password_hash = hash(&input.password).await?;

        let (_gate, tx) = self.begin_write().await?;
        let result = async {
            seed_on(&tx).await?;
            let mut rows = tx.query("SELECT COUNT(*) FROM users", ()).await?;
            let existing = rows
                .next()
                .await?
                .ok_or(DatabaseError::NoResult)?
                .get::<i64>(0)?;
            let role = if existing == 0 { ROLE_ADMIN } else { ROLE_STAFF };

            let now = now_utc();
            let user = User {
                id: generate_id(&tx, PREFIX_USER).await?,
                name: input.name.trim().to_string(),
                email: input.email.trim().to_string(),
                role: role.to_string(),
                created_at: now,
                updated_at: now,
            };
            let ts = fmt_datetime(&now);
            tx.execute(
                "INSERT INTO users (id, name, email, role, password_hash, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                libsql::params![
                    user.id.as_str(),
                    user.name.as_str(),
                    user.email.as_str(),
                    user.role.as_str(),
                    password_hash.as_str(),
                    ts.as_str(),
                    ts.as_str()
                ],
            )
            .await
            .map_err(|e| DatabaseError::from_write(e, || email_taken(&user.email)))?;
            record_audit(&tx, actor, EntityType::User, &user.id, AuditAction::Created, None)
                .await?;
            Ok(user)
        }
        .await;
        let user = finish(tx, result).await?;
        info!(id = %user.id, role = %user.role, "user registered");
        Ok(user)
    }

    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn list_users(&self) -> Result<Vec<User>, DatabaseError> {
        let (_read, conn) = self.read().await;
        let mut rows = conn
            .query(
                &format!("SELECT {SELECT_COLS} FROM users ORDER BY name COLLATE NOCASE, rowid"),
                (),
            )
            .await?;
        let mut users = Vec::new();
        while let Some(row) = rows.next().await? {
            users.push(row_to_user(&row)?);
        }
        Ok(users)
    }

    /// # Errors
    ///
    /// Returns `NotFound` if no user has this id.
    pub async fn get_user(&self, id: &str) -> Result<User, DatabaseError> {
        let (_read, conn) = self.read().await;
        fetch_user(conn, id).await
    }

    /// The signed-in user's own record.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the account was deleted after the token was issued.
    pub async fn profile(&self, user_id: &str) -> Result<User, DatabaseError> {
        self.get_user(user_id).await
    }

    /// Case-insensitive lookup by email.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError> {
        let (_read, conn) = self.read().await;
        let mut rows = conn
            .query(
                &format!("SELECT {SELECT_COLS} FROM users WHERE email = ?1"),
                [email.trim()],
            )
            .await?;
        match rows.next().await? {
            Some(row) => Ok(Some(row_to_user(&row)?)),
            None => Ok(None),
        }
    }

    /// Check an email/password pair.
    ///
    /// Unknown emails and wrong passwords fail identically.
    ///
    /// # Errors
    ///
    /// Returns `Credential` when the pair does not match.
    pub async fn verify_credentials(
        &self,
        email: &str,
        password: &str,
    ) -> Result<User, DatabaseError> {
        let found = {
            let (_read, conn) = self.read().await;
            let mut rows = conn
                .query(
                    &format!("SELECT {SELECT_COLS}, password_hash FROM users WHERE email = ?1"),
                    [email.trim()],
                )
                .await?;
            match rows.next().await? {
                Some(row) => Some((row_to_user(&row)?, row.get::<String>(6)?)),
                None => None,
            }
        };

        let password = password.to_owned();
        let Some((user, stored)) = found else {
            tokio::task::spawn_blocking(move || verify_decoy(&password))
                .await
                .map_err(|e| DatabaseError::Other(e.into()))?;
            return Err(DatabaseError::Credential(BAD_CREDENTIALS.into()));
        };
        let matches = tokio::task::spawn_blocking(move || verify_password(&password, &stored))
            .await
            .map_err(|e| DatabaseError::Other(e.into()))?
            .map_err(|e| {
                warn!(id = %user.id, error = %e, "stored password hash is unreadable");
                DatabaseError::Credential(BAD_CREDENTIALS.into())
            })?;
        if matches {
            Ok(user)
        } else {
            Err(DatabaseError::Credential(BAD_CREDENTIALS.into()))
        }
    }

    /// Resolve a user id to an authenticated principal carrying the current
    /// permissions of their role. A role that no longer exists grants nothing.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the user does not exist.
    pub async fn principal_for(&self, user_id: &str) -> Result<Principal, DatabaseError> {
        let (_read, conn) = self.read().await;
        let user = fetch_user(conn, user_id).await?;
        let permissions = role_by_name(conn, &user.role)
            .await?
            .map(|role| role.permissions)
            .unwrap_or_default();
        Ok(Principal {
            user_id: user.id,
            email: user.email,
            name: user.name,
            role: user.role,
            permissions,
        })
    }

    /// # Errors
    ///
    /// Returns `NotFound`, `Validation` (including an unknown role), or
    /// `Conflict` for a taken email.
    pub async fn update_user(
        &self,
        actor: Option<&str>,
        id: &str,
        update: &UserUpdate,
    ) -> Result<User, DatabaseError> {
        update.validate()?;
        let password_hash = match update.password.as_deref() {
            Some(password) => Some(hash(password).await?),
            None => None,
        };

        let (_gate, tx) = self.begin_write().await?;
        let result = async {
            fetch_user(&tx, id).await?;

            let mut set = SetClause::default();
            if let Some(ref name) = update.name {
                set.push("name", name.trim());
            }
            if let Some(ref email) = update.email {
                set.push("email", email.trim());
            }
            if let Some(ref role) = update.role {
                if role_by_name(&tx, role.trim()).await?.is_none() {
                    return Err(DatabaseError::Validation(format!("unknown role '{role}'")));
                }
                set.push("role", role.trim());
            }
            if let Some(ref password_hash) = password_hash {
                set.push("password_hash", password_hash.as_str());
            }
            if set.is_empty() {
                return fetch_user(&tx, id).await;
            }
            set.push("updated_at", fmt_datetime(&now_utc()));

            let (sql, params) = set.into_sql("users", id);
            tx.execute(&sql, libsql::params_from_iter(params))
                .await
                .map_err(|e| {
                    DatabaseError::from_write(e, || {
                        email_taken(update.email.as_deref().unwrap_or_default())
                    })
                })?;
            record_audit(
                &tx,
                actor,
                EntityType::User,
                id,
                AuditAction::Updated,
                Some(serde_json::to_value(update)?),
            )
            .await?;
            fetch_user(&tx, id).await
        }
        .await;
        finish(tx, result).await
    }

    /// Delete a user. A linked employee record keeps existing, unlinked.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if no user has this id.
    pub async fn delete_user(&self, actor: Option<&str>, id: &str) -> Result<(), DatabaseError> {
        let (_gate, tx) = self.begin_write().await?;
        let result = async {
            let changed = tx.execute("DELETE FROM users WHERE id = ?1", [id]).await?;
            if changed == 0 {
                return Err(DatabaseError::not_found("user", id));
            }
            record_audit(&tx, actor, EntityType::User, id, AuditAction::Deleted, None).await?;
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
    use crate::test_support::helpers::{seed_user, test_service};
    use crate::updates::user::UserUpdateBuilder;
    use desk_core::permissions::Permission;

    #[tokio::test]
    async fn first_user_is_admin_rest_are_staff() {
        let svc = test_service().await;
        let first = seed_user(&svc, "owner@shop.test").await;
        let second = seed_user(&svc, "clerk@shop.test").await;
        assert_eq!(first.role, ROLE_ADMIN);
        assert_eq!(second.role, ROLE_STAFF);
        assert_eq!(svc.list_roles().await.unwrap().len(), 3, "roles seeded");
    }

    #[tokio::test]
    async fn duplicate_email_ignores_case() {
        let svc = test_service().await;
        seed_user(&svc, "owner@shop.test").await;
        let err = svc
            .create_user(
                None,
                &NewUser {
                    name: "Again".into(),
                    email: "OWNER@shop.test".into(),
                    password: "secret1".into(),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DatabaseError::Conflict(_)), "{err}");
    }

    #[tokio::test]
    async fn short_password_rejected() {
        let svc = test_service().await;
        let err = svc
            .create_user(
                None,
                &NewUser {
                    name: "Short".into(),
                    email: "s@shop.test".into(),
                    password: "12345".into(),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DatabaseError::Validation(_)));
    }

    #[tokio::test]
    async fn verify_credentials_accepts_only_the_right_password() {
        let svc = test_service().await;
        let user = seed_user(&svc, "owner@shop.test").await;

        let ok = svc
            .verify_credentials("Owner@Shop.test", "correct horse")
            .await
            .unwrap();
        assert_eq!(ok.id, user.id);

        for (email, password) in [
            ("owner@shop.test", "wrong horse"),
            ("nobody@shop.test", "correct horse"),
        ] {
            let err = svc.verify_credentials(email, password).await.unwrap_err();
            assert_eq!(err.to_string(), format!("Credential error: {BAD_CREDENTIALS}"));
        }
    }

    #[tokio::test]
    async fn unknown_email_is_checked_off_the_async_worker() {
        let svc = test_service().await;
        seed_user(&svc, "owner@shop.test").await;

        let login = svc.verify_credentials("nobody@shop.test", "whatever1");
        tokio::pin!(login);
        let ticked = tokio::select! {
            biased;
            _ = &mut login => false,
            () = tokio::time::sleep(std::time::Duration::from_millis(5)) => true,
        };
        assert!(ticked, "login completed without yielding to the runtime");
        let err = login.await.unwrap_err();
        assert_eq!(err.to_string(), format!("Credential error: {BAD_CREDENTIALS}"));
    }

    #[tokio::test]
    async fn password_change_rehashes() {
        let svc = test_service().await;
        let user = seed_user(&svc, "owner@shop.test").await;
        let update = UserUpdateBuilder::new().password("new password").build();
        svc.update_user(None, &user.id, &update).await.unwrap();

        assert!(
            svc.verify_credentials("owner@shop.test", "correct horse")
                .await
                .is_err()
        );
        svc.verify_credentials("owner@shop.test", "new password")
            .await
            .unwrap();

        let audit = svc
            .query_audit(&AuditFilter {
                entity_id: Some(user.id.clone()),
                action: Some(AuditAction::Updated),
                ..Default::default()
            })
            .await
            .unwrap();
        let detail = audit[0].detail.as_ref().unwrap();
        assert!(detail.get("password").is_none(), "password never audited");
    }

    #[tokio::test]
    async fn role_change_must_name_existing_role() {
        let svc = test_service().await;
        seed_user(&svc, "owner@shop.test").await;
        let clerk = seed_user(&svc, "clerk@shop.test").await;

        let err = svc
            .update_user(None, &clerk.id, &UserUpdateBuilder::new().role("GOD").build())
            .await
            .unwrap_err();
        assert!(matches!(err, DatabaseError::Validation(_)));

        let promoted = svc
            .update_user(None, &clerk.id, &UserUpdateBuilder::new().role("MANAGER").build())
            .await
            .unwrap();
        assert_eq!(promoted.role, "MANAGER");
    }

    #[tokio::test]
    async fn principal_carries_role_permissions() {
        let svc = test_service().await;
        let admin = seed_user(&svc, "owner@shop.test").await;
        let staff = seed_user(&svc, "clerk@shop.test").await;

        let admin = svc.principal_for(&admin.id).await.unwrap();
        assert!(admin.can(Permission::UsersManage));

        let staff = svc.principal_for(&staff.id).await.unwrap();
        assert!(staff.can(Permission::InventoryView));
        assert!(!staff.can(Permission::InventoryManage));
    }

    #[tokio::test]
    async fn delete_unlinks_employee() {
        let svc = test_service().await;
        let user = seed_user(&svc, "owner@shop.test").await;
        let mut input = crate::repos::employee::tests::new_employee("E-1", "e@shop.test");
        input.user_id = Some(user.id.clone());
        let employee = svc.create_employee(None, &input).await.unwrap();

        svc.delete_user(None, &user.id).await.unwrap();
        let employee = svc.get_employee(&employee.id).await.unwrap();
        assert_eq!(employee.user_id, None);
        assert!(svc.profile(&user.id).await.is_err());
    }
}
