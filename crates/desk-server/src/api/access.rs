use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, patch};
use axum::{Extension, Json, Router};
use desk_core::entities::{Role, User};
use desk_core::identity::Principal;
use desk_core::inputs::{NewRole, NewUser};
use desk_core::permissions::Permission;
use desk_core::responses::DeletedResponse;
use desk_db::updates::role::RoleUpdate;
use desk_db::updates::user::UserUpdate;

use super::middleware::require;
use crate::error::ApiError;
use crate::extract::ApiJson;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users).post(create_user))
        .route("/users/roles", get(list_roles).post(create_role))
        .route("/users/roles/{id}", patch(update_role).delete(delete_role))
        .route(
            "/users/{id}",
            get(get_user).patch(update_user).delete(delete_user),
        )
}

async fn list_users(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> Result<Json<Vec<User>>, ApiError> {
    require(&principal, Permission::UsersManage)?;
    Ok(Json(state.service.list_users().await?))
}

async fn create_user(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    ApiJson(input): ApiJson<NewUser>,
) -> Result<(StatusCode, Json<User>), ApiError> {
    require(&principal, Permission::UsersManage)?;
    let user = state
        .service
        .create_user(Some(principal.user_id.as_str()), &input)
        .await?;
    Ok((StatusCode::CREATED, Json(user)))
}

async fn get_user(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
) -> Result<Json<User>, ApiError> {
    require(&principal, Permission::UsersManage)?;
    Ok(Json(state.service.get_user(&id).await?))
}

async fn update_user(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
    ApiJson(update): ApiJson<UserUpdate>,
) -> Result<Json<User>, ApiError> {
    require(&principal, Permission::UsersManage)?;
    let user = state
        .service
        .update_user(Some(principal.user_id.as_str()), &id, &update)
        .await?;
    Ok(Json(user))
}

async fn delete_user(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
) -> Result<Json<DeletedResponse>, ApiError> {
    require(&principal, Permission::UsersManage)?;
    if id == principal.user_id {
        return Err(ApiError::Conflict("cannot delete your own account".into()));
    }
    state
        .service
        .delete_user(Some(principal.user_id.as_str()), &id)
        .await?;
    Ok(Json(DeletedResponse::new(id)))
}

async fn list_roles(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> Result<Json<Vec<Role>>, ApiError> {
    require(&principal, Permission::UsersManage)?;
    Ok(Json(state.service.list_roles().await?))
}

async fn create_role(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    ApiJson(input): ApiJson<NewRole>,
) -> Result<(StatusCode, Json<Role>), ApiError> {
    require(&principal, Permission::UsersManage)?;
    let role = state
        .service
        .create_role(Some(principal.user_id.as_str()), &input)
        .await?;
    Ok((StatusCode::CREATED, Json(role)))
}

async fn update_role(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
    ApiJson(update): ApiJson<RoleUpdate>,
) -> Result<Json<Role>, ApiError> {
    require(&principal, Permission::UsersManage)?;
    let role = state
        .service
        .update_role(Some(principal.user_id.as_str()), &id, &update)
        .await?;
    Ok(Json(role))
}

async fn delete_role(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
) -> Result<Json<DeletedResponse>, ApiError> {
    require(&principal, Permission::UsersManage)?;
    state
        .service
        .delete_role(Some(principal.user_id.as_str()), &id)
        .await?;
    Ok(Json(DeletedResponse::new(id)))
}
