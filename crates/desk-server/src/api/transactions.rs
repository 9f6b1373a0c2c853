use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Extension, Json, Router};
use desk_core::entities::Transaction;
use desk_core::identity::Principal;
use desk_core::inputs::NewTransaction;
use desk_core::permissions::Permission;

use super::middleware::require;
use crate::error::ApiError;
use crate::extract::ApiJson;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/transactions",
            get(list_transactions).post(create_transaction),
        )
        .route("/transactions/{id}", get(get_transaction))
}

async fn list_transactions(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> Result<Json<Vec<Transaction>>, ApiError> {
    require(&principal, Permission::PosAccess)?;
    Ok(Json(state.service.list_transactions().await?))
}

async fn create_transaction(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    ApiJson(input): ApiJson<NewTransaction>,
) -> Result<(StatusCode, Json<Transaction>), ApiError> {
    require(&principal, Permission::PosAccess)?;
    let sale = state
        .service
        .create_transaction(Some(principal.user_id.as_str()), &input)
        .await?;
    Ok((StatusCode::CREATED, Json(sale)))
}

async fn get_transaction(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
) -> Result<Json<Transaction>, ApiError> {
    require(&principal, Permission::PosAccess)?;
    Ok(Json(state.service.get_transaction(&id).await?))
}
