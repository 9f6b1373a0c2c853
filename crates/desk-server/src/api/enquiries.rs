use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Extension, Json, Router};
use desk_core::entities::Enquiry;
use desk_core::identity::Principal;
use desk_core::inputs::NewEnquiry;
use desk_core::permissions::Permission;
use desk_core::responses::DeletedResponse;

use super::middleware::require;
use crate::error::ApiError;
use crate::extract::ApiJson;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/enquiries", get(list_enquiries).post(create_enquiry))
        .route("/enquiries/{id}", get(get_enquiry).delete(delete_enquiry))
}

async fn list_enquiries(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> Result<Json<Vec<Enquiry>>, ApiError> {
    require(&principal, Permission::CrmManage)?;
    Ok(Json(state.service.list_enquiries().await?))
}

async fn create_enquiry(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    ApiJson(input): ApiJson<NewEnquiry>,
) -> Result<(StatusCode, Json<Enquiry>), ApiError> {
    require(&principal, Permission::CrmManage)?;
    let enquiry = state
        .service
        .create_enquiry(Some(principal.user_id.as_str()), &input)
        .await?;
    Ok((StatusCode::CREATED, Json(enquiry)))
}

async fn get_enquiry(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
) -> Result<Json<Enquiry>, ApiError> {
    require(&principal, Permission::CrmManage)?;
    Ok(Json(state.service.get_enquiry(&id).await?))
}

async fn delete_enquiry(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
) -> Result<Json<DeletedResponse>, ApiError> {
    require(&principal, Permission::CrmManage)?;
    state
        .service
        .delete_enquiry(Some(principal.user_id.as_str()), &id)
        .await?;
    Ok(Json(DeletedResponse::new(id)))
}
