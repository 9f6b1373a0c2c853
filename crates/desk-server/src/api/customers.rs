use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Extension, Json, Router};
use desk_core::entities::Customer;
use desk_core::identity::Principal;
use desk_core::inputs::NewCustomer;
use desk_core::permissions::Permission;
use desk_core::responses::DeletedResponse;
use desk_db::updates::customer::CustomerUpdate;

use super::SearchParams;
use super::middleware::require;
use crate::error::ApiError;
use crate::extract::{ApiJson, ApiQuery};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/customers", get(list_customers).post(create_customer))
        .route("/customers/search", get(search_customers))
        .route(
            "/customers/{id}",
            get(get_customer)
                .patch(update_customer)
                .delete(delete_customer),
        )
}

async fn list_customers(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> Result<Json<Vec<Customer>>, ApiError> {
    require(&principal, Permission::CrmManage)?;
    Ok(Json(state.service.list_customers().await?))
}

async fn create_customer(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    ApiJson(input): ApiJson<NewCustomer>,
) -> Result<(StatusCode, Json<Customer>), ApiError> {
    require(&principal, Permission::CrmManage)?;
    let customer = state
        .service
        .create_customer(Some(principal.user_id.as_str()), &input)
        .await?;
    Ok((StatusCode::CREATED, Json(customer)))
}

async fn search_customers(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    ApiQuery(params): ApiQuery<SearchParams>,
) -> Result<Json<Vec<Customer>>, ApiError> {
    require(&principal, Permission::CrmManage)?;
    let limit = params
        .limit
        .unwrap_or(state.service.settings().default_limit);
    Ok(Json(state.service.search_customers(&params.q, limit).await?))
}

async fn get_customer(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
) -> Result<Json<Customer>, ApiError> {
    require(&principal, Permission::CrmManage)?;
    Ok(Json(state.service.get_customer(&id).await?))
}

async fn update_customer(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
    ApiJson(update): ApiJson<CustomerUpdate>,
) -> Result<Json<Customer>, ApiError> {
    require(&principal, Permission::CrmManage)?;
    let customer = state
        .service
        .update_customer(Some(principal.user_id.as_str()), &id, &update)
        .await?;
    Ok(Json(customer))
}

async fn delete_customer(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
) -> Result<Json<DeletedResponse>, ApiError> {
    require(&principal, Permission::CrmManage)?;
    state
        .service
        .delete_customer(Some(principal.user_id.as_str()), &id)
        .await?;
    Ok(Json(DeletedResponse::new(id)))
}
