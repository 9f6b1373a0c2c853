use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, patch};
use axum::{Extension, Json, Router};
use desk_core::entities::Order;
use desk_core::enums::OrderStatus;
use desk_core::identity::Principal;
use desk_core::inputs::NewOrder;
use desk_core::permissions::Permission;
use desk_core::responses::DeletedResponse;
use desk_db::updates::order::OrderUpdate;
use serde::Deserialize;

use super::middleware::require;
use crate::error::ApiError;
use crate::extract::ApiJson;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/orders", get(list_orders).post(create_order))
        .route(
            "/orders/{id}",
            get(get_order).patch(update_order).delete(delete_order),
        )
        .route("/orders/{id}/status", patch(update_status))
}

#[derive(Debug, Deserialize)]
struct StatusChange {
    status: OrderStatus,
}

async fn list_orders(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> Result<Json<Vec<Order>>, ApiError> {
    require(&principal, Permission::OrdersManage)?;
    Ok(Json(state.service.list_orders().await?))
}

async fn create_order(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    ApiJson(input): ApiJson<NewOrder>,
) -> Result<(StatusCode, Json<Order>), ApiError> {
    require(&principal, Permission::OrdersManage)?;
    let order = state
        .service
        .create_order(Some(principal.user_id.as_str()), &input)
        .await?;
    Ok((StatusCode::CREATED, Json(order)))
}

async fn get_order(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
) -> Result<Json<Order>, ApiError> {
    require(&principal, Permission::OrdersManage)?;
    Ok(Json(state.service.get_order(&id).await?))
}

async fn update_order(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
    ApiJson(update): ApiJson<OrderUpdate>,
) -> Result<Json<Order>, ApiError> {
    require(&principal, Permission::OrdersManage)?;
    let order = state
        .service
        .update_order(Some(principal.user_id.as_str()), &id, &update)
        .await?;
    Ok(Json(order))
}

async fn update_status(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
    ApiJson(input): ApiJson<StatusChange>,
) -> Result<Json<Order>, ApiError> {
    require(&principal, Permission::OrdersManage)?;
    let order = state
        .service
        .update_order_status(Some(principal.user_id.as_str()), &id, input.status)
        .await?;
    Ok(Json(order))
}

async fn delete_order(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
) -> Result<Json<DeletedResponse>, ApiError> {
    require(&principal, Permission::OrdersManage)?;
    state
        .service
        .delete_order(Some(principal.user_id.as_str()), &id)
        .await?;
    Ok(Json(DeletedResponse::new(id)))
}
