use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, patch};
use axum::{Extension, Json, Router};
use desk_core::entities::Product;
use desk_core::identity::Principal;
use desk_core::inputs::NewProduct;
use desk_core::permissions::Permission;
use desk_core::responses::DeletedResponse;
use desk_db::updates::product::ProductUpdate;
use serde::Deserialize;

use super::SearchParams;
use super::middleware::require;
use crate::error::ApiError;
use crate::extract::{ApiJson, ApiQuery};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/products", get(list_products).post(create_product))
        .route("/products/low-stock", get(low_stock))
        .route("/products/search", get(search_products))
        .route(
            "/products/{id}",
            get(get_product).patch(update_product).delete(delete_product),
        )
        .route("/products/{id}/stock", patch(adjust_stock))
}

/// Body of `PATCH /products/{id}/stock`: signed unit change.
#[derive(Debug, Deserialize)]
struct StockAdjustment {
    delta: i64,
}

async fn list_products(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> Result<Json<Vec<Product>>, ApiError> {
    require(&principal, Permission::InventoryView)?;
    Ok(Json(state.service.list_products().await?))
}

async fn create_product(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    ApiJson(input): ApiJson<NewProduct>,
) -> Result<(StatusCode, Json<Product>), ApiError> {
    require(&principal, Permission::InventoryManage)?;
    let product = state
        .service
        .create_product(Some(principal.user_id.as_str()), &input)
        .await?;
    Ok((StatusCode::CREATED, Json(product)))
}

async fn low_stock(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> Result<Json<Vec<Product>>, ApiError> {
    require(&principal, Permission::InventoryView)?;
    Ok(Json(state.service.low_stock_products().await?))
}

async fn search_products(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    ApiQuery(params): ApiQuery<SearchParams>,
) -> Result<Json<Vec<Product>>, ApiError> {
    require(&principal, Permission::InventoryView)?;
    let limit = params
        .limit
        .unwrap_or(state.service.settings().default_limit);
    Ok(Json(state.service.search_products(&params.q, limit).await?))
}

async fn get_product(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
) -> Result<Json<Product>, ApiError> {
    require(&principal, Permission::InventoryView)?;
    Ok(Json(state.service.get_product(&id).await?))
}

async fn update_product(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
    ApiJson(update): ApiJson<ProductUpdate>,
) -> Result<Json<Product>, ApiError> {
    require(&principal, Permission::InventoryManage)?;
    let product = state
        .service
        .update_product(Some(principal.user_id.as_str()), &id, &update)
        .await?;
    Ok(Json(product))
}

async fn delete_product(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
) -> Result<Json<DeletedResponse>, ApiError> {
    require(&principal, Permission::InventoryManage)?;
    state
        .service
        .delete_product(Some(principal.user_id.as_str()), &id)
        .await?;
    Ok(Json(DeletedResponse::new(id)))
}

async fn adjust_stock(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
    ApiJson(input): ApiJson<StockAdjustment>,
) -> Result<Json<Product>, ApiError> {
    require(&principal, Permission::InventoryManage)?;
    let product = state
        .service
        .adjust_stock(Some(principal.user_id.as_str()), &id, input.delta)
        .await?;
    Ok(Json(product))
}
