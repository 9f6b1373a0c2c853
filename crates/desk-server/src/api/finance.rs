use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Extension, Json, Router};
use desk_core::entities::Expense;
use desk_core::identity::Principal;
use desk_core::inputs::NewExpense;
use desk_core::permissions::Permission;
use desk_core::responses::{DeletedResponse, FinancialSummary};
use desk_db::updates::expense::ExpenseUpdate;

use super::middleware::require;
use crate::error::ApiError;
use crate::extract::ApiJson;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/finance/expenses", get(list_expenses).post(create_expense))
        .route(
            "/finance/expenses/{id}",
            get(get_expense).patch(update_expense).delete(delete_expense),
        )
        .route("/finance/summary", get(summary))
}

async fn list_expenses(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> Result<Json<Vec<Expense>>, ApiError> {
    require(&principal, Permission::FinanceView)?;
    Ok(Json(state.service.list_expenses().await?))
}

async fn create_expense(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    ApiJson(input): ApiJson<NewExpense>,
) -> Result<(StatusCode, Json<Expense>), ApiError> {
    require(&principal, Permission::FinanceManage)?;
    let expense = state
        .service
        .create_expense(Some(principal.user_id.as_str()), &input)
        .await?;
    Ok((StatusCode::CREATED, Json(expense)))
}

async fn get_expense(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
) -> Result<Json<Expense>, ApiError> {
    require(&principal, Permission::FinanceView)?;
    Ok(Json(state.service.get_expense(&id).await?))
}

async fn update_expense(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
    ApiJson(update): ApiJson<ExpenseUpdate>,
) -> Result<Json<Expense>, ApiError> {
    require(&principal, Permission::FinanceManage)?;
    let expense = state
        .service
        .update_expense(Some(principal.user_id.as_str()), &id, &update)
        .await?;
    Ok(Json(expense))
}

async fn delete_expense(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
) -> Result<Json<DeletedResponse>, ApiError> {
    require(&principal, Permission::FinanceManage)?;
    state
        .service
        .delete_expense(Some(principal.user_id.as_str()), &id)
        .await?;
    Ok(Json(DeletedResponse::new(id)))
}

async fn summary(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> Result<Json<FinancialSummary>, ApiError> {
    require(&principal, Permission::FinanceView)?;
    Ok(Json(state.service.financial_summary().await?))
}
