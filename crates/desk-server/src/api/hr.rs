use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Extension, Json, Router};
use chrono::{NaiveDate, Utc};
use desk_core::entities::{Attendance, Employee};
use desk_core::identity::Principal;
use desk_core::inputs::{NewAttendance, NewEmployee};
use desk_core::permissions::Permission;
use desk_core::responses::DeletedResponse;
use desk_db::updates::employee::EmployeeUpdate;
use serde::Deserialize;

use super::middleware::require;
use crate::error::ApiError;
use crate::extract::{ApiJson, ApiQuery};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/hr/employees", get(list_employees).post(create_employee))
        .route(
            "/hr/employees/{id}",
            get(get_employee)
                .patch(update_employee)
                .delete(delete_employee),
        )
        .route("/hr/attendance", get(list_attendance).post(log_attendance))
}

/// `GET /hr/attendance` filter: one employee's history, or one day's records.
#[derive(Debug, Deserialize)]
struct AttendanceParams {
    employee_id: Option<String>,
    date: Option<NaiveDate>,
}

async fn list_employees(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> Result<Json<Vec<Employee>>, ApiError> {
    require(&principal, Permission::HrView)?;
    Ok(Json(state.service.list_employees().await?))
}

async fn create_employee(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    ApiJson(input): ApiJson<NewEmployee>,
) -> Result<(StatusCode, Json<Employee>), ApiError> {
    require(&principal, Permission::HrManage)?;
    let employee = state
        .service
        .create_employee(Some(principal.user_id.as_str()), &input)
        .await?;
    Ok((StatusCode::CREATED, Json(employee)))
}

async fn get_employee(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
) -> Result<Json<Employee>, ApiError> {
    require(&principal, Permission::HrView)?;
    Ok(Json(state.service.get_employee(&id).await?))
}

async fn update_employee(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
    ApiJson(update): ApiJson<EmployeeUpdate>,
) -> Result<Json<Employee>, ApiError> {
    require(&principal, Permission::HrManage)?;
    let employee = state
        .service
        .update_employee(Some(principal.user_id.as_str()), &id, &update)
        .await?;
    Ok(Json(employee))
}

async fn delete_employee(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
) -> Result<Json<DeletedResponse>, ApiError> {
    require(&principal, Permission::HrManage)?;
    state
        .service
        .delete_employee(Some(principal.user_id.as_str()), &id)
        .await?;
    Ok(Json(DeletedResponse::new(id)))
}

async fn log_attendance(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    ApiJson(input): ApiJson<NewAttendance>,
) -> Result<(StatusCode, Json<Attendance>), ApiError> {
    require(&principal, Permission::AttendanceLog)?;
    let record = state
        .service
        .log_attendance(Some(principal.user_id.as_str()), &input)
        .await?;
    Ok((StatusCode::CREATED, Json(record)))
}

async fn list_attendance(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    ApiQuery(params): ApiQuery<AttendanceParams>,
) -> Result<Json<Vec<Attendance>>, ApiError> {
    require(&principal, Permission::HrView)?;
    let records = match params.employee_id {
        Some(employee_id) => state.service.attendance_for_employee(&employee_id).await?,
        None => {
            let date = params.date.unwrap_or_else(|| Utc::now().date_naive());
            state.service.attendance_on_date(date).await?
        }
    };
    Ok(Json(records))
}
