use axum::extract::{Path, State};
use axum::routing::{delete, get, patch};
use axum::{Extension, Json, Router};
use desk_core::entities::Notification;
use desk_core::identity::Principal;
use desk_core::responses::{DeletedResponse, UnreadCount};

use super::LimitParams;
use crate::error::ApiError;
use crate::extract::ApiQuery;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/notifications", get(list_notifications))
        .route("/notifications/unread-count", get(unread_count))
        .route("/notifications/{id}/read", patch(mark_read))
        .route("/notifications/{id}", delete(delete_notification))
}

async fn list_notifications(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<LimitParams>,
) -> Result<Json<Vec<Notification>>, ApiError> {
    Ok(Json(state.service.list_notifications(params.limit).await?))
}

async fn unread_count(State(state): State<AppState>) -> Result<Json<UnreadCount>, ApiError> {
    let count = state.service.unread_notification_count().await?;
    Ok(Json(UnreadCount { count }))
}

async fn mark_read(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Notification>, ApiError> {
    Ok(Json(state.service.mark_notification_read(&id).await?))
}

async fn delete_notification(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
) -> Result<Json<DeletedResponse>, ApiError> {
    state
        .service
        .delete_notification(Some(principal.user_id.as_str()), &id)
        .await?;
    Ok(Json(DeletedResponse::new(id)))
}
