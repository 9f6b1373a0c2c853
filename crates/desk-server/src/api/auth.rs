use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use desk_core::entities::User;
use desk_core::identity::Principal;
use desk_core::inputs::NewUser;
use desk_core::responses::LoginResponse;
use serde::Deserialize;
use tracing::info;

use crate::error::ApiError;
use crate::extract::ApiJson;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/auth/login", post(login))
        .route("/auth/register", post(register))
        .route("/auth/profile", get(profile))
}

#[derive(Debug, Deserialize)]
struct LoginRequest {
    email: String,
    password: String,
}

async fn login(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let user = state
        .service
        .verify_credentials(&input.email, &input.password)
        .await?;
    let token = state.tokens.issue(&user)?;
    info!(user = %user.id, "login");
    Ok(Json(LoginResponse { token, user }))
}

async fn register(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<NewUser>,
) -> Result<(StatusCode, Json<User>), ApiError> {
    let user = state.service.create_user(None, &input).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

async fn profile(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> Result<Json<User>, ApiError> {
    Ok(Json(state.service.profile(&principal.user_id).await?))
}
