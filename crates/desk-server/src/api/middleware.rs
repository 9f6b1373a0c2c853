use axum::extract::{Request, State};
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::Response;
use desk_auth::AuthError;
use desk_core::identity::Principal;
use desk_core::permissions::Permission;
use desk_db::error::DatabaseError;
use tracing::debug;

use crate::error::ApiError;
use crate::state::AppState;

/// Paths that don't require authentication.
const PUBLIC_PATHS: &[&str] = &[
    "/health",
    "/version",
    "/auth/login",
    "/auth/register",
    "/meta/schema",
];

/// Bearer token authentication.
///
/// Verifies the token, loads the caller's current role permissions and stores
/// the resulting [`Principal`] as a request extension for handlers to extract
/// via `Extension<Principal>`.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if is_public_path(req.uri().path()) {
        return Ok(next.run(req).await);
    }

    let token = extract_bearer(req.headers()).ok_or(AuthError::NotAuthenticated)?;
    let claims = state.tokens.verify(token)?;
    let principal = match state.service.principal_for(&claims.sub).await {
        Ok(principal) => principal,
        Err(DatabaseError::NotFound { .. }) => {
            debug!(user = %claims.sub, "token for a deleted user");
            return Err(AuthError::NotAuthenticated.into());
        }
        Err(e) => return Err(e.into()),
    };

    req.extensions_mut().insert(principal);
    Ok(next.run(req).await)
}

/// Reject callers whose role does not grant `permission`.
///
/// # Errors
///
/// Returns `ApiError::Forbidden` naming the missing permission.
pub fn require(principal: &Principal, permission: Permission) -> Result<(), ApiError> {
    if principal.can(permission) {
        Ok(())
    } else {
        Err(ApiError::Forbidden(format!(
            "permission denied: requires {permission}"
        )))
    }
}

fn extract_bearer(headers: &HeaderMap) -> Option<&str> {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

fn is_public_path(path: &str) -> bool {
    PUBLIC_PATHS.contains(&path.trim_end_matches('/'))
}
