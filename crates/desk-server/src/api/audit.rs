use axum::extract::State;
use axum::routing::get;
use axum::{Extension, Json, Router};
use desk_core::entities::AuditEntry;
use desk_core::enums::{AuditAction, EntityType};
use desk_core::identity::Principal;
use desk_core::permissions::Permission;
use desk_db::repos::audit::AuditFilter;
use serde::Deserialize;

use super::middleware::require;
use crate::error::ApiError;
use crate::extract::ApiQuery;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/audit", get(query_audit))
}

#[derive(Debug, Deserialize)]
struct AuditParams {
    entity_type: Option<EntityType>,
    entity_id: Option<String>,
    action: Option<AuditAction>,
    actor: Option<String>,
    limit: Option<u32>,
}

impl From<AuditParams> for AuditFilter {
    fn from(params: AuditParams) -> Self {
        Self {
            entity_type: params.entity_type,
            entity_id: params.entity_id,
            action: params.action,
            actor: params.actor,
            limit: params.limit,
        }
    }
}

async fn query_audit(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    ApiQuery(params): ApiQuery<AuditParams>,
) -> Result<Json<Vec<AuditEntry>>, ApiError> {
    require(&principal, Permission::UsersManage)?;
    let filter = AuditFilter::from(params);
    Ok(Json(state.service.query_audit(&filter).await?))
}
