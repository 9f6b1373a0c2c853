//! # desk-server
//!
//! JSON-over-HTTP API for Shopdesk, built on axum.
//!
//! Every route except `/health`, `/version`, `/meta/schema`, `/auth/login`
//! and `/auth/register` needs a bearer token. Handlers check the caller's role
//! permissions, pass the caller's user ID to the storage layer as the audit
//! actor, and render failures as `{"error": "<message>"}`.

pub mod api;
pub mod error;
pub mod extract;
pub mod state;

use std::net::SocketAddr;
use std::path::Path;

use desk_auth::TokenIssuer;
use desk_config::DeskConfig;
use desk_db::service::{DeskService, ServiceSettings};
use tokio::net::TcpListener;
use tracing::info;

pub use api::build_router;
pub use error::{ApiError, ServeError};
pub use state::{AppState, ServerState};

/// Open the database and token issuer described by `config`.
///
/// Seeds the default roles on a fresh database.
///
/// # Errors
///
/// Returns `ServeError` when no signing secret is configured or the database
/// cannot be opened.
pub async fn state_from_config(
    config: &DeskConfig,
    project_dir: &Path,
) -> Result<AppState, ServeError> {
    let secret = config.auth.require_jwt_secret()?;
    let tokens = TokenIssuer::new(secret, config.auth.token_ttl_secs)?;

    let db_path = config.database.resolved_path(project_dir);
    let service = DeskService::new_local(
        &db_path.to_string_lossy(),
        ServiceSettings::from_config(config),
    )
    .await?;
    service.seed_default_roles().await?;

    Ok(ServerState::shared(service, tokens))
}

/// Serve the API on `addr` until Ctrl-C.
///
/// # Errors
///
/// Returns `ServeError::Io` if the address cannot be bound.
pub async fn serve(state: AppState, addr: SocketAddr) -> Result<(), ServeError> {
    let listener = TcpListener::bind(addr).await?;
    info!(addr = %listener.local_addr()?, "shopdesk API listening");
    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("shopdesk API stopped");
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        std::future::pending::<()>().await;
    }
}
