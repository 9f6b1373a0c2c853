//! Shared handler state.

use std::sync::Arc;

use desk_auth::TokenIssuer;
use desk_db::service::DeskService;

/// Everything a request handler needs: storage and token signing.
pub struct ServerState {
    pub service: DeskService,
    pub tokens: TokenIssuer,
}

pub type AppState = Arc<ServerState>;

impl ServerState {
    #[must_use]
    pub fn shared(service: DeskService, tokens: TokenIssuer) -> AppState {
        Arc::new(Self { service, tokens })
    }
}
