//! HTTP routes.
//!
//! Each area module exposes `routes()`; [`build_router`] merges them and wraps
//! the whole tree in the bearer-token middleware.

pub mod middleware;

mod access;
mod audit;
mod auth;
mod customers;
mod enquiries;
mod finance;
mod hr;
mod meta;
mod notifications;
mod orders;
mod products;
mod transactions;

use axum::Router;
use serde::Deserialize;

use crate::state::AppState;

/// Build the full API router.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(meta::routes())
        .merge(auth::routes())
        .merge(products::routes())
        .merge(transactions::routes())
        .merge(orders::routes())
        .merge(customers::routes())
        .merge(enquiries::routes())
        .merge(hr::routes())
        .merge(finance::routes())
        .merge(notifications::routes())
        .merge(access::routes())
        .merge(audit::routes())
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::auth_middleware,
        ))
        .with_state(state)
}

/// `?q=&limit=` for the search routes.
#[derive(Debug, Deserialize)]
struct SearchParams {
    #[serde(default)]
    q: String,
    limit: Option<u32>,
}

/// `?limit=` for feed routes.
#[derive(Debug, Deserialize)]
struct LimitParams {
    limit: Option<u32>,
}
