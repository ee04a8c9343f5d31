//! Route definitions for the Warden HTTP API.
//!
//! All routes are mounted under `/api`. The router receives `AppState` and
//! passes it to all handlers via Axum's `State` extractor.

use axum::{
    Router, middleware as axum_middleware,
    routing::{get, post},
};

use crate::handlers;
use crate::middleware;
use crate::state::AppState;

/// Build the API router with all routes.
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .merge(auth_routes(state.clone()))
        .merge(health_routes());

    Router::new().nest("/api", api_routes).with_state(state)
}

/// Auth endpoints: login, refresh-token, revoke-token, check-session
fn auth_routes(state: AppState) -> Router<AppState> {
    let refresh = Router::new()
        .route("/auth/refresh-token", post(handlers::auth::refresh_token))
        .route_layer(axum_middleware::from_fn_with_state(
            state,
            middleware::rate_limit::refresh_rate_limit,
        ));

    Router::new()
        .route("/auth/login", post(handlers::auth::login))
        .route("/auth/revoke-token", post(handlers::auth::revoke_token))
        .route("/auth/check-session", get(handlers::auth::check_session))
        .merge(refresh)
}

/// Health check endpoints (no auth required)
fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(handlers::health::health))
}
