//! Application state shared across all handlers and middleware.

use std::sync::Arc;

use warden_auth::SessionManager;
use warden_core::config::AppConfig;

use crate::middleware::rate_limit::RateLimiter;

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
/// All fields are `Arc`-wrapped for cheap cloning across tasks.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<AppConfig>,
    /// Session lifecycle engine
    pub session_manager: Arc<SessionManager>,
    /// Fixed-window limiter for the refresh endpoint
    pub refresh_limiter: Arc<RateLimiter>,
}

impl AppState {
    /// Assemble the state, sizing the refresh limiter from `config.rate_limit`.
    pub fn new(config: AppConfig, session_manager: SessionManager) -> Self {
        let refresh_limiter = RateLimiter::from_config(&config.rate_limit);
        Self {
            config: Arc::new(config),
            session_manager: Arc::new(session_manager),
            refresh_limiter: Arc::new(refresh_limiter),
        }
    }
}
