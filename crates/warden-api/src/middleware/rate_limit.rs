//! Fixed-window rate limiter middleware.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;
use tokio::sync::Mutex;

use warden_core::config::rate_limit::RateLimitConfig;

use crate::error::ApiError;
use crate::extractors::client::client_ip;
use crate::state::AppState;

/// Windows are pruned once the map holds this many keys.
const PRUNE_THRESHOLD: usize = 4096;

/// In-memory fixed-window limiter keyed by client.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    /// Client key → current window.
    windows: Arc<Mutex<HashMap<String, Window>>>,
    /// Requests allowed per window.
    max_requests: u32,
    /// Window length.
    window: Duration,
}

#[derive(Debug, Clone, Copy)]
struct Window {
    started: Instant,
    count: u32,
}

impl RateLimiter {
    /// Creates a new rate limiter.
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            windows: Arc::new(Mutex::new(HashMap::new())),
            max_requests,
            window,
        }
    }

    /// Creates the refresh endpoint limiter from configuration.
    pub fn from_config(config: &RateLimitConfig) -> Self {
        Self::new(
            config.refresh_requests,
            Duration::from_secs(config.refresh_window_seconds),
        )
    }

    /// Counts a request for `key`; `false` once the window is exhausted.
    pub async fn check(&self, key: &str) -> bool {
        self.check_at(key, Instant::now()).await
    }

    /// [`check`](Self::check) at an explicit instant.
    pub async fn check_at(&self, key: &str, now: Instant) -> bool {
        let mut windows = self.windows.lock().await;

        if windows.len() >= PRUNE_THRESHOLD {
            let length = self.window;
            windows.retain(|_, w| now.duration_since(w.started) < length);
        }

        let window = windows.entry(key.to_string()).or_insert(Window {
            started: now,
            count: 0,
        });

        if now.duration_since(window.started) >= self.window {
            *window = Window {
                started: now,
                count: 0,
            };
        }

        if window.count < self.max_requests {
            window.count += 1;
            true
        } else {
            false
        }
    }
}

/// Rejects requests beyond the refresh limit with 429.
///
/// Keyed on the socket peer unless proxy headers are trusted, so the server
/// must be served with connect info.
pub async fn refresh_rate_limit(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let key = client_ip(
        request.headers(),
        request.extensions(),
        state.config.server.trust_proxy_headers,
    )
    .unwrap_or_else(|| "unknown".to_string());

    if !state.refresh_limiter.check(&key).await {
        tracing::warn!(client = %key, path = %request.uri().path(), "Rate limit exceeded");
        return Err(ApiError::TooManyRequests);
    }

    Ok(next.run(request).await)
}
