//! Rate limiting configuration.

use serde::{Deserialize, Serialize};

/// Fixed-window limits for the token refresh endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Requests allowed per client within one window.
    #[serde(default = "default_refresh_requests")]
    pub refresh_requests: u32,
    /// Window length in seconds.
    #[serde(default = "default_refresh_window")]
    pub refresh_window_seconds: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            refresh_requests: default_refresh_requests(),
            refresh_window_seconds: default_refresh_window(),
        }
    }
}

fn default_refresh_requests() -> u32 {
    5
}

fn default_refresh_window() -> u64 {
    60
}
