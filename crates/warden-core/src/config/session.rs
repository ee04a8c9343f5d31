//! Session policy and transaction retry configuration.

use serde::{Deserialize, Serialize};

/// Session management configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Concurrent-session limit applied when a user row carries a
    /// non-positive `max_allowed_sessions`.
    #[serde(default = "default_max_sessions")]
    pub default_max_sessions: i32,
    /// Retry policy for transient store failures.
    #[serde(default)]
    pub retry: RetryConfig,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            default_max_sessions: default_max_sessions(),
            retry: RetryConfig::default(),
        }
    }
}

/// Exponential backoff settings for the transaction coordinator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Total attempts, including the first one.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Delay before the first retry in milliseconds.
    #[serde(default = "default_base_delay")]
    pub base_delay_ms: u64,
    /// Upper bound for a single backoff delay in milliseconds.
    #[serde(default = "default_max_delay")]
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            base_delay_ms: default_base_delay(),
            max_delay_ms: default_max_delay(),
        }
    }
}

fn default_max_sessions() -> i32 {
    5
}

fn default_max_attempts() -> u32 {
    3
}

fn default_base_delay() -> u64 {
    25
}

fn default_max_delay() -> u64 {
    500
}
