//! Database and store backend configuration.

use serde::{Deserialize, Serialize};

/// Database connection pool configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL.
    #[serde(default)]
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
    /// Connection timeout in seconds.
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_seconds: u64,
    /// Idle connection timeout in seconds.
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_seconds: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            max_connections: default_max_connections(),
            min_connections: default_min_connections(),
            connect_timeout_seconds: default_connect_timeout(),
            idle_timeout_seconds: default_idle_timeout(),
        }
    }
}

/// Which session store implementation backs the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreBackend {
    /// PostgreSQL with serializable transactions.
    #[default]
    Postgres,
    /// Process-local store for development and tests.
    Memory,
}

/// Store selection.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Selected backend.
    #[serde(default)]
    pub backend: StoreBackend,
    /// Users loaded into the memory backend at startup. Ignored by postgres,
    /// whose users are provisioned with `warden-cli user create`.
    #[serde(default)]
    pub seed_users: Vec<SeedUser>,
}

/// A user account declared in configuration for the memory backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedUser {
    /// Login email.
    pub email: String,
    /// Plaintext password, hashed when the store is seeded.
    pub password: String,
    /// Concurrent session limit.
    #[serde(default = "default_seed_max_sessions")]
    pub max_sessions: i32,
    /// Role names.
    #[serde(default = "default_seed_roles")]
    pub roles: Vec<String>,
}

fn default_seed_max_sessions() -> i32 {
    5
}

fn default_seed_roles() -> Vec<String> {
    vec!["User".to_string()]
}

fn default_max_connections() -> u32 {
    20
}

fn default_min_connections() -> u32 {
    1
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_idle_timeout() -> u64 {
    300
}
