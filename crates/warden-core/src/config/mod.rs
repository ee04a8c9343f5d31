//! Application configuration schemas.
//!
//! All configuration structs are deserialized from TOML files via the
//! `config` crate. Each sub-module represents a logical configuration
//! section. The tree is loaded once at startup and handed to constructors
//! by value; nothing reads configuration from global state afterwards.

pub mod app;
pub mod auth;
pub mod database;
pub mod logging;
pub mod rate_limit;
pub mod session;

use serde::{Deserialize, Serialize};

use self::app::ServerConfig;
use self::auth::AuthConfig;
use self::database::{DatabaseConfig, StoreBackend, StoreConfig};
use self::logging::LoggingConfig;
use self::rate_limit::RateLimitConfig;
use self::session::SessionConfig;

use crate::error::AppError;

/// Root application configuration.
///
/// This struct is the top-level deserialization target for the merged
/// TOML configuration files (default.toml + environment overlay).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,
    /// Database connection settings.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Session store backend selection.
    #[serde(default)]
    pub store: StoreConfig,
    /// Token signing settings.
    #[serde(default)]
    pub auth: AuthConfig,
    /// Session policy settings.
    #[serde(default)]
    pub session: SessionConfig,
    /// Refresh endpoint rate limits.
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from TOML files.
    ///
    /// Merges the default configuration with an environment-specific overlay
    /// and environment variables prefixed with `WARDEN__`
    /// (e.g. `WARDEN__AUTH__JWT_SECRET`).
    pub fn load(env: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("WARDEN")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        let app: Self = config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))?;

        tracing::debug!(env = %env, backend = ?app.store.backend, "Configuration loaded");
        Ok(app)
    }

    /// Reject settings the server cannot run with.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.auth.jwt_secret.trim().is_empty() {
            return Err(AppError::configuration("JWT secret is not configured"));
        }
        if self.auth.access_token_ttl_minutes <= 0 {
            return Err(AppError::configuration(
                "auth.access_token_ttl_minutes must be positive",
            ));
        }
        if self.auth.refresh_token_ttl_days <= 0 {
            return Err(AppError::configuration(
                "auth.refresh_token_ttl_days must be positive",
            ));
        }
        if self.session.retry.max_attempts == 0 {
            return Err(AppError::configuration(
                "session.retry.max_attempts must be at least 1",
            ));
        }
        if self.rate_limit.refresh_window_seconds == 0 {
            return Err(AppError::configuration(
                "rate_limit.refresh_window_seconds must be positive",
            ));
        }
        if self.store.backend == StoreBackend::Postgres && self.database.url.is_empty() {
            return Err(AppError::configuration(
                "database.url is required for the postgres store backend",
            ));
        }
        if let Some(seed) = self
            .store
            .seed_users
            .iter()
            .find(|u| u.email.trim().is_empty() || u.password.is_empty())
        {
            return Err(AppError::configuration(format!(
                "store.seed_users entry '{}' needs an email and a password",
                seed.email
            )));
        }
        Ok(())
    }
}
