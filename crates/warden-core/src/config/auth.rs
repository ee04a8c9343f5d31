//! JWT and token lifetime configuration.

use serde::{Deserialize, Serialize};

/// Token signing and lifetime configuration.
///
/// `jwt_secret` has no default: a deployment that forgets to set it must
/// fail at startup rather than sign tokens with a well-known key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Shared secret for HMAC-SHA256 signing of access tokens.
    #[serde(default)]
    pub jwt_secret: String,
    /// Value of the `iss` claim.
    #[serde(default = "default_issuer")]
    pub jwt_issuer: String,
    /// Value of the `aud` claim.
    #[serde(default = "default_audience")]
    pub jwt_audience: String,
    /// Access token lifetime in minutes.
    #[serde(default = "default_access_ttl")]
    pub access_token_ttl_minutes: i64,
    /// Refresh token lifetime in days.
    #[serde(default = "default_refresh_ttl")]
    pub refresh_token_ttl_days: i64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            jwt_issuer: default_issuer(),
            jwt_audience: default_audience(),
            access_token_ttl_minutes: default_access_ttl(),
            refresh_token_ttl_days: default_refresh_ttl(),
        }
    }
}

fn default_issuer() -> String {
    "warden".to_string()
}

fn default_audience() -> String {
    "warden-clients".to_string()
}

fn default_access_ttl() -> i64 {
    60
}

fn default_refresh_ttl() -> i64 {
    7
}
