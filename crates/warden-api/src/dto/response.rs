//! Response DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use warden_auth::TokenResponse;

/// Tokens and session accounting returned by login and refresh.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthTokenResponse {
    /// Signed access token.
    pub access_token: String,
    /// Opaque refresh token.
    pub refresh_token: String,
    /// Access token expiration.
    pub access_token_expires_at: DateTime<Utc>,
    /// Refresh token expiration.
    pub refresh_token_expires_at: DateTime<Utc>,
    /// Whether the email address is confirmed.
    pub is_email_verified: bool,
    /// Active sessions after this request, including this one.
    pub active_sessions: usize,
    /// Whether an older session was evicted.
    pub oldest_session_revoked: bool,
    /// The enforced session limit.
    pub max_allowed_sessions: usize,
}

impl From<TokenResponse> for AuthTokenResponse {
    fn from(tokens: TokenResponse) -> Self {
        Self {
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
            access_token_expires_at: tokens.access_token_expires_at,
            refresh_token_expires_at: tokens.refresh_token_expires_at,
            is_email_verified: tokens.is_email_verified,
            active_sessions: tokens.accounting.active_sessions,
            oldest_session_revoked: tokens.accounting.oldest_session_revoked,
            max_allowed_sessions: tokens.accounting.max_allowed_sessions,
        }
    }
}

/// Simple message response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    /// Message.
    pub message: String,
}

impl MessageResponse {
    /// Wrap a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// `ok` or `degraded`.
    pub status: String,
    /// Server version.
    pub version: String,
    /// Session store connectivity.
    pub store: String,
}
