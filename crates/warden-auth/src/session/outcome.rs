//! Successful results of engine operations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use warden_entity::session::SessionAccounting;

/// Tokens and session accounting returned by login and refresh.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenResponse {
    /// Signed access token.
    pub access_token: String,
    /// Access token expiry.
    pub access_token_expires_at: DateTime<Utc>,
    /// Opaque refresh token.
    pub refresh_token: String,
    /// Refresh token expiry.
    pub refresh_token_expires_at: DateTime<Utc>,
    /// Whether the user's email is confirmed.
    pub is_email_verified: bool,
    /// Session counts after the operation.
    pub accounting: SessionAccounting,
}

/// Result of a successful login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginOutcome {
    /// The session created by this login.
    pub session_id: Uuid,
    /// Issued tokens.
    pub tokens: TokenResponse,
}

/// Result of a successful refresh.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshOutcome {
    /// The refreshed session.
    pub session_id: Uuid,
    /// New access token, unchanged refresh token.
    pub tokens: TokenResponse,
}

/// Result of a successful revoke.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RevokeOutcome {
    /// The session was revoked before this call; nothing changed.
    pub already_revoked: bool,
}

/// Result of a successful session check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckOutcome {
    /// The device's current session.
    pub session_id: Uuid,
}
