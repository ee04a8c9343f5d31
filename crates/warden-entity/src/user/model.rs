//! User entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::status::UserStatus;

/// A user account as seen by the session authority.
///
/// Rows are owned by the credential store; Warden reads them, takes a row
/// lock during session mutations and writes only the last-login fields.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    /// Unique user identifier.
    pub id: Uuid,
    /// Unique login email.
    pub email: String,
    /// Argon2 password hash.
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Whether the email address has been confirmed.
    pub email_verified: bool,
    /// Whether the account is enabled.
    pub is_active: bool,
    /// Soft-delete flag.
    pub is_deleted: bool,
    /// Account locked until this time (if locked).
    pub lockout_until: Option<DateTime<Utc>>,
    /// Concurrent session limit. Non-positive means "use the configured default".
    pub max_allowed_sessions: i32,
    /// Last successful login or refresh.
    pub last_login_at: Option<DateTime<Utc>>,
    /// Client IP of the last successful login.
    pub last_login_ip: Option<String>,
    /// Role names, in no particular order.
    pub roles: Vec<String>,
    /// When the user was created.
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Check if the account is locked out at `now`.
    pub fn is_locked_at(&self, now: DateTime<Utc>) -> bool {
        self.lockout_until.is_some_and(|until| now < until)
    }

    /// Compute the account status at `now`.
    pub fn status_at(&self, now: DateTime<Utc>) -> UserStatus {
        if self.is_deleted {
            UserStatus::Deleted
        } else if !self.is_active {
            UserStatus::Inactive
        } else if self.is_locked_at(now) {
            UserStatus::Locked
        } else {
            UserStatus::Active
        }
    }

    /// Check if the user can log in at `now`.
    pub fn can_login_at(&self, now: DateTime<Utc>) -> bool {
        self.status_at(now).can_login()
    }

    /// The session limit to enforce, falling back to `default_max` when the
    /// row does not carry a positive value.
    pub fn effective_max_sessions(&self, default_max: i32) -> usize {
        let max = if self.max_allowed_sessions > 0 {
            self.max_allowed_sessions
        } else {
            default_max
        };
        usize::try_from(max.max(1)).unwrap_or(1)
    }

    /// Role names joined with commas, as carried in the access token.
    pub fn role_claim(&self) -> String {
        self.roles.join(",")
    }
}

/// Data required to create a new user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUser {
    /// Login email.
    pub email: String,
    /// Pre-hashed password.
    pub password_hash: String,
    /// Whether the email is already confirmed.
    pub email_verified: bool,
    /// Concurrent session limit.
    pub max_allowed_sessions: i32,
    /// Role names to grant.
    pub roles: Vec<String>,
}
