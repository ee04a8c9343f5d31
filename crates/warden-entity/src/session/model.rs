//! Session entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A device-bound session holding one refresh token.
///
/// Sessions move from active to revoked (terminal) or are found expired
/// lazily. There is no background sweep: `expires_at <= now` is a predicate,
/// and storage is only updated when a session check observes it.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Session {
    /// Unique session identifier.
    pub id: Uuid,
    /// The user this session belongs to.
    pub user_id: Uuid,
    /// Opaque refresh token, unique across all sessions.
    #[serde(skip_serializing)]
    pub refresh_token: String,
    /// Client-supplied device identifier.
    pub device_id: String,
    /// Human-readable device name.
    pub device_name: String,
    /// Client IP at login time.
    pub ip_address: Option<String>,
    /// User-Agent header at login time.
    pub user_agent: Option<String>,
    /// When the session was created (login time).
    pub created_at: DateTime<Utc>,
    /// Last refresh or session check.
    pub last_activity: DateTime<Utc>,
    /// Expiry of the refresh token.
    pub expires_at: DateTime<Utc>,
    /// Whether the session has been revoked.
    pub is_revoked: bool,
    /// When the session was revoked.
    pub revoked_on: Option<DateTime<Utc>>,
}

/// Client metadata recorded on a new session.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeviceInfo {
    /// Client-supplied device identifier.
    pub device_id: String,
    /// Human-readable device name.
    pub device_name: String,
    /// Client IP address, if known.
    pub ip_address: Option<String>,
    /// User-Agent header, if sent.
    pub user_agent: Option<String>,
}

impl Session {
    /// Build a new, active session for `user_id` created at `now`.
    pub fn new(
        user_id: Uuid,
        refresh_token: String,
        expires_at: DateTime<Utc>,
        device: DeviceInfo,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            refresh_token,
            device_id: device.device_id,
            device_name: device.device_name,
            ip_address: device.ip_address,
            user_agent: device.user_agent,
            created_at: now,
            last_activity: now,
            expires_at,
            is_revoked: false,
            revoked_on: None,
        }
    }

    /// Check whether the session has expired at `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }

    /// Check whether the session counts toward the user's limit at `now`.
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        !self.is_revoked && !self.is_expired_at(now)
    }

    /// Mark revoked. A session that is already revoked keeps its original
    /// `revoked_on`.
    pub fn revoke(&mut self, now: DateTime<Utc>) {
        if !self.is_revoked {
            self.is_revoked = true;
            self.revoked_on = Some(now);
        }
    }
}
