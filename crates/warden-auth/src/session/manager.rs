//! Session lifecycle manager: login, refresh, revoke and session checks.

use std::sync::Arc;

use uuid::Uuid;

use warden_core::config::session::SessionConfig;
use warden_entity::session::DeviceInfo;

use crate::error::AuthError;
use crate::jwt::TokenIssuer;
use crate::password::CredentialVerifier;
use crate::store::SessionStore;
use crate::transaction::{RetryPolicy, TransactionCoordinator};

use super::outcome::{CheckOutcome, LoginOutcome, RefreshOutcome, RevokeOutcome};
use super::work::{CheckResult, CheckWork, LoginWork, RefreshWork, RevokeWork};

/// Input to [`SessionManager::login`].
#[derive(Debug, Clone)]
pub struct LoginRequest {
    /// Login email.
    pub email: String,
    /// Plaintext password, checked by the credential verifier.
    pub password: String,
    /// Device and client metadata for the new session.
    pub device: DeviceInfo,
}

/// Manages the complete session lifecycle.
///
/// Every operation runs as one unit of work through the transaction
/// coordinator. Business rejections come back as [`AuthError`] variants;
/// only infrastructure faults arrive as [`AuthError::Fault`].
#[derive(Clone)]
pub struct SessionManager {
    coordinator: TransactionCoordinator,
    issuer: Arc<dyn TokenIssuer>,
    verifier: Arc<dyn CredentialVerifier>,
    config: SessionConfig,
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("coordinator", &self.coordinator)
            .field("config", &self.config)
            .finish()
    }
}

impl SessionManager {
    /// Creates a new session manager.
    pub fn new(
        store: Arc<dyn SessionStore>,
        issuer: Arc<dyn TokenIssuer>,
        verifier: Arc<dyn CredentialVerifier>,
        config: SessionConfig,
    ) -> Self {
        let policy = RetryPolicy::from_config(&config.retry);
        Self {
            coordinator: TransactionCoordinator::new(store, policy),
            issuer,
            verifier,
            config,
        }
    }

    /// The token issuer, for access token validation at the boundary.
    pub fn issuer(&self) -> &Arc<dyn TokenIssuer> {
        &self.issuer
    }

    /// The backing store.
    pub fn store(&self) -> &Arc<dyn SessionStore> {
        self.coordinator.store()
    }

    /// Authenticate and open a session on the request's device.
    ///
    /// An active session already on that device is revoked. If the user is
    /// at their limit, the oldest sessions on other devices are evicted.
    pub async fn login(&self, request: &LoginRequest) -> Result<LoginOutcome, AuthError> {
        let work = LoginWork {
            issuer: self.issuer.as_ref(),
            verifier: self.verifier.as_ref(),
            default_max_sessions: self.config.default_max_sessions,
            request,
        };
        self.coordinator.run(&work).await
    }

    /// Mint a new access token for a live, device-bound refresh token.
    ///
    /// The refresh token and its expiry are returned unchanged. A token
    /// presented from another device is rejected without any write.
    pub async fn refresh(
        &self,
        refresh_token: &str,
        device_id: &str,
    ) -> Result<RefreshOutcome, AuthError> {
        let work = RefreshWork {
            issuer: self.issuer.as_ref(),
            default_max_sessions: self.config.default_max_sessions,
            refresh_token,
            device_id,
        };
        self.coordinator.run(&work).await
    }

    /// Revoke a session owned by `caller_id`. Revoking twice succeeds.
    pub async fn revoke(
        &self,
        refresh_token: &str,
        device_id: &str,
        caller_id: Uuid,
    ) -> Result<RevokeOutcome, AuthError> {
        let work = RevokeWork {
            refresh_token,
            device_id,
            caller_id,
        };
        self.coordinator.run(&work).await
    }

    /// Check the latest session of `user_id` on `device_id`.
    ///
    /// An expired session is revoked and committed before
    /// [`AuthError::SessionExpired`] is returned.
    pub async fn check_session(
        &self,
        user_id: Uuid,
        device_id: &str,
    ) -> Result<CheckOutcome, AuthError> {
        let work = CheckWork { user_id, device_id };
        match self.coordinator.run(&work).await? {
            CheckResult::Valid(outcome) => Ok(outcome),
            CheckResult::Expired => Err(AuthError::SessionExpired),
        }
    }
}
