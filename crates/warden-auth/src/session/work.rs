//! The transactional bodies of the engine operations.

use async_trait::async_trait;
use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use warden_entity::session::{Session, SessionAccounting};

use crate::error::AuthError;
use crate::jwt::TokenIssuer;
use crate::password::CredentialVerifier;
use crate::store::StoreTransaction;
use crate::transaction::UnitOfWork;

use super::eviction::{partition_by_device, sessions_to_evict};
use super::manager::LoginRequest;
use super::outcome::{CheckOutcome, LoginOutcome, RefreshOutcome, RevokeOutcome, TokenResponse};

/// Revoke `sessions`, logging each under `reason`.
async fn revoke_all(
    tx: &mut dyn StoreTransaction,
    sessions: &[Session],
    now: chrono::DateTime<Utc>,
    reason: &'static str,
) -> Result<(), AuthError> {
    for session in sessions {
        tx.revoke_session(session.id, now).await?;
        info!(
            user_id = %session.user_id,
            session_id = %session.id,
            device_id = %session.device_id,
            reason,
            "Session revoked"
        );
    }
    Ok(())
}

pub(super) struct LoginWork<'a> {
    pub issuer: &'a dyn TokenIssuer,
    pub verifier: &'a dyn CredentialVerifier,
    pub default_max_sessions: i32,
    pub request: &'a LoginRequest,
}

#[async_trait]
impl<'a> UnitOfWork for LoginWork<'a> {
    type Output = LoginOutcome;

    fn name(&self) -> &'static str {
        "login"
    }

    async fn execute(&self, tx: &mut dyn StoreTransaction) -> Result<LoginOutcome, AuthError> {
        let now = Utc::now();
        let request = self.request;
        let device_id = request.device.device_id.as_str();

        let user = match tx.find_user_by_email(&request.email).await? {
            Some(user) if user.can_login_at(now) => user,
            _ => {
                warn!(device_id, "Login rejected: unknown or disabled account");
                return Err(AuthError::InvalidCredentials);
            }
        };

        if !self.verifier.verify(&user, &request.password).await? {
            warn!(user_id = %user.id, device_id, "Login rejected: bad password");
            return Err(AuthError::InvalidCredentials);
        }

        tx.lock_user(user.id).await?;
        let active = tx.find_active_sessions(user.id, now).await?;

        let (same_device, others) = partition_by_device(active, device_id);
        revoke_all(tx, &same_device, now, "device_replaced").await?;

        let max = user.effective_max_sessions(self.default_max_sessions);
        let evicted = sessions_to_evict(&others, max);
        revoke_all(tx, evicted, now, "evicted").await?;

        let access = self.issuer.issue_access_token(&user, now)?;
        let refresh = self.issuer.issue_refresh_token(now)?;

        let session = Session::new(
            user.id,
            refresh.token.clone(),
            refresh.expires_at,
            request.device.clone(),
            now,
        );
        tx.insert_session(&session).await?;
        tx.update_last_login(user.id, now, request.device.ip_address.as_deref())
            .await?;

        let accounting = SessionAccounting {
            active_sessions: others.len() - evicted.len() + 1,
            oldest_session_revoked: !evicted.is_empty(),
            max_allowed_sessions: max,
        };

        info!(
            user_id = %user.id,
            session_id = %session.id,
            device_id,
            replaced = same_device.len(),
            evicted = evicted.len(),
            active = accounting.active_sessions,
            "User logged in"
        );

        Ok(LoginOutcome {
            session_id: session.id,
            tokens: TokenResponse {
                access_token: access.token,
                access_token_expires_at: access.expires_at,
                refresh_token: refresh.token,
                refresh_token_expires_at: refresh.expires_at,
                is_email_verified: user.email_verified,
                accounting,
            },
        })
    }
}

pub(super) struct RefreshWork<'a> {
    pub issuer: &'a dyn TokenIssuer,
    pub default_max_sessions: i32,
    pub refresh_token: &'a str,
    pub device_id: &'a str,
}

#[async_trait]
impl<'a> UnitOfWork for RefreshWork<'a> {
    type Output = RefreshOutcome;

    fn name(&self) -> &'static str {
        "refresh"
    }

    async fn execute(&self, tx: &mut dyn StoreTransaction) -> Result<RefreshOutcome, AuthError> {
        let now = Utc::now();

        let session = match tx.find_session_by_refresh_token(self.refresh_token).await? {
            Some(session) if session.is_active_at(now) => session,
            _ => {
                warn!(device_id = self.device_id, "Refresh rejected: unknown, revoked or expired token");
                return Err(AuthError::InvalidOrExpiredToken);
            }
        };

        if session.device_id != self.device_id {
            warn!(
                user_id = %session.user_id,
                session_id = %session.id,
                device_id = self.device_id,
                bound_device_id = %session.device_id,
                "Refresh rejected: token presented from another device"
            );
            return Err(AuthError::DeviceMismatch);
        }

        let user = match tx.find_user_by_id(session.user_id).await? {
            Some(user) if user.can_login_at(now) => user,
            _ => {
                warn!(user_id = %session.user_id, "Refresh rejected: account may not log in");
                return Err(AuthError::LoginNotAllowed);
            }
        };

        tx.lock_user(user.id).await?;
        let active = tx.find_active_sessions(user.id, now).await?;
        if !active.iter().any(|s| s.id == session.id) {
            return Err(AuthError::InvalidOrExpiredToken);
        }

        let (same_device, others) = partition_by_device(
            active.into_iter().filter(|s| s.id != session.id).collect(),
            self.device_id,
        );
        revoke_all(tx, &same_device, now, "device_replaced").await?;

        let max = user.effective_max_sessions(self.default_max_sessions);
        let evicted = sessions_to_evict(&others, max);
        revoke_all(tx, evicted, now, "evicted").await?;

        let access = self.issuer.issue_access_token(&user, now)?;
        tx.touch_session(session.id, now).await?;
        tx.update_last_login(user.id, now, None).await?;

        let accounting = SessionAccounting {
            active_sessions: others.len() - evicted.len() + 1,
            oldest_session_revoked: !evicted.is_empty(),
            max_allowed_sessions: max,
        };

        info!(
            user_id = %user.id,
            session_id = %session.id,
            device_id = self.device_id,
            evicted = evicted.len(),
            active = accounting.active_sessions,
            "Access token refreshed"
        );

        Ok(RefreshOutcome {
            session_id: session.id,
            tokens: TokenResponse {
                access_token: access.token,
                access_token_expires_at: access.expires_at,
                refresh_token: session.refresh_token,
                refresh_token_expires_at: session.expires_at,
                is_email_verified: user.email_verified,
                accounting,
            },
        })
    }
}

pub(super) struct RevokeWork<'a> {
    pub refresh_token: &'a str,
    pub device_id: &'a str,
    pub caller_id: Uuid,
}

#[async_trait]
impl<'a> UnitOfWork for RevokeWork<'a> {
    type Output = RevokeOutcome;

    fn name(&self) -> &'static str {
        "revoke"
    }

    async fn execute(&self, tx: &mut dyn StoreTransaction) -> Result<RevokeOutcome, AuthError> {
        let now = Utc::now();

        let Some(session) = tx.find_session_by_refresh_token(self.refresh_token).await? else {
            warn!(caller_id = %self.caller_id, "Revoke rejected: unknown token");
            return Err(AuthError::InvalidToken);
        };

        if session.device_id != self.device_id {
            warn!(
                caller_id = %self.caller_id,
                session_id = %session.id,
                device_id = self.device_id,
                "Revoke rejected: device mismatch"
            );
            return Err(AuthError::DeviceMismatch);
        }

        if session.user_id != self.caller_id {
            warn!(
                caller_id = %self.caller_id,
                session_id = %session.id,
                "Revoke rejected: caller does not own the session"
            );
            return Err(AuthError::Unauthorized);
        }

        if session.is_revoked {
            info!(session_id = %session.id, "Revoke of already revoked session");
            return Ok(RevokeOutcome {
                already_revoked: true,
            });
        }

        tx.revoke_session(session.id, now).await?;
        info!(
            user_id = %session.user_id,
            session_id = %session.id,
            device_id = %session.device_id,
            reason = "explicit",
            "Session revoked"
        );
        Ok(RevokeOutcome {
            already_revoked: false,
        })
    }
}

/// What the check found; an expiry must still be committed.
pub(super) enum CheckResult {
    Valid(CheckOutcome),
    Expired,
}

pub(super) struct CheckWork<'a> {
    pub user_id: Uuid,
    pub device_id: &'a str,
}

#[async_trait]
impl<'a> UnitOfWork for CheckWork<'a> {
    type Output = CheckResult;

    fn name(&self) -> &'static str {
        "check_session"
    }

    async fn execute(&self, tx: &mut dyn StoreTransaction) -> Result<CheckResult, AuthError> {
        let now = Utc::now();

        let Some(session) = tx
            .find_latest_session_for_device(self.user_id, self.device_id)
            .await?
        else {
            return Err(AuthError::SessionNotFound);
        };

        if session.is_revoked {
            return Err(AuthError::SessionRevoked);
        }

        if session.is_expired_at(now) {
            tx.revoke_session(session.id, now).await?;
            info!(
                user_id = %self.user_id,
                session_id = %session.id,
                device_id = self.device_id,
                reason = "expired",
                "Session revoked"
            );
            return Ok(CheckResult::Expired);
        }

        tx.touch_session(session.id, now).await?;
        Ok(CheckResult::Valid(CheckOutcome {
            session_id: session.id,
        }))
    }
}
