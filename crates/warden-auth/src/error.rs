//! Business-rule failures of the session lifecycle.

use thiserror::Error;

use warden_core::error::AppError;

/// Typed result of a rejected login, refresh, revoke or session check.
///
/// Every variant except [`AuthError::Fault`] is an expected outcome and is
/// never retried. `Fault` wraps infrastructure errors; the transaction
/// coordinator retries it when the wrapped error is transient.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Unknown email, wrong password or an account that may not log in.
    /// Deliberately indistinguishable.
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Refresh token unknown, revoked or past its expiry.
    #[error("Refresh token is invalid or expired")]
    InvalidOrExpiredToken,

    /// Refresh token unknown on revoke.
    #[error("Invalid refresh token")]
    InvalidToken,

    /// The token is bound to another device.
    #[error("Invalid device id")]
    DeviceMismatch,

    /// The caller does not own the session.
    #[error("Unauthorized to revoke this token")]
    Unauthorized,

    /// The session owner is missing, disabled, deleted or locked out.
    #[error("User is not allowed to login")]
    LoginNotAllowed,

    /// No session was ever created for this device.
    #[error("Session not found")]
    SessionNotFound,

    /// The device's latest session is revoked.
    #[error("Session revoked")]
    SessionRevoked,

    /// The device's latest session has expired. It is revoked as a side effect.
    #[error("Session expired")]
    SessionExpired,

    /// Infrastructure failure.
    #[error(transparent)]
    Fault(#[from] AppError),
}

impl AuthError {
    /// Whether this is a store fault worth retrying from a fresh transaction.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Fault(e) if e.is_transient())
    }

    /// Whether this is an expected business outcome rather than a fault.
    pub fn is_rejection(&self) -> bool {
        !matches!(self, Self::Fault(_))
    }
}
