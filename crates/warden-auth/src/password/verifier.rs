//! The credential verifier seam.

use async_trait::async_trait;

use warden_core::result::AppResult;
use warden_entity::user::User;

/// Checks a plaintext password against the credential stored for a user.
///
/// `Ok(false)` is a mismatch, and so is a stored credential that cannot be
/// parsed. `Err` is reserved for faults of the verifier itself.
#[async_trait]
pub trait CredentialVerifier: Send + Sync + 'static {
    /// Verify `password` for `user`.
    async fn verify(&self, user: &User, password: &str) -> AppResult<bool>;
}
