//! `AuthUser` extractor: pulls the JWT from the Authorization header and
//! validates it with the token issuer.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use uuid::Uuid;

use warden_auth::TokenValidation;

use crate::error::ApiError;
use crate::state::AppState;

/// The authenticated caller.
///
/// Only the access token is checked. The session store is not consulted,
/// so a revoked session's access token stays usable until it expires.
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// Subject claim of the access token.
    pub user_id: Uuid,
    /// Email claim.
    pub email: String,
    /// Role names from the comma-joined role claim.
    pub roles: Vec<String>,
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .ok_or(ApiError::Unauthenticated)?;

        match state.session_manager.issuer().validate_access_token(token) {
            TokenValidation::Valid { claims } => Ok(AuthUser {
                user_id: claims.user_id(),
                email: claims.email.clone(),
                roles: claims.roles().into_iter().map(String::from).collect(),
            }),
            TokenValidation::Invalid => {
                tracing::debug!(path = %parts.uri.path(), "Rejected invalid access token");
                Err(ApiError::Unauthenticated)
            }
        }
    }
}
