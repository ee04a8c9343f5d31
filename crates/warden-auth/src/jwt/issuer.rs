//! The token issuer used by the session lifecycle engine.

use chrono::{DateTime, Duration, Utc};
use tracing::debug;
use uuid::Uuid;

use warden_core::config::auth::AuthConfig;
use warden_core::result::AppResult;
use warden_entity::session::IssuedToken;
use warden_entity::user::User;

use super::claims::Claims;
use super::decoder::JwtDecoder;
use super::encoder::JwtEncoder;
use super::refresh::generate_refresh_token;

/// Outcome of access token validation. Never an error: any verification
/// failure is simply `Invalid`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenValidation {
    /// Signature, issuer, audience and expiry all check out.
    Valid {
        /// Decoded claims.
        claims: Claims,
    },
    /// Expired, tampered, foreign or malformed.
    Invalid,
}

impl TokenValidation {
    /// The subject of a valid token.
    pub fn user_id(&self) -> Option<Uuid> {
        match self {
            Self::Valid { claims } => Some(claims.sub),
            Self::Invalid => None,
        }
    }

    /// Whether the token validated.
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid { .. })
    }
}

/// Mints access and refresh tokens and validates access tokens.
pub trait TokenIssuer: Send + Sync + 'static {
    /// Sign an access token for `user`, expiring a configured number of
    /// minutes after `now`.
    fn issue_access_token(&self, user: &User, now: DateTime<Utc>) -> AppResult<IssuedToken>;

    /// Generate a random refresh token, expiring a configured number of
    /// days after `now`.
    fn issue_refresh_token(&self, now: DateTime<Utc>) -> AppResult<IssuedToken>;

    /// Validate an access token without consulting any store.
    fn validate_access_token(&self, token: &str) -> TokenValidation;
}

/// HS256 JWT access tokens with random base64 refresh tokens.
#[derive(Debug, Clone)]
pub struct JwtTokenIssuer {
    encoder: JwtEncoder,
    decoder: JwtDecoder,
    refresh_ttl: Duration,
}

impl JwtTokenIssuer {
    /// Build an issuer from auth configuration. Fails when the signing
    /// secret is missing.
    pub fn new(config: &AuthConfig) -> AppResult<Self> {
        Ok(Self {
            encoder: JwtEncoder::new(config)?,
            decoder: JwtDecoder::new(config)?,
            refresh_ttl: Duration::days(config.refresh_token_ttl_days),
        })
    }
}

impl TokenIssuer for JwtTokenIssuer {
    fn issue_access_token(&self, user: &User, now: DateTime<Utc>) -> AppResult<IssuedToken> {
        self.encoder.encode_access_token(user, now)
    }

    fn issue_refresh_token(&self, now: DateTime<Utc>) -> AppResult<IssuedToken> {
        Ok(IssuedToken {
            token: generate_refresh_token(),
            expires_at: now + self.refresh_ttl,
        })
    }

    fn validate_access_token(&self, token: &str) -> TokenValidation {
        match self.decoder.decode_access_token(token) {
            Ok(claims) => TokenValidation::Valid { claims },
            Err(e) => {
                debug!(reason = ?e.kind(), "Access token rejected");
                TokenValidation::Invalid
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{EncodingKey, Header, encode};

    fn config() -> AuthConfig {
        AuthConfig {
            jwt_secret: "unit-test-secret".to_string(),
            ..AuthConfig::default()
        }
    }

    fn user() -> User {
        User {
            id: Uuid::new_v4(),
            email: "alice@example.com".to_string(),
            password_hash: String::new(),
            email_verified: true,
            is_active: true,
            is_deleted: false,
            lockout_until: None,
            max_allowed_sessions: 5,
            last_login_at: None,
            last_login_ip: None,
            roles: vec!["Admin".to_string(), "User".to_string()],
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_missing_secret_is_configuration_error() {
        let err = JwtTokenIssuer::new(&AuthConfig::default()).unwrap_err();
        assert_eq!(err.kind, warden_core::ErrorKind::Configuration);
    }

    #[test]
    fn test_issue_and_validate() {
        let issuer = JwtTokenIssuer::new(&config()).unwrap();
        let u = user();
        let now = Utc::now();
        let token = issuer.issue_access_token(&u, now).unwrap();
        assert_eq!(token.expires_at, now + Duration::minutes(60));

        match issuer.validate_access_token(&token.token) {
            TokenValidation::Valid { claims } => {
                assert_eq!(claims.sub, u.id);
                assert_eq!(claims.email, u.email);
                assert_eq!(claims.role, "Admin,User");
                assert_eq!(claims.iss, "warden");
            }
            TokenValidation::Invalid => panic!("token should validate"),
        }
    }

    #[test]
    fn test_expired_token_is_invalid() {
        let issuer = JwtTokenIssuer::new(&config()).unwrap();
        let issued_at = Utc::now() - Duration::minutes(61);
        let token = issuer.issue_access_token(&user(), issued_at).unwrap();
        assert_eq!(issuer.validate_access_token(&token.token), TokenValidation::Invalid);
    }

    #[test]
    fn test_wrong_secret_is_invalid() {
        let issuer = JwtTokenIssuer::new(&config()).unwrap();
        let other = JwtTokenIssuer::new(&AuthConfig {
            jwt_secret: "another-secret".to_string(),
            ..AuthConfig::default()
        })
        .unwrap();
        let token = other.issue_access_token(&user(), Utc::now()).unwrap();
        assert!(!issuer.validate_access_token(&token.token).is_valid());
    }

    #[test]
    fn test_wrong_audience_is_invalid() {
        let issuer = JwtTokenIssuer::new(&config()).unwrap();
        let now = Utc::now();
        let claims = Claims {
            sub: Uuid::new_v4(),
            email: "x@example.com".into(),
            role: "User".into(),
            iss: "warden".into(),
            aud: "someone-else".into(),
            iat: now.timestamp(),
            exp: (now + Duration::minutes(5)).timestamp(),
            jti: Uuid::new_v4(),
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"unit-test-secret"),
        )
        .unwrap();
        assert_eq!(issuer.validate_access_token(&token), TokenValidation::Invalid);
    }

    #[test]
    fn test_garbage_is_invalid() {
        let issuer = JwtTokenIssuer::new(&config()).unwrap();
        assert_eq!(issuer.validate_access_token("not.a.jwt"), TokenValidation::Invalid);
        assert_eq!(issuer.validate_access_token(""), TokenValidation::Invalid);
    }

    #[test]
    fn test_refresh_token_expiry() {
        let issuer = JwtTokenIssuer::new(&config()).unwrap();
        let now = Utc::now();
        let refresh = issuer.issue_refresh_token(now).unwrap();
        assert_eq!(refresh.expires_at, now + Duration::days(7));
        assert!(!refresh.token.is_empty());
    }
}
