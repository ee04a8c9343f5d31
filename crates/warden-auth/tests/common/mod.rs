//! Shared fixtures for engine scenario tests.

#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use warden_auth::{
    CredentialVerifier, JwtTokenIssuer, LoginRequest, MemorySessionStore, SessionManager,
};
use warden_core::config::auth::AuthConfig;
use warden_core::config::session::{RetryConfig, SessionConfig};
use warden_core::result::AppResult;
use warden_entity::session::{DeviceInfo, Session};
use warden_entity::user::User;

pub const PASSWORD: &str = "P@ssw0rd!";

/// Compares the plaintext against `password_hash` verbatim.
pub struct PlainVerifier;

#[async_trait]
impl CredentialVerifier for PlainVerifier {
    async fn verify(&self, user: &User, password: &str) -> AppResult<bool> {
        Ok(user.password_hash == password)
    }
}

pub struct Harness {
    pub store: MemorySessionStore,
    pub manager: SessionManager,
}

pub fn harness() -> Harness {
    harness_with_verifier(Arc::new(PlainVerifier))
}

pub fn harness_with_verifier(verifier: Arc<dyn CredentialVerifier>) -> Harness {
    let store = MemorySessionStore::new();
    let issuer = JwtTokenIssuer::new(&AuthConfig {
        jwt_secret: "engine-test-secret".to_string(),
        ..AuthConfig::default()
    })
    .unwrap();
    let config = SessionConfig {
        default_max_sessions: 5,
        retry: RetryConfig {
            max_attempts: 3,
            base_delay_ms: 1,
            max_delay_ms: 5,
        },
    };
    let manager = SessionManager::new(
        Arc::new(store.clone()),
        Arc::new(issuer),
        verifier,
        config,
    );
    Harness { store, manager }
}

pub fn user(email: &str, max_sessions: i32) -> User {
    User {
        id: Uuid::new_v4(),
        email: email.to_string(),
        password_hash: PASSWORD.to_string(),
        email_verified: true,
        is_active: true,
        is_deleted: false,
        lockout_until: None,
        max_allowed_sessions: max_sessions,
        last_login_at: None,
        last_login_ip: None,
        roles: vec!["User".to_string()],
        created_at: Utc::now(),
    }
}

pub fn login_request(email: &str, password: &str, device: &str) -> LoginRequest {
    LoginRequest {
        email: email.to_string(),
        password: password.to_string(),
        device: DeviceInfo {
            device_id: device.to_string(),
            device_name: format!("{device} name"),
            ip_address: Some("203.0.113.7".to_string()),
            user_agent: Some("tests".to_string()),
        },
    }
}

/// A session created at `created_at` that expires `ttl` later.
pub fn seeded_session(
    user_id: Uuid,
    device: &str,
    created_at: DateTime<Utc>,
    ttl: Duration,
) -> Session {
    Session::new(
        user_id,
        format!("seeded-{}", Uuid::new_v4()),
        created_at + ttl,
        DeviceInfo {
            device_id: device.to_string(),
            ..DeviceInfo::default()
        },
        created_at,
    )
}

pub fn active_count(sessions: &[Session]) -> usize {
    let now = Utc::now();
    sessions.iter().filter(|s| s.is_active_at(now)).count()
}
