//! Shared test helpers for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::extract::ConnectInfo;
use chrono::Utc;
use http::{Request, StatusCode};
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

use warden_api::AppState;
use warden_auth::{JwtTokenIssuer, MemorySessionStore, PasswordHasher, SessionManager};
use warden_core::config::AppConfig;
use warden_core::config::database::StoreBackend;
use warden_entity::session::Session;
use warden_entity::user::User;

pub const PASSWORD: &str = "correct horse battery staple";

/// Socket peer of requests that do not name one
pub const DEFAULT_PEER: &str = "127.0.0.1:40000";

/// Test application context
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    /// Backing store for direct inspection
    pub store: MemorySessionStore,
    /// Application config
    pub config: AppConfig,
}

impl TestApp {
    /// Create a new test application over an empty in-memory store
    pub fn new() -> Self {
        Self::with_config(test_config())
    }

    /// Create a test application with a custom configuration
    pub fn with_config(config: AppConfig) -> Self {
        let store = MemorySessionStore::new();
        let issuer = JwtTokenIssuer::new(&config.auth).expect("Failed to build token issuer");
        let manager = SessionManager::new(
            Arc::new(store.clone()),
            Arc::new(issuer),
            Arc::new(PasswordHasher::new()),
            config.session.clone(),
        );

        let state = AppState::new(config.clone(), manager);
        let router = warden_api::build_app(state, &config.server);

        Self {
            router,
            store,
            config,
        }
    }

    /// Create a test user and return their ID
    pub async fn create_test_user(&self, email: &str, max_sessions: i32) -> Uuid {
        let hash = PasswordHasher::new()
            .hash_password(PASSWORD)
            .expect("Failed to hash password");
        let id = Uuid::new_v4();

        self.store
            .insert_user(User {
                id,
                email: email.to_string(),
                password_hash: hash,
                email_verified: true,
                is_active: true,
                is_deleted: false,
                lockout_until: None,
                max_allowed_sessions: max_sessions,
                last_login_at: None,
                last_login_ip: None,
                roles: vec!["User".to_string()],
                created_at: Utc::now(),
            })
            .await;

        id
    }

    /// Every session of a user, oldest first
    pub async fn sessions(&self, user_id: Uuid) -> Vec<Session> {
        self.store.sessions_for_user(user_id).await
    }

    /// Active sessions of a user, oldest first
    pub async fn active_sessions(&self, user_id: Uuid) -> Vec<Session> {
        let now = Utc::now();
        self.sessions(user_id)
            .await
            .into_iter()
            .filter(|s| s.is_active_at(now))
            .collect()
    }

    /// Login and return the token response body
    pub async fn login(&self, email: &str, device_id: &str) -> Value {
        let response = self
            .request(
                "POST",
                "/api/auth/login",
                Some(login_body(email, PASSWORD, device_id)),
                None,
            )
            .await;

        assert_eq!(
            response.status,
            StatusCode::OK,
            "Login failed: {:?}",
            response.body
        );

        // Keep created_at strictly increasing between logins
        tokio::time::sleep(std::time::Duration::from_millis(3)).await;
        response.body
    }

    /// Make an HTTP request to the test app
    pub async fn request(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> TestResponse {
        self.request_with_headers(method, path, body, token, &[]).await
    }

    /// Make an HTTP request with extra headers
    pub async fn request_with_headers(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
        token: Option<&str>,
        headers: &[(&str, &str)],
    ) -> TestResponse {
        self.request_from(DEFAULT_PEER, method, path, body, token, headers)
            .await
    }

    /// Make an HTTP request arriving from the socket address `peer`
    pub async fn request_from(
        &self,
        peer: &str,
        method: &str,
        path: &str,
        body: Option<Value>,
        token: Option<&str>,
        headers: &[(&str, &str)],
    ) -> TestResponse {
        let body_str = body
            .map(|b| serde_json::to_string(&b).expect("Failed to serialize body"))
            .unwrap_or_default();

        let mut req = Request::builder()
            .method(method)
            .uri(path)
            .header("Content-Type", "application/json");

        if let Some(token) = token {
            req = req.header("Authorization", format!("Bearer {token}"));
        }
        for (name, value) in headers {
            req = req.header(*name, *value);
        }

        let mut req = req
            .body(Body::from(body_str))
            .expect("Failed to build request");
        let peer: SocketAddr = peer.parse().expect("Invalid peer address");
        req.extensions_mut().insert(ConnectInfo(peer));

        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("Failed to read body");

        let body: Value = serde_json::from_slice(&body_bytes).unwrap_or(Value::Null);

        TestResponse { status, body }
    }
}

/// Configuration used by every test app
pub fn test_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.store.backend = StoreBackend::Memory;
    config.auth.jwt_secret = "integration-test-secret".to_string();
    config.session.retry.base_delay_ms = 1;
    config.session.retry.max_delay_ms = 5;
    config
}

/// JSON body of a login request
pub fn login_body(email: &str, password: &str, device_id: &str) -> Value {
    serde_json::json!({
        "email": email,
        "password": password,
        "deviceId": device_id,
        "deviceName": format!("{device_id} browser"),
    })
}

/// Read a string field of a response body
pub fn field<'a>(body: &'a Value, name: &str) -> &'a str {
    body.get(name)
        .and_then(|v| v.as_str())
        .unwrap_or_else(|| panic!("No {name} in {body}"))
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Parsed JSON body
    pub body: Value,
}

impl TestResponse {
    /// The `errors` array as strings
    pub fn errors(&self) -> Vec<String> {
        self.body
            .get("errors")
            .and_then(|v| v.as_array())
            .map(|a| {
                a.iter()
                    .filter_map(|e| e.as_str().map(String::from))
                    .collect()
            })
            .unwrap_or_default()
    }
}
