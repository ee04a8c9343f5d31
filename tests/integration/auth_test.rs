//! Integration tests for the authentication flow.

mod helpers;

use http::StatusCode;

use helpers::{PASSWORD, TestApp, field, login_body, test_config};

#[tokio::test]
async fn test_login_success() {
    let app = TestApp::new();
    app.create_test_user("alice@example.com", 3).await;

    let body = app.login("alice@example.com", "laptop").await;

    assert!(!field(&body, "accessToken").is_empty());
    assert!(!field(&body, "refreshToken").is_empty());
    assert!(body.get("accessTokenExpiresAt").is_some());
    assert!(body.get("refreshTokenExpiresAt").is_some());
    assert_eq!(body["isEmailVerified"], true);
    assert_eq!(body["activeSessions"], 1);
    assert_eq!(body["oldestSessionRevoked"], false);
    assert_eq!(body["maxAllowedSessions"], 3);
}

#[tokio::test]
async fn test_login_errors_do_not_reveal_which_check_failed() {
    let app = TestApp::new();
    app.create_test_user("bob@example.com", 3).await;

    let wrong_password = app
        .request(
            "POST",
            "/api/auth/login",
            Some(login_body("bob@example.com", "not-the-password", "phone")),
            None,
        )
        .await;
    let unknown_email = app
        .request(
            "POST",
            "/api/auth/login",
            Some(login_body("nobody@example.com", PASSWORD, "phone")),
            None,
        )
        .await;

    assert_eq!(wrong_password.status, StatusCode::BAD_REQUEST);
    assert_eq!(unknown_email.status, wrong_password.status);
    assert_eq!(unknown_email.body, wrong_password.body);
    assert_eq!(wrong_password.errors(), vec!["Invalid credentials"]);
}

#[tokio::test]
async fn test_login_validation() {
    let app = TestApp::new();

    let response = app
        .request(
            "POST",
            "/api/auth/login",
            Some(serde_json::json!({ "email": "carol@example.com" })),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    let errors = response.errors();
    assert!(errors.contains(&"Password is required".to_string()));
    assert!(errors.contains(&"Device ID is required".to_string()));
}

#[tokio::test]
async fn test_login_records_peer_address() {
    let app = TestApp::new();
    let user_id = app.create_test_user("dave@example.com", 3).await;

    let response = app
        .request_from(
            "203.0.113.7:51000",
            "POST",
            "/api/auth/login",
            Some(login_body("dave@example.com", PASSWORD, "tablet")),
            None,
            &[
                ("x-forwarded-for", "198.51.100.23"),
                ("user-agent", "warden-tests/1.0"),
            ],
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);

    // Forwarding headers are not trusted by default
    let sessions = app.sessions(user_id).await;
    assert_eq!(sessions.len(), 1);
    assert_eq!(sessions[0].ip_address.as_deref(), Some("203.0.113.7"));
    assert_eq!(sessions[0].user_agent.as_deref(), Some("warden-tests/1.0"));
    assert_eq!(sessions[0].device_name, "tablet browser");
}

#[tokio::test]
async fn test_login_records_forwarded_address_behind_trusted_proxy() {
    let mut config = test_config();
    config.server.trust_proxy_headers = true;
    let app = TestApp::with_config(config);
    let user_id = app.create_test_user("dana@example.com", 3).await;

    let response = app
        .request_from(
            "10.0.0.1:443",
            "POST",
            "/api/auth/login",
            Some(login_body("dana@example.com", PASSWORD, "tablet")),
            None,
            &[("x-forwarded-for", "198.51.100.23, 10.0.0.1")],
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);

    let sessions = app.sessions(user_id).await;
    assert_eq!(sessions[0].ip_address.as_deref(), Some("198.51.100.23"));
}

#[tokio::test]
async fn test_refresh_keeps_refresh_token() {
    let app = TestApp::new();
    app.create_test_user("erin@example.com", 3).await;
    let login = app.login("erin@example.com", "laptop").await;
    let refresh_token = field(&login, "refreshToken");

    let response = app
        .request(
            "POST",
            "/api/auth/refresh-token",
            Some(serde_json::json!({ "refreshToken": refresh_token, "deviceId": "laptop" })),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);
    assert_eq!(field(&response.body, "refreshToken"), refresh_token);
    assert_eq!(
        response.body["refreshTokenExpiresAt"],
        login["refreshTokenExpiresAt"]
    );
    assert_ne!(
        field(&response.body, "accessToken"),
        field(&login, "accessToken")
    );
}

#[tokio::test]
async fn test_refresh_from_other_device_is_rejected() {
    let app = TestApp::new();
    app.create_test_user("frank@example.com", 3).await;
    let login = app.login("frank@example.com", "laptop").await;

    let response = app
        .request(
            "POST",
            "/api/auth/refresh-token",
            Some(serde_json::json!({
                "refreshToken": field(&login, "refreshToken"),
                "deviceId": "phone",
            })),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.errors(), vec!["Invalid device id"]);
}

#[tokio::test]
async fn test_refresh_validation() {
    let app = TestApp::new();

    let response = app
        .request(
            "POST",
            "/api/auth/refresh-token",
            Some(serde_json::json!({ "refreshToken": "", "deviceId": "" })),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        response.errors(),
        vec!["Device ID is required", "Refresh token is required"]
    );
}

#[tokio::test]
async fn test_revoke_requires_authentication() {
    let app = TestApp::new();

    let response = app
        .request(
            "POST",
            "/api/auth/revoke-token",
            Some(serde_json::json!({ "refreshToken": "x", "deviceId": "laptop" })),
            Some("not-a-jwt"),
        )
        .await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.body["status"], 401);
    assert_eq!(response.body["message"], "Unauthorized access");
    assert_eq!(
        response.errors(),
        vec!["You are not authorized to access this resource"]
    );
}

#[tokio::test]
async fn test_revoke_then_refresh_fails() {
    let app = TestApp::new();
    app.create_test_user("grace@example.com", 3).await;
    let login = app.login("grace@example.com", "laptop").await;
    let access = field(&login, "accessToken");
    let body = serde_json::json!({
        "refreshToken": field(&login, "refreshToken"),
        "deviceId": "laptop",
    });

    let revoked = app
        .request("POST", "/api/auth/revoke-token", Some(body.clone()), Some(access))
        .await;
    assert_eq!(revoked.status, StatusCode::OK);
    assert_eq!(revoked.body["message"], "Token revoked successfully");

    // Revoking again is harmless
    let again = app
        .request("POST", "/api/auth/revoke-token", Some(body.clone()), Some(access))
        .await;
    assert_eq!(again.status, StatusCode::OK);

    let refresh = app
        .request("POST", "/api/auth/refresh-token", Some(body), None)
        .await;
    assert_eq!(refresh.status, StatusCode::BAD_REQUEST);
    assert_eq!(refresh.errors(), vec!["Refresh token is invalid or expired"]);
}

#[tokio::test]
async fn test_revoke_someone_elses_session() {
    let app = TestApp::new();
    app.create_test_user("heidi@example.com", 3).await;
    app.create_test_user("ivan@example.com", 3).await;
    let heidi = app.login("heidi@example.com", "laptop").await;
    let ivan = app.login("ivan@example.com", "laptop").await;

    let response = app
        .request(
            "POST",
            "/api/auth/revoke-token",
            Some(serde_json::json!({
                "refreshToken": field(&heidi, "refreshToken"),
                "deviceId": "laptop",
            })),
            Some(field(&ivan, "accessToken")),
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.errors(), vec!["Unauthorized to revoke this token"]);
}

#[tokio::test]
async fn test_check_session_states() {
    let app = TestApp::new();
    app.create_test_user("judy@example.com", 3).await;
    let login = app.login("judy@example.com", "laptop").await;
    let access = field(&login, "accessToken");

    let valid = app
        .request("GET", "/api/auth/check-session?deviceId=laptop", None, Some(access))
        .await;
    assert_eq!(valid.status, StatusCode::OK);
    assert_eq!(valid.body["message"], "Session is valid");

    let unknown = app
        .request("GET", "/api/auth/check-session?deviceId=phone", None, Some(access))
        .await;
    assert_eq!(unknown.status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown.errors(), vec!["Session not found"]);

    app.request(
        "POST",
        "/api/auth/revoke-token",
        Some(serde_json::json!({
            "refreshToken": field(&login, "refreshToken"),
            "deviceId": "laptop",
        })),
        Some(access),
    )
    .await;

    let revoked = app
        .request("GET", "/api/auth/check-session?deviceId=laptop", None, Some(access))
        .await;
    assert_eq!(revoked.status, StatusCode::UNAUTHORIZED);
    assert_eq!(revoked.errors(), vec!["Session revoked"]);
}

#[tokio::test]
async fn test_check_session_requires_authentication() {
    let app = TestApp::new();

    let response = app
        .request("GET", "/api/auth/check-session?deviceId=laptop", None, None)
        .await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.body["status"], 401);
}

#[tokio::test]
async fn test_health() {
    let app = TestApp::new();

    let response = app.request("GET", "/api/health", None, None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["status"], "ok");
    assert_eq!(response.body["store"], "connected");
}
