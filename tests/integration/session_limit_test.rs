//! Integration tests for session limits, eviction and device replacement.

mod helpers;

use http::StatusCode;

use helpers::{TestApp, field};

#[tokio::test]
async fn test_third_device_evicts_oldest() {
    let app = TestApp::new();
    let user_id = app.create_test_user("limit@example.com", 2).await;

    let a = app.login("limit@example.com", "device-a").await;
    let b = app.login("limit@example.com", "device-b").await;
    assert_eq!(b["activeSessions"], 2);
    assert_eq!(b["oldestSessionRevoked"], false);

    let c = app.login("limit@example.com", "device-c").await;
    assert_eq!(c["activeSessions"], 2);
    assert_eq!(c["oldestSessionRevoked"], true);
    assert_eq!(c["maxAllowedSessions"], 2);

    let active: Vec<String> = app
        .active_sessions(user_id)
        .await
        .into_iter()
        .map(|s| s.device_id)
        .collect();
    assert_eq!(active, vec!["device-b", "device-c"]);

    // The evicted device can no longer refresh
    let response = app
        .request(
            "POST",
            "/api/auth/refresh-token",
            Some(serde_json::json!({
                "refreshToken": field(&a, "refreshToken"),
                "deviceId": "device-a",
            })),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_same_device_login_replaces_session() {
    let app = TestApp::new();
    let user_id = app.create_test_user("replace@example.com", 2).await;

    let first = app.login("replace@example.com", "laptop").await;
    app.login("replace@example.com", "phone").await;
    let second = app.login("replace@example.com", "laptop").await;

    // Replacement frees the slot, so nothing on another device is evicted
    assert_eq!(second["activeSessions"], 2);
    assert_eq!(second["oldestSessionRevoked"], false);
    assert_ne!(field(&first, "refreshToken"), field(&second, "refreshToken"));

    let sessions = app.sessions(user_id).await;
    assert_eq!(sessions.len(), 3);
    assert!(sessions[0].is_revoked);
    assert_eq!(sessions[0].device_id, "laptop");
    assert!(!sessions[1].is_revoked);
    assert!(!sessions[2].is_revoked);
}

#[tokio::test]
async fn test_check_session_after_eviction() {
    let app = TestApp::new();
    app.create_test_user("evicted@example.com", 1).await;

    let first = app.login("evicted@example.com", "laptop").await;
    app.login("evicted@example.com", "phone").await;

    let response = app
        .request(
            "GET",
            "/api/auth/check-session?deviceId=laptop",
            None,
            Some(field(&first, "accessToken")),
        )
        .await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.errors(), vec!["Session revoked"]);
}
