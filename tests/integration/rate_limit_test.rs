//! Integration tests for the refresh endpoint rate limit.

mod helpers;

use http::StatusCode;

use helpers::{TestApp, TestResponse, field, test_config};

fn refresh_body(token: &str) -> serde_json::Value {
    serde_json::json!({ "refreshToken": token, "deviceId": "laptop" })
}

async fn refresh_from(
    app: &TestApp,
    peer: &str,
    token: &str,
    headers: &[(&str, &str)],
) -> TestResponse {
    app.request_from(
        peer,
        "POST",
        "/api/auth/refresh-token",
        Some(refresh_body(token)),
        None,
        headers,
    )
    .await
}

#[tokio::test]
async fn test_refresh_is_rate_limited_per_peer() {
    let mut config = test_config();
    config.rate_limit.refresh_requests = 2;
    let app = TestApp::with_config(config);
    app.create_test_user("busy@example.com", 3).await;
    let login = app.login("busy@example.com", "laptop").await;
    let token = field(&login, "refreshToken");

    for _ in 0..2 {
        let response = refresh_from(&app, "192.0.2.10:50001", token, &[]).await;
        assert_eq!(response.status, StatusCode::OK);
    }

    let limited = refresh_from(&app, "192.0.2.10:50002", token, &[]).await;
    assert_eq!(limited.status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(limited.errors(), vec!["Too many requests"]);

    // Another caller without proxy headers has its own window
    let other = refresh_from(&app, "192.0.2.11:50001", token, &[]).await;
    assert_eq!(other.status, StatusCode::OK);
}

#[tokio::test]
async fn test_rotating_forwarded_header_does_not_reset_window() {
    let mut config = test_config();
    config.rate_limit.refresh_requests = 2;
    let app = TestApp::with_config(config);
    app.create_test_user("rotate@example.com", 3).await;
    let login = app.login("rotate@example.com", "laptop").await;
    let token = field(&login, "refreshToken");

    let mut accepted = 0;
    for i in 0..6 {
        let forwarded = format!("198.51.100.{i}");
        let response = refresh_from(
            &app,
            "192.0.2.20:50000",
            token,
            &[("x-forwarded-for", forwarded.as_str())],
        )
        .await;
        if response.status == StatusCode::OK {
            accepted += 1;
        } else {
            assert_eq!(response.status, StatusCode::TOO_MANY_REQUESTS);
        }
    }

    assert_eq!(accepted, 2);
}

#[tokio::test]
async fn test_trusted_proxy_header_keys_the_window() {
    let mut config = test_config();
    config.rate_limit.refresh_requests = 2;
    config.server.trust_proxy_headers = true;
    let app = TestApp::with_config(config);
    app.create_test_user("proxied@example.com", 3).await;
    let login = app.login("proxied@example.com", "laptop").await;
    let token = field(&login, "refreshToken");

    // Every request arrives from the proxy's address
    let proxy = "10.0.0.1:443";
    let client = [("x-forwarded-for", "192.0.2.10")];
    for _ in 0..2 {
        let response = refresh_from(&app, proxy, token, &client).await;
        assert_eq!(response.status, StatusCode::OK);
    }

    let limited = refresh_from(&app, proxy, token, &client).await;
    assert_eq!(limited.status, StatusCode::TOO_MANY_REQUESTS);

    let other = refresh_from(&app, proxy, token, &[("x-forwarded-for", "192.0.2.11")]).await;
    assert_eq!(other.status, StatusCode::OK);
}

#[tokio::test]
async fn test_login_is_not_rate_limited() {
    let mut config = test_config();
    config.rate_limit.refresh_requests = 1;
    let app = TestApp::with_config(config);
    app.create_test_user("often@example.com", 5).await;

    for device in ["a", "b", "c"] {
        app.login("often@example.com", device).await;
    }
}
