//! Client address and user agent of a request.

use std::convert::Infallible;
use std::net::SocketAddr;

use axum::extract::{ConnectInfo, FromRequestParts};
use axum::http::request::Parts;
use axum::http::{Extensions, HeaderMap};

use crate::state::AppState;

/// The first `X-Forwarded-For` hop, else `X-Real-IP`.
pub fn forwarded_ip(headers: &HeaderMap) -> Option<String> {
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty());

    let real_ip = || {
        headers
            .get("x-real-ip")
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
    };

    forwarded.or_else(real_ip).map(String::from)
}

/// The socket peer's IP, when the server was started with connect info.
pub fn peer_ip(extensions: &Extensions) -> Option<String> {
    extensions
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
}

/// The client's IP address.
///
/// Forwarding headers are client-controlled, so they are consulted only when
/// `trust_proxy_headers` is set. The socket peer is used otherwise, and as
/// the fallback when a trusted proxy sent no header.
pub fn client_ip(
    headers: &HeaderMap,
    extensions: &Extensions,
    trust_proxy_headers: bool,
) -> Option<String> {
    trust_proxy_headers
        .then(|| forwarded_ip(headers))
        .flatten()
        .or_else(|| peer_ip(extensions))
}

/// Client metadata recorded on login.
#[derive(Debug, Clone, Default)]
pub struct ClientInfo {
    /// See [`client_ip`].
    pub ip_address: Option<String>,
    /// `User-Agent` header.
    pub user_agent: Option<String>,
}

impl FromRequestParts<AppState> for ClientInfo {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user_agent = parts
            .headers
            .get("user-agent")
            .and_then(|v| v.to_str().ok())
            .map(String::from);

        Ok(ClientInfo {
            ip_address: client_ip(
                &parts.headers,
                &parts.extensions,
                state.config.server.trust_proxy_headers,
            ),
            user_agent,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn peer(addr: &str) -> Extensions {
        let mut extensions = Extensions::new();
        extensions.insert(ConnectInfo(addr.parse::<SocketAddr>().unwrap()));
        extensions
    }

    fn spoofed() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_static("198.51.100.4, 10.0.0.1"),
        );
        headers.insert("x-real-ip", HeaderValue::from_static("10.0.0.9"));
        headers
    }

    #[test]
    fn test_first_forwarded_hop_wins() {
        assert_eq!(forwarded_ip(&spoofed()).as_deref(), Some("198.51.100.4"));
    }

    #[test]
    fn test_real_ip_fallback() {
        let mut headers = HeaderMap::new();
        headers.insert("x-real-ip", HeaderValue::from_static("10.0.0.9"));
        assert_eq!(forwarded_ip(&headers).as_deref(), Some("10.0.0.9"));
        assert_eq!(forwarded_ip(&HeaderMap::new()), None);
    }

    #[test]
    fn test_untrusted_headers_are_ignored() {
        let extensions = peer("203.0.113.7:51000");
        assert_eq!(
            client_ip(&spoofed(), &extensions, false).as_deref(),
            Some("203.0.113.7")
        );
    }

    #[test]
    fn test_trusted_headers_win_over_peer() {
        let extensions = peer("10.0.0.1:51000");
        assert_eq!(
            client_ip(&spoofed(), &extensions, true).as_deref(),
            Some("198.51.100.4")
        );
        assert_eq!(
            client_ip(&HeaderMap::new(), &extensions, true).as_deref(),
            Some("10.0.0.1")
        );
    }

    #[test]
    fn test_no_peer_and_no_trust() {
        assert_eq!(client_ip(&spoofed(), &Extensions::new(), false), None);
    }
}
