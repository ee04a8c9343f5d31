//! Auth handlers: login, refresh-token, revoke-token, check-session.

use axum::Json;
use axum::extract::State;

use warden_auth::LoginRequest as EngineLoginRequest;
use warden_entity::session::DeviceInfo;

use crate::dto::request::{CheckSessionQuery, LoginRequest, RefreshTokenRequest};
use crate::dto::response::{AuthTokenResponse, MessageResponse};
use crate::error::ApiError;
use crate::extractors::{AuthUser, ClientInfo, ValidatedJson, ValidatedQuery};
use crate::state::AppState;

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    client: ClientInfo,
    ValidatedJson(req): ValidatedJson<LoginRequest>,
) -> Result<Json<AuthTokenResponse>, ApiError> {
    let request = EngineLoginRequest {
        email: req.email,
        password: req.password,
        device: DeviceInfo {
            device_id: req.device_id,
            device_name: req.device_name,
            ip_address: client.ip_address,
            user_agent: client.user_agent,
        },
    };

    let outcome = state
        .session_manager
        .login(&request)
        .await
        .map_err(ApiError::rejected)?;

    Ok(Json(outcome.tokens.into()))
}

/// POST /api/auth/refresh-token
pub async fn refresh_token(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<RefreshTokenRequest>,
) -> Result<Json<AuthTokenResponse>, ApiError> {
    let outcome = state
        .session_manager
        .refresh(&req.refresh_token, &req.device_id)
        .await
        .map_err(ApiError::rejected)?;

    Ok(Json(outcome.tokens.into()))
}

/// POST /api/auth/revoke-token
pub async fn revoke_token(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(req): ValidatedJson<RefreshTokenRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    state
        .session_manager
        .revoke(&req.refresh_token, &req.device_id, auth.user_id)
        .await
        .map_err(ApiError::rejected)?;

    Ok(Json(MessageResponse::new("Token revoked successfully")))
}

/// GET /api/auth/check-session?deviceId=
pub async fn check_session(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedQuery(query): ValidatedQuery<CheckSessionQuery>,
) -> Result<Json<MessageResponse>, ApiError> {
    state
        .session_manager
        .check_session(auth.user_id, &query.device_id)
        .await
        .map_err(ApiError::session_check)?;

    Ok(Json(MessageResponse::new("Session is valid")))
}
