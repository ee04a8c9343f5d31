//! Request DTOs with validation.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Login request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    /// Email.
    #[validate(length(min = 1, message = "Email is required"))]
    #[serde(default)]
    pub email: String,
    /// Password.
    #[validate(length(min = 1, message = "Password is required"))]
    #[serde(default)]
    pub password: String,
    /// Stable client device identifier.
    #[validate(length(min = 1, message = "Device ID is required"))]
    #[serde(default)]
    pub device_id: String,
    /// Display name of the device.
    #[serde(default)]
    pub device_name: String,
}

/// Token refresh and revoke request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RefreshTokenRequest {
    /// Refresh token.
    #[validate(length(min = 1, message = "Refresh token is required"))]
    #[serde(default)]
    pub refresh_token: String,
    /// Device the token was issued to.
    #[validate(length(min = 1, message = "Device ID is required"))]
    #[serde(default)]
    pub device_id: String,
}

/// Query string of the session check.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CheckSessionQuery {
    /// Device to check.
    #[validate(length(min = 1, message = "Device ID is required"))]
    #[serde(default)]
    pub device_id: String,
}
