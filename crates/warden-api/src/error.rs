//! Maps engine results to HTTP responses.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use validator::ValidationErrors;

use warden_auth::AuthError;
use warden_core::error::AppError;

/// Message returned for every fault. The detail is logged, never sent.
const FAULT_MESSAGE: &str = "An error occurred while processing your request";

/// Error body shared by every endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    /// HTTP status, only present on authentication failures.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    /// Summary, only present on authentication failures.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Human-readable error messages.
    pub errors: Vec<String>,
}

/// Handler-level error type.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Malformed or missing input, one message per problem.
    #[error("Validation failed: {}", .0.join(", "))]
    Validation(Vec<String>),

    /// A login, refresh or revoke was refused.
    #[error("{0}")]
    Rejected(String),

    /// A session check failed.
    #[error("{0}")]
    SessionInvalid(String),

    /// Missing or invalid access token.
    #[error("Unauthorized access")]
    Unauthenticated,

    /// Rate limit exceeded.
    #[error("Too many requests")]
    TooManyRequests,

    /// Infrastructure failure.
    #[error(transparent)]
    Fault(#[from] AppError),
}

impl ApiError {
    /// Map an engine error from login, refresh or revoke.
    pub fn rejected(err: AuthError) -> Self {
        match err {
            AuthError::Fault(e) => Self::Fault(e),
            other => Self::Rejected(other.to_string()),
        }
    }

    /// Map an engine error from a session check.
    pub fn session_check(err: AuthError) -> Self {
        match err {
            AuthError::Fault(e) => Self::Fault(e),
            other => Self::SessionInvalid(other.to_string()),
        }
    }

    /// The HTTP status for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::Rejected(_) => StatusCode::BAD_REQUEST,
            Self::SessionInvalid(_) | Self::Unauthenticated => StatusCode::UNAUTHORIZED,
            Self::TooManyRequests => StatusCode::TOO_MANY_REQUESTS,
            Self::Fault(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        let mut messages: Vec<(String, String)> = Vec::new();
        for (field, errs) in errors.field_errors() {
            for e in errs.iter() {
                let message = match &e.message {
                    Some(m) => m.to_string(),
                    None => format!("{field} is invalid"),
                };
                messages.push((field.to_string(), message));
            }
        }
        // field_errors() is a HashMap; sort for a stable body
        messages.sort();
        Self::Validation(messages.into_iter().map(|(_, m)| m).collect())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            Self::Validation(errors) => ErrorBody {
                status: None,
                message: None,
                errors,
            },
            Self::Rejected(message) | Self::SessionInvalid(message) => ErrorBody {
                status: None,
                message: None,
                errors: vec![message],
            },
            Self::Unauthenticated => ErrorBody {
                status: Some(status.as_u16()),
                message: Some("Unauthorized access".to_string()),
                errors: vec!["You are not authorized to access this resource".to_string()],
            },
            Self::TooManyRequests => ErrorBody {
                status: None,
                message: None,
                errors: vec!["Too many requests".to_string()],
            },
            Self::Fault(e) => {
                tracing::error!(kind = %e.kind, error = %e, "Request failed");
                ErrorBody {
                    status: None,
                    message: None,
                    errors: vec![FAULT_MESSAGE.to_string()],
                }
            }
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[derive(Validate)]
    struct Form {
        #[validate(length(min = 1, message = "Refresh token is required"))]
        refresh_token: String,
        #[validate(length(min = 1, message = "Device ID is required"))]
        device_id: String,
    }

    #[test]
    fn test_business_errors_are_bad_requests() {
        let err = ApiError::rejected(AuthError::DeviceMismatch);
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.to_string(), "Invalid device id");
    }

    #[test]
    fn test_session_check_errors_are_unauthorized() {
        let err = ApiError::session_check(AuthError::SessionExpired);
        assert_eq!(err.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_faults_are_internal() {
        let err = ApiError::rejected(AuthError::Fault(AppError::database("boom")));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let err = ApiError::session_check(AuthError::Fault(AppError::transient("40001")));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_validation_messages_are_collected() {
        let form = Form {
            refresh_token: String::new(),
            device_id: String::new(),
        };
        let err = ApiError::from(form.validate().unwrap_err());
        match err {
            ApiError::Validation(messages) => assert_eq!(
                messages,
                vec!["Device ID is required", "Refresh token is required"]
            ),
            other => panic!("unexpected {other:?}"),
        }
    }
}
