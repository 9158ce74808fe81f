//! Gateway error types with HTTP status code mapping.
//!
//! [`GatewayError`] is the central error type for the gateway. Each variant
//! maps to a specific HTTP status code and structured JSON error response.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

/// Structured JSON error response body.
///
/// All error responses follow this shape:
/// ```json
/// {
///   "error": {
///     "code": 1002,
///     "message": "invalid channel: must be non-empty",
///     "details": null
///   }
/// }
/// ```
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    /// Structured error payload.
    pub error: ErrorBody,
}

/// Inner error body with numeric code and human-readable message.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ErrorBody {
    /// Numeric error code (see code ranges below).
    pub code: u32,
    /// Human-readable error message.
    pub message: String,
    /// Optional additional details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Server-side error enum with HTTP status code mapping.
///
/// # Error Code Ranges
///
/// | Range     | Category        | HTTP Status                |
/// |-----------|-----------------|----------------------------|
/// | 1000–1999 | Validation      | 400 Bad Request            |
/// | 2000–2999 | Auth            | 401 Unauthorized           |
/// | 3000–3999 | Server          | 500 Internal Server Error  |
/// | 4000–4999 | Ledger-Specific | 409 Conflict               |
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// Request validation failed.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Channel identifier is empty or otherwise malformed.
    #[error("invalid channel: {0}")]
    InvalidChannel(String),

    /// Webhook body is missing a required field.
    #[error("malformed webhook payload: {0}")]
    MalformedWebhook(String),

    /// Shared-secret header was missing or did not match.
    #[error("authentication failed: {0}")]
    AuthenticationFailed(String),

    /// A sealed client key failed verification or has expired.
    #[error("invalid client key: {0}")]
    InvalidClientKey(String),

    /// A second delivery of an already-recorded event id.
    #[error("duplicate event: {0}")]
    DuplicateEvent(String),

    /// Persistence layer failure.
    #[error("persistence error: {0}")]
    PersistenceError(String),

    /// Sealed-envelope encode/decode failure.
    #[error("envelope error: {0}")]
    EnvelopeError(String),

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl GatewayError {
    /// Returns the numeric error code for this variant.
    #[must_use]
    pub const fn error_code(&self) -> u32 {
        match self {
            Self::InvalidRequest(_) => 1001,
            Self::InvalidChannel(_) => 1002,
            Self::MalformedWebhook(_) => 1003,
            Self::AuthenticationFailed(_) => 2001,
            Self::InvalidClientKey(_) => 2002,
            Self::DuplicateEvent(_) => 4001,
            Self::PersistenceError(_) => 3001,
            Self::EnvelopeError(_) => 3002,
            Self::Internal(_) => 3000,
        }
    }

    /// Returns the HTTP status code for this variant.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidRequest(_) | Self::InvalidChannel(_) | Self::MalformedWebhook(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::AuthenticationFailed(_) | Self::InvalidClientKey(_) => StatusCode::UNAUTHORIZED,
            Self::DuplicateEvent(_) => StatusCode::CONFLICT,
            Self::PersistenceError(_) | Self::EnvelopeError(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.error_code(),
                message: self.to_string(),
                details: None,
            },
        };
        let mut response = axum::Json(body).into_response();
        *response.status_mut() = status;
        response
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn validation_errors_map_to_400() {
        assert_eq!(
            GatewayError::InvalidChannel("must be non-empty".to_string()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            GatewayError::MalformedWebhook("missing id".to_string()).status_code(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn auth_errors_map_to_401() {
        assert_eq!(
            GatewayError::AuthenticationFailed("bad token".to_string()).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            GatewayError::InvalidClientKey("expired".to_string()).status_code(),
            StatusCode::UNAUTHORIZED
        );
    }

    #[test]
    fn error_codes_follow_ranges() {
        assert_eq!(
            GatewayError::InvalidRequest(String::new()).error_code(),
            1001
        );
        assert_eq!(
            GatewayError::AuthenticationFailed(String::new()).error_code(),
            2001
        );
        assert_eq!(
            GatewayError::PersistenceError(String::new()).error_code(),
            3001
        );
        assert_eq!(
            GatewayError::DuplicateEvent(String::new()).error_code(),
            4001
        );
    }
}
