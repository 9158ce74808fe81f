//! REST endpoint handlers organized by resource.

pub mod stream;
pub mod system;
pub mod webhook;

use axum::Router;
use axum::http::HeaderMap;

use crate::app_state::AppState;
use crate::error::GatewayError;

/// Composes all resource routes under `/api/v1`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(stream::routes())
        .merge(webhook::routes())
}

/// Checks an `Authorization: Bearer <token>` header against `expected`.
pub(crate) fn require_bearer(headers: &HeaderMap, expected: &str) -> Result<(), GatewayError> {
    let value = headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| GatewayError::AuthenticationFailed("missing bearer token".to_string()))?;
    let token = value
        .strip_prefix("Bearer ")
        .ok_or_else(|| GatewayError::AuthenticationFailed("malformed bearer token".to_string()))?;
    if token != expected {
        return Err(GatewayError::AuthenticationFailed(
            "invalid bearer token".to_string(),
        ));
    }
    Ok(())
}

/// Checks a custom shared-secret header against `expected`.
pub(crate) fn require_header_token(
    headers: &HeaderMap,
    name: &str,
    expected: &str,
) -> Result<(), GatewayError> {
    let value = headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| GatewayError::AuthenticationFailed(format!("missing {name} header")))?;
    if value != expected {
        return Err(GatewayError::AuthenticationFailed(format!(
            "invalid {name} header"
        )));
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn bearer_check_accepts_matching_token() {
        let mut headers = HeaderMap::new();
        headers.insert(
            axum::http::header::AUTHORIZATION,
            axum::http::HeaderValue::from_static("Bearer secret"),
        );
        assert!(require_bearer(&headers, "secret").is_ok());
    }

    #[test]
    fn bearer_check_rejects_missing_and_wrong_tokens() {
        let empty = HeaderMap::new();
        assert!(require_bearer(&empty, "secret").is_err());

        let mut headers = HeaderMap::new();
        headers.insert(
            axum::http::header::AUTHORIZATION,
            axum::http::HeaderValue::from_static("Bearer wrong"),
        );
        assert!(require_bearer(&headers, "secret").is_err());
    }

    #[test]
    fn header_token_check_matches_exactly() {
        let mut headers = HeaderMap::new();
        headers.insert("x-webhook-token", axum::http::HeaderValue::from_static("s3cret"));
        assert!(require_header_token(&headers, "x-webhook-token", "s3cret").is_ok());
        assert!(require_header_token(&headers, "x-webhook-token", "other").is_err());
    }
}
