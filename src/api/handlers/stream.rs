//! Producer-side stream handlers: publish and client-key issuance.

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};

use super::require_bearer;
use crate::api::dto::{IssueKeyResponse, PublishRequest, PublishResponse};
use crate::app_state::AppState;
use crate::domain::ChannelId;
use crate::error::{ErrorResponse, GatewayError};

/// `POST /streams/{channel}/publish` — Publish an event to a channel.
///
/// The payload is sealed through the envelope codec before framing, so
/// subscribers receive an authenticated opaque token as the frame data.
///
/// # Errors
///
/// Returns [`GatewayError::AuthenticationFailed`] without the producer
/// bearer token and [`GatewayError::InvalidChannel`] for empty channel
/// names.
#[utoipa::path(
    post,
    path = "/api/v1/streams/{channel}/publish",
    tag = "Streams",
    summary = "Publish an event to a channel",
    description = "Formats an event frame with the channel's next sequence id and writes it to every live subscriber. Publishing to a channel with no subscribers is a cheap no-op returning a delivered count of 0.",
    request_body = PublishRequest,
    params(
        ("channel" = String, Path, description = "Channel name, e.g. a table id"),
    ),
    responses(
        (status = 200, description = "Frame delivered to current subscribers", body = PublishResponse),
        (status = 400, description = "Invalid channel or request", body = ErrorResponse),
        (status = 401, description = "Missing or invalid producer token", body = ErrorResponse),
    )
)]
pub async fn publish_event(
    State(state): State<AppState>,
    Path(channel): Path<String>,
    headers: HeaderMap,
    Json(req): Json<PublishRequest>,
) -> Result<impl IntoResponse, GatewayError> {
    require_bearer(&headers, &state.auth.producer_token)?;
    let channel = ChannelId::new(channel)?;
    if req.event_type.trim().is_empty() {
        return Err(GatewayError::InvalidRequest(
            "event_type must be non-empty".to_string(),
        ));
    }

    let payload = serde_json::to_string(&req.payload)
        .map_err(|e| GatewayError::InvalidRequest(e.to_string()))?;
    let sealed = state
        .envelope
        .encode(&payload)
        .map_err(|e| GatewayError::EnvelopeError(e.to_string()))?;

    let delivered = state
        .broadcaster
        .publish(&channel, &req.event_type, &sealed)
        .await;

    Ok(Json(PublishResponse {
        channel: channel.as_str().to_string(),
        delivered,
    }))
}

/// `POST /streams/{channel}/keys` — Issue a sealed stream client key.
///
/// The out-of-band key-exchange step: an authorized backend requests a
/// short-lived key here and hands it to the end client, which presents it
/// on the SSE subscribe endpoint.
///
/// # Errors
///
/// Returns [`GatewayError::AuthenticationFailed`] without the producer
/// bearer token and [`GatewayError::InvalidChannel`] for empty channel
/// names.
#[utoipa::path(
    post,
    path = "/api/v1/streams/{channel}/keys",
    tag = "Streams",
    summary = "Issue a stream client key",
    params(
        ("channel" = String, Path, description = "Channel the key grants access to"),
    ),
    responses(
        (status = 201, description = "Key issued", body = IssueKeyResponse),
        (status = 400, description = "Invalid channel", body = ErrorResponse),
        (status = 401, description = "Missing or invalid producer token", body = ErrorResponse),
    )
)]
pub async fn issue_client_key(
    State(state): State<AppState>,
    Path(channel): Path<String>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, GatewayError> {
    require_bearer(&headers, &state.auth.producer_token)?;
    let channel = ChannelId::new(channel)?;

    let (key, expires_at) = state.client_keys.issue(&channel)?;
    tracing::info!(%channel, %expires_at, "client key issued");

    Ok((
        StatusCode::CREATED,
        Json(IssueKeyResponse {
            channel: channel.as_str().to_string(),
            key,
            expires_at,
        }),
    ))
}

/// Stream producer routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/streams/{channel}/publish", post(publish_event))
        .route("/streams/{channel}/keys", post(issue_client_key))
}
