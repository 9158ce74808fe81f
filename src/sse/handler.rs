//! SSE subscribe endpoint.
//!
//! A client opens one long-lived connection per channel. The handler
//! verifies the sealed client key, registers an mpsc-backed sink with the
//! broadcaster, and streams pre-formatted frames as the response body.
//! When the client disconnects the receiver drops, the next write to the
//! sink fails, and the broadcaster prunes it — there is no proactive
//! dead-connection detection beyond that.

use std::convert::Infallible;

use axum::body::Body;
use axum::extract::{Path, Query, State};
use axum::http::header;
use axum::response::IntoResponse;
use serde::Deserialize;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::UnboundedReceiverStream;

use crate::app_state::AppState;
use crate::domain::{ChannelId, MpscSink};
use crate::error::GatewayError;

/// Query parameters for the stream endpoint.
#[derive(Debug, Deserialize)]
pub struct StreamQuery {
    /// Sealed client key authorizing the subscription.
    pub key: String,
}

/// `GET /api/v1/streams/{channel}` — Subscribe to a channel's event
/// stream.
///
/// # Errors
///
/// Returns [`GatewayError::InvalidChannel`] for an empty channel name and
/// [`GatewayError::InvalidClientKey`] when the key fails verification.
#[utoipa::path(
    get,
    path = "/api/v1/streams/{channel}",
    tag = "Streams",
    summary = "Subscribe to a channel event stream",
    description = "Opens a long-lived SSE connection delivering every frame published on the channel. Requires a sealed client key issued by the key endpoint. Clients must tolerate keep-alive comment frames and reconnect with backoff on transport errors; there is no resume-from-sequence support.",
    params(
        ("channel" = String, Path, description = "Channel name, e.g. a table id"),
        ("key" = String, Query, description = "Sealed client key"),
    ),
    responses(
        (status = 200, description = "SSE stream of event frames"),
        (status = 400, description = "Invalid channel name"),
        (status = 401, description = "Missing, mismatched, or expired client key"),
    )
)]
pub async fn stream_handler(
    State(state): State<AppState>,
    Path(channel): Path<String>,
    Query(query): Query<StreamQuery>,
) -> Result<impl IntoResponse, GatewayError> {
    let channel = ChannelId::new(channel)?;
    state.client_keys.verify(&query.key, &channel)?;

    let (sink, rx) = MpscSink::channel();
    let handle = state.broadcaster.subscribe(channel, Box::new(sink)).await;
    tracing::info!(channel = %handle.channel, subscriber = %handle.id, "sse stream opened");

    let frames = UnboundedReceiverStream::new(rx).map(Ok::<_, Infallible>);
    let body = Body::from_stream(frames);

    Ok((
        [
            (header::CONTENT_TYPE, "text/event-stream"),
            (header::CACHE_CONTROL, "no-cache"),
            (header::CONNECTION, "keep-alive"),
        ],
        body,
    ))
}
