//! System endpoints: health check and the event-type catalog.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use serde::Serialize;
use utoipa::ToSchema;

use crate::app_state::AppState;
use crate::domain::known_event_types;

/// Health check response.
#[derive(Debug, Serialize, ToSchema)]
struct HealthResponse {
    status: String,
    timestamp: String,
    version: String,
}

/// `GET /health` — Service health status.
#[utoipa::path(
    get,
    path = "/health",
    tag = "System",
    summary = "Health check",
    description = "Returns service health status, version, and current timestamp.",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse),
    )
)]
pub async fn health_handler() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "healthy".to_string(),
            timestamp: Utc::now().to_rfc3339(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }),
    )
}

/// One entry of the provider event-type catalog.
#[derive(Debug, Serialize, ToSchema)]
struct EventTypeInfo {
    event_type: &'static str,
    target_status: &'static str,
}

/// `GET /config/event-types` — List provider event types and their
/// mapped subscription statuses.
#[utoipa::path(
    get,
    path = "/config/event-types",
    tag = "System",
    summary = "List known provider event types",
    description = "Returns every provider event type with an explicit status mapping. Event types outside this catalog map to `pending`.",
    responses(
        (status = 200, description = "Event type catalog", body = Vec<EventTypeInfo>),
    )
)]
pub async fn event_types_handler() -> impl IntoResponse {
    let types: Vec<EventTypeInfo> = known_event_types()
        .into_iter()
        .map(|(event_type, status)| EventTypeInfo {
            event_type,
            target_status: status.as_str(),
        })
        .collect();
    (StatusCode::OK, Json(types))
}

/// System routes mounted at the root level (not under /api/v1).
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_handler))
        .route("/config/event-types", get(event_types_handler))
}
