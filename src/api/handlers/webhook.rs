//! Webhook intake and stats handlers.
//!
//! The intake endpoint is the public boundary of the ingestion ledger:
//! authentication and validation reject before the ledger is touched, and
//! everything past that point is acknowledged with a 200-class status no
//! matter how processing turns out, so the provider never retries a
//! poison event forever.

use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;

use super::{require_bearer, require_header_token};
use crate::api::dto::{StatsQuery, WebhookAck};
use crate::app_state::AppState;
use crate::error::{ErrorResponse, GatewayError};
use crate::ledger::{IngestOutcome, ingest};

/// Shared-secret header the billing provider sends with every delivery.
pub const WEBHOOK_TOKEN_HEADER: &str = "x-webhook-token";

/// `POST /webhooks/billing` — Ingest one provider notification.
///
/// # Errors
///
/// Returns [`GatewayError::AuthenticationFailed`] for a missing or
/// mismatched shared secret and [`GatewayError::MalformedWebhook`] when
/// the body lacks `id` or `event`. Internal processing failures do NOT
/// error: they are persisted on the event record and acknowledged.
#[utoipa::path(
    post,
    path = "/api/v1/webhooks/billing",
    tag = "Webhooks",
    summary = "Ingest a billing provider webhook",
    description = "Deduplicates by provider event id, stores the raw payload, and applies the mapped subscription-status transition at most once per distinct id. Always acknowledges authenticated, well-formed deliveries with 200.",
    responses(
        (status = 200, description = "Delivery acknowledged", body = WebhookAck),
        (status = 400, description = "Body missing id or event", body = ErrorResponse),
        (status = 401, description = "Missing or invalid shared secret", body = ErrorResponse),
    )
)]
pub async fn billing_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<serde_json::Value>,
) -> Result<impl IntoResponse, GatewayError> {
    require_header_token(&headers, WEBHOOK_TOKEN_HEADER, &state.auth.webhook_access_token)?;

    let event_id = body
        .get("id")
        .and_then(|v| v.as_str())
        .ok_or_else(|| GatewayError::MalformedWebhook("missing id".to_string()))?
        .to_string();
    let event_type = body
        .get("event")
        .and_then(|v| v.as_str())
        .ok_or_else(|| GatewayError::MalformedWebhook("missing event".to_string()))?
        .to_string();

    let outcome = ingest(
        state.ledger.as_ref(),
        state.side_effect.as_ref(),
        &event_id,
        &event_type,
        &body,
    )
    .await;

    let outcome = match outcome {
        IngestOutcome::Applied(_) => "applied",
        IngestOutcome::Duplicate => "duplicate",
        IngestOutcome::Failed(_) => "error",
    };

    Ok(Json(WebhookAck {
        received: true,
        outcome: outcome.to_string(),
    }))
}

/// `GET /webhooks/stats` — Aggregate ledger counts for dashboards.
///
/// # Errors
///
/// Returns [`GatewayError::AuthenticationFailed`] without the producer
/// bearer token and [`GatewayError::PersistenceError`] on storage
/// failure.
#[utoipa::path(
    get,
    path = "/api/v1/webhooks/stats",
    tag = "Webhooks",
    summary = "Webhook ledger statistics",
    description = "Counts of webhook event records grouped by status and event type over a trailing window, derived entirely from persisted ledger rows.",
    responses(
        (status = 200, description = "Aggregated counts", body = serde_json::Value),
        (status = 401, description = "Missing or invalid producer token", body = ErrorResponse),
    )
)]
pub async fn webhook_stats(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<StatsQuery>,
) -> Result<impl IntoResponse, GatewayError> {
    require_bearer(&headers, &state.auth.producer_token)?;

    let query = query.clamped();
    let since = Utc::now() - chrono::Duration::hours(query.hours);
    let stats = state.ledger.stats_since(since).await?;

    Ok(Json(stats))
}

/// Webhook routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/webhooks/billing", post(billing_webhook))
        .route("/webhooks/stats", get(webhook_stats))
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use axum::extract::State;
    use axum::http::{HeaderValue, StatusCode};

    use super::*;
    use crate::app_state::AuthTokens;
    use crate::domain::{Broadcaster, SubscriptionStatus};
    use crate::ledger::{EventStatus, InMemoryLedger, SideEffectError, StatusSideEffect};
    use crate::sealed::{ClientKeyIssuer, PlainCodec};

    #[derive(Debug)]
    struct OkSideEffect;

    #[async_trait]
    impl StatusSideEffect for OkSideEffect {
        async fn apply(
            &self,
            event_type: &str,
            _payload: &serde_json::Value,
        ) -> Result<SubscriptionStatus, SideEffectError> {
            Ok(crate::domain::map_event_type(event_type))
        }
    }

    #[derive(Debug)]
    struct FailingSideEffect;

    #[async_trait]
    impl StatusSideEffect for FailingSideEffect {
        async fn apply(
            &self,
            _event_type: &str,
            _payload: &serde_json::Value,
        ) -> Result<SubscriptionStatus, SideEffectError> {
            Err(SideEffectError::SubscriptionNotFound(
                "user not found".to_string(),
            ))
        }
    }

    fn make_state(side_effect: Arc<dyn StatusSideEffect>) -> AppState {
        let codec: Arc<PlainCodec> = Arc::new(PlainCodec);
        AppState {
            broadcaster: Arc::new(Broadcaster::new()),
            ledger: Arc::new(InMemoryLedger::new()),
            side_effect,
            envelope: Arc::clone(&codec) as Arc<dyn crate::sealed::EnvelopeCodec>,
            client_keys: ClientKeyIssuer::new(codec, 3600),
            auth: Arc::new(AuthTokens {
                webhook_access_token: "hook-secret".to_string(),
                producer_token: "prod-secret".to_string(),
            }),
        }
    }

    fn provider_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(WEBHOOK_TOKEN_HEADER, HeaderValue::from_static("hook-secret"));
        headers
    }

    fn payment_body(id: &str) -> serde_json::Value {
        serde_json::json!({
            "id": id,
            "event": "PAYMENT_CONFIRMED",
            "payment": {"id": "pay_1", "subscription": "sub_1"}
        })
    }

    #[tokio::test]
    async fn unauthenticated_delivery_is_rejected_before_the_ledger() {
        let state = make_state(Arc::new(OkSideEffect));
        let result = billing_webhook(
            State(state.clone()),
            HeaderMap::new(),
            Json(payment_body("evt-1")),
        )
        .await;
        let Err(err) = result else {
            panic!("expected rejection");
        };
        assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED);
        assert!(state.ledger.fetch("evt-1").await.ok().flatten().is_none());
    }

    #[tokio::test]
    async fn malformed_body_is_rejected_with_400() {
        let state = make_state(Arc::new(OkSideEffect));
        let result = billing_webhook(
            State(state),
            provider_headers(),
            Json(serde_json::json!({"event": "PAYMENT_CONFIRMED"})),
        )
        .await;
        let Err(err) = result else {
            panic!("expected rejection");
        };
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn valid_delivery_is_acknowledged_and_processed() {
        let state = make_state(Arc::new(OkSideEffect));
        let result = billing_webhook(
            State(state.clone()),
            provider_headers(),
            Json(payment_body("evt-1")),
        )
        .await;
        let Ok(response) = result else {
            panic!("expected acknowledgment");
        };
        assert_eq!(response.into_response().status(), StatusCode::OK);

        let Ok(Some(record)) = state.ledger.fetch("evt-1").await else {
            panic!("record should exist");
        };
        assert_eq!(record.status, EventStatus::Processed);
    }

    #[tokio::test]
    async fn failing_side_effect_still_acknowledges_with_200() {
        let state = make_state(Arc::new(FailingSideEffect));
        let result = billing_webhook(
            State(state.clone()),
            provider_headers(),
            Json(payment_body("evt-1")),
        )
        .await;
        let Ok(response) = result else {
            panic!("expected acknowledgment despite side-effect failure");
        };
        assert_eq!(response.into_response().status(), StatusCode::OK);

        let Ok(Some(record)) = state.ledger.fetch("evt-1").await else {
            panic!("record should exist");
        };
        assert_eq!(record.status, EventStatus::Error);
        assert_eq!(record.error_message.as_deref(), Some("subscription not found: user not found"));
    }

    #[tokio::test]
    async fn redelivery_is_acknowledged_as_duplicate() {
        let state = make_state(Arc::new(OkSideEffect));
        let _ = billing_webhook(
            State(state.clone()),
            provider_headers(),
            Json(payment_body("evt-1")),
        )
        .await;
        let result = billing_webhook(
            State(state),
            provider_headers(),
            Json(payment_body("evt-1")),
        )
        .await;
        let Ok(response) = result else {
            panic!("expected acknowledgment");
        };
        assert_eq!(response.into_response().status(), StatusCode::OK);
    }
}
