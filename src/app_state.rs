//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use crate::domain::Broadcaster;
use crate::ledger::{StatusSideEffect, WebhookLedger};
use crate::sealed::{ClientKeyIssuer, EnvelopeCodec};

/// Shared secrets checked at the HTTP boundary.
#[derive(Debug)]
pub struct AuthTokens {
    /// Shared secret expected in the webhook intake header.
    pub webhook_access_token: String,
    /// Bearer token required on producer endpoints (publish, key
    /// issuance, stats).
    pub producer_token: String,
}

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Broadcast fan-out for live event streams.
    pub broadcaster: Arc<Broadcaster>,
    /// Durable webhook event ledger.
    pub ledger: Arc<dyn WebhookLedger>,
    /// Status-transition side effect driven by the ingestion pipeline.
    pub side_effect: Arc<dyn StatusSideEffect>,
    /// Sealed-envelope codec applied to published payloads.
    pub envelope: Arc<dyn EnvelopeCodec>,
    /// Issuer/verifier for stream client keys.
    pub client_keys: ClientKeyIssuer,
    /// Boundary credentials.
    pub auth: Arc<AuthTokens>,
}
