//! Webhook ingestion pipeline.
//!
//! One routine drives the `received → processed | error` state machine:
//! terminal-status short-circuit, durable record creation, side-effect
//! application, and status finalization. The pipeline never returns an
//! error to its caller — providers expect a success acknowledgment even
//! when internal processing fails, otherwise a poison event is retried
//! forever. Failures are persisted for operator visibility instead.

use std::fmt;

use async_trait::async_trait;

use super::store::{LedgerError, WebhookLedger};
use crate::domain::SubscriptionStatus;

/// Errors raised by the status-transition side effect.
#[derive(Debug, thiserror::Error)]
pub enum SideEffectError {
    /// No subscription matched the identifiers in the payload.
    #[error("subscription not found: {0}")]
    SubscriptionNotFound(String),

    /// The payload lacks the identifiers the applier needs.
    #[error("payload missing field: {0}")]
    MissingField(String),

    /// Downstream write failed.
    #[error("{0}")]
    Downstream(String),
}

/// Status-transition logic applied at most once per distinct event id.
#[async_trait]
pub trait StatusSideEffect: Send + Sync + fmt::Debug {
    /// Applies the provider event to the owning subscription record and
    /// returns the status that was written.
    ///
    /// # Errors
    ///
    /// Returns a [`SideEffectError`] if the transition cannot be applied;
    /// the pipeline records it on the event rather than propagating.
    async fn apply(
        &self,
        event_type: &str,
        payload: &serde_json::Value,
    ) -> Result<SubscriptionStatus, SideEffectError>;
}

/// Outcome of one ingestion pass, reported for logging and response
/// bodies. Every variant is acknowledged with a success status at the
/// HTTP boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IngestOutcome {
    /// First sight of the event; side effect applied, record `processed`.
    Applied(SubscriptionStatus),
    /// Event id already recorded; nothing reapplied.
    Duplicate,
    /// Side effect or storage failed; failure persisted where possible.
    Failed(String),
}

/// Runs the full ingestion pipeline for one authenticated, validated
/// webhook delivery.
///
/// Steps: terminal-status check → durable `received` insert (the unique
/// index resolves concurrent re-delivery races) → side effect →
/// `processed` or `error` finalization.
pub async fn ingest(
    ledger: &dyn WebhookLedger,
    side_effect: &dyn StatusSideEffect,
    event_id: &str,
    event_type: &str,
    payload: &serde_json::Value,
) -> IngestOutcome {
    match ledger.is_event_processed(event_id).await {
        Ok(true) => {
            tracing::info!(event_id, "event already finalized, skipping");
            return IngestOutcome::Duplicate;
        }
        Ok(false) => {}
        Err(e) => {
            tracing::error!(event_id, error = %e, "terminal-status check failed");
            return IngestOutcome::Failed(e.to_string());
        }
    }

    match ledger.record_event(event_id, event_type, payload).await {
        Ok(_) => {}
        Err(LedgerError::Duplicate(_)) => {
            // Lost the insert race to a concurrent delivery of the same id.
            tracing::info!(event_id, "duplicate delivery detected at insert");
            return IngestOutcome::Duplicate;
        }
        Err(e) => {
            tracing::error!(event_id, error = %e, "failed to record event");
            return IngestOutcome::Failed(e.to_string());
        }
    }

    match side_effect.apply(event_type, payload).await {
        Ok(status) => {
            if let Err(e) = ledger.mark_processed(event_id).await {
                tracing::error!(event_id, error = %e, "failed to finalize processed status");
            }
            tracing::info!(event_id, event_type, %status, "event processed");
            IngestOutcome::Applied(status)
        }
        Err(e) => {
            let message = e.to_string();
            if let Err(mark_err) = ledger.mark_error(event_id, &message).await {
                tracing::error!(event_id, error = %mark_err, "failed to record error status");
            }
            tracing::warn!(event_id, event_type, error = %message, "side effect failed");
            IngestOutcome::Failed(message)
        }
    }
}
