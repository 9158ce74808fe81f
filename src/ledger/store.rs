//! Ledger storage seam.
//!
//! [`WebhookLedger`] is the persistence capability behind webhook
//! ingestion. The production implementation is
//! [`PostgresLedger`](super::postgres::PostgresLedger); [`InMemoryLedger`]
//! backs tests and keyless local runs. Uniqueness of `event_id` is
//! enforced by the store itself (a unique index in Postgres, a single
//! locked check-and-insert here) because an application-level
//! read-then-write is not atomic across concurrent deliveries.

use std::collections::HashMap;
use std::fmt;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::models::{EventStatus, EventTypeCount, StatusCount, WebhookEventRecord, WebhookStats};
use crate::error::GatewayError;

/// Errors produced by ledger storage operations.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    /// A record with this `event_id` already exists.
    #[error("duplicate event: {0}")]
    Duplicate(String),

    /// Underlying database failure.
    #[error("ledger database error: {0}")]
    Database(String),
}

impl From<LedgerError> for GatewayError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::Duplicate(id) => Self::DuplicateEvent(id),
            LedgerError::Database(msg) => Self::PersistenceError(msg),
        }
    }
}

/// Durable, deduplicated storage for webhook event records.
#[async_trait]
pub trait WebhookLedger: Send + Sync + fmt::Debug {
    /// Returns `true` if a record for `event_id` exists with a terminal
    /// status.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Database`] on storage failure.
    async fn is_event_processed(&self, event_id: &str) -> Result<bool, LedgerError>;

    /// Creates the `received` record for a first-seen event.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Duplicate`] if `event_id` already exists —
    /// the mechanism callers use to detect concurrent re-delivery rather
    /// than relying solely on a prior read.
    async fn record_event(
        &self,
        event_id: &str,
        event_type: &str,
        raw_payload: &serde_json::Value,
    ) -> Result<WebhookEventRecord, LedgerError>;

    /// Transitions a record to `processed`, stamping `processed_at`.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Database`] on storage failure.
    async fn mark_processed(&self, event_id: &str) -> Result<(), LedgerError>;

    /// Transitions a record to `error`, storing the message.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Database`] on storage failure.
    async fn mark_error(&self, event_id: &str, message: &str) -> Result<(), LedgerError>;

    /// Fetches a record by event id, if present.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Database`] on storage failure.
    async fn fetch(&self, event_id: &str) -> Result<Option<WebhookEventRecord>, LedgerError>;

    /// Aggregates counts by status and event type for records received at
    /// or after `since`.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::Database`] on storage failure.
    async fn stats_since(&self, since: DateTime<Utc>) -> Result<WebhookStats, LedgerError>;
}

/// In-memory ledger for tests and local development.
///
/// The whole map sits behind one mutex, so the duplicate check and insert
/// in [`record_event`](WebhookLedger::record_event) are atomic, matching
/// the unique-index guarantee of the Postgres implementation.
#[derive(Debug, Default)]
pub struct InMemoryLedger {
    records: Mutex<HashMap<String, WebhookEventRecord>>,
}

impl InMemoryLedger {
    /// Creates an empty in-memory ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, WebhookEventRecord>>, LedgerError> {
        self.records
            .lock()
            .map_err(|_| LedgerError::Database("ledger mutex poisoned".to_string()))
    }
}

#[async_trait]
impl WebhookLedger for InMemoryLedger {
    async fn is_event_processed(&self, event_id: &str) -> Result<bool, LedgerError> {
        let records = self.lock()?;
        Ok(records
            .get(event_id)
            .is_some_and(|r| r.status.is_terminal()))
    }

    async fn record_event(
        &self,
        event_id: &str,
        event_type: &str,
        raw_payload: &serde_json::Value,
    ) -> Result<WebhookEventRecord, LedgerError> {
        let mut records = self.lock()?;
        if records.contains_key(event_id) {
            return Err(LedgerError::Duplicate(event_id.to_string()));
        }
        let record = WebhookEventRecord {
            id: i64::try_from(records.len()).unwrap_or(i64::MAX).saturating_add(1),
            event_id: event_id.to_string(),
            event_type: event_type.to_string(),
            raw_payload: raw_payload.clone(),
            status: EventStatus::Received,
            received_at: Utc::now(),
            processed_at: None,
            error_message: None,
        };
        records.insert(event_id.to_string(), record.clone());
        Ok(record)
    }

    async fn mark_processed(&self, event_id: &str) -> Result<(), LedgerError> {
        let mut records = self.lock()?;
        if let Some(record) = records.get_mut(event_id) {
            record.status = EventStatus::Processed;
            record.processed_at = Some(Utc::now());
        }
        Ok(())
    }

    async fn mark_error(&self, event_id: &str, message: &str) -> Result<(), LedgerError> {
        let mut records = self.lock()?;
        if let Some(record) = records.get_mut(event_id) {
            record.status = EventStatus::Error;
            record.error_message = Some(message.to_string());
        }
        Ok(())
    }

    async fn fetch(&self, event_id: &str) -> Result<Option<WebhookEventRecord>, LedgerError> {
        let records = self.lock()?;
        Ok(records.get(event_id).cloned())
    }

    async fn stats_since(&self, since: DateTime<Utc>) -> Result<WebhookStats, LedgerError> {
        let records = self.lock()?;
        let mut by_status: HashMap<&'static str, i64> = HashMap::new();
        let mut by_event_type: HashMap<String, i64> = HashMap::new();
        for record in records.values().filter(|r| r.received_at >= since) {
            *by_status.entry(record.status.as_str()).or_default() += 1;
            *by_event_type.entry(record.event_type.clone()).or_default() += 1;
        }
        Ok(WebhookStats {
            since,
            by_status: by_status
                .into_iter()
                .map(|(status, count)| StatusCount {
                    status: status.to_string(),
                    count,
                })
                .collect(),
            by_event_type: by_event_type
                .into_iter()
                .map(|(event_type, count)| EventTypeCount { event_type, count })
                .collect(),
        })
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn record_then_fetch() {
        let ledger = InMemoryLedger::new();
        let payload = serde_json::json!({"event": "PAYMENT_CONFIRMED"});
        let result = ledger
            .record_event("evt-123", "PAYMENT_CONFIRMED", &payload)
            .await;
        assert!(result.is_ok());

        let Ok(Some(record)) = ledger.fetch("evt-123").await else {
            panic!("record should exist");
        };
        assert_eq!(record.status, EventStatus::Received);
        assert_eq!(record.raw_payload, payload);
    }

    #[tokio::test]
    async fn second_record_surfaces_duplicate() {
        let ledger = InMemoryLedger::new();
        let payload = serde_json::json!({});
        let _ = ledger.record_event("evt-123", "PAYMENT_CONFIRMED", &payload).await;

        let second = ledger.record_event("evt-123", "PAYMENT_CONFIRMED", &payload).await;
        assert!(matches!(second, Err(LedgerError::Duplicate(_))));
    }

    #[tokio::test]
    async fn processed_transition_is_detected_as_terminal() {
        let ledger = InMemoryLedger::new();
        let payload = serde_json::json!({});
        let _ = ledger.record_event("evt-1", "PAYMENT_CONFIRMED", &payload).await;
        assert_eq!(ledger.is_event_processed("evt-1").await.ok(), Some(false));

        let _ = ledger.mark_processed("evt-1").await;
        assert_eq!(ledger.is_event_processed("evt-1").await.ok(), Some(true));

        let Ok(Some(record)) = ledger.fetch("evt-1").await else {
            panic!("record should exist");
        };
        assert!(record.processed_at.is_some());
    }

    #[tokio::test]
    async fn error_transition_stores_message() {
        let ledger = InMemoryLedger::new();
        let payload = serde_json::json!({});
        let _ = ledger.record_event("evt-1", "PAYMENT_CONFIRMED", &payload).await;
        let _ = ledger.mark_error("evt-1", "user not found").await;

        let Ok(Some(record)) = ledger.fetch("evt-1").await else {
            panic!("record should exist");
        };
        assert_eq!(record.status, EventStatus::Error);
        assert_eq!(record.error_message.as_deref(), Some("user not found"));
        assert_eq!(ledger.is_event_processed("evt-1").await.ok(), Some(true));
    }

    #[tokio::test]
    async fn stats_group_by_status_and_type() {
        let ledger = InMemoryLedger::new();
        let payload = serde_json::json!({});
        let _ = ledger.record_event("e1", "PAYMENT_CONFIRMED", &payload).await;
        let _ = ledger.record_event("e2", "PAYMENT_CONFIRMED", &payload).await;
        let _ = ledger.record_event("e3", "PAYMENT_OVERDUE", &payload).await;
        let _ = ledger.mark_processed("e1").await;

        let Ok(stats) = ledger.stats_since(Utc::now() - chrono::Duration::hours(1)).await else {
            panic!("stats failed");
        };
        let total: i64 = stats.by_status.iter().map(|s| s.count).sum();
        assert_eq!(total, 3);
        let confirmed = stats
            .by_event_type
            .iter()
            .find(|c| c.event_type == "PAYMENT_CONFIRMED")
            .map_or(0, |c| c.count);
        assert_eq!(confirmed, 2);
    }
}
