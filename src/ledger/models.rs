//! Ledger data models: event records, statuses, and stats rows.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Processing status of a webhook event record.
///
/// `received` is the initial state; `processed` and `error` are terminal.
/// A terminal record never regresses to `received` — re-delivery of an
/// already-finalized event short-circuits before mutating state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventStatus {
    /// Record created, raw payload stored, side effect not yet applied.
    Received,
    /// Side effect completed without error.
    Processed,
    /// Side effect raised; error message captured.
    Error,
}

impl EventStatus {
    /// Returns the status as its persisted string form.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Received => "received",
            Self::Processed => "processed",
            Self::Error => "error",
        }
    }

    /// Parses the persisted string form back into a status.
    ///
    /// Unknown strings fall back to `Received` rather than failing the
    /// read path; the write path only ever stores the three known values.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s {
            "processed" => Self::Processed,
            "error" => Self::Error,
            _ => Self::Received,
        }
    }

    /// Returns `true` for `processed` and `error`.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Processed | Self::Error)
    }
}

/// Durable, deduplicated record of one inbound provider notification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookEventRecord {
    /// Auto-increment row ID.
    pub id: i64,
    /// Provider-assigned event id; unique across the table.
    pub event_id: String,
    /// Provider event type (e.g. `"PAYMENT_CONFIRMED"`).
    pub event_type: String,
    /// Raw provider payload as JSONB.
    pub raw_payload: serde_json::Value,
    /// Current processing status.
    pub status: EventStatus,
    /// First-sight timestamp.
    pub received_at: DateTime<Utc>,
    /// Timestamp of the `processed` transition, if reached.
    pub processed_at: Option<DateTime<Utc>>,
    /// Error message captured on the `error` transition, if reached.
    pub error_message: Option<String>,
}

/// Count of records sharing one status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusCount {
    /// Persisted status string.
    pub status: String,
    /// Number of records.
    pub count: i64,
}

/// Count of records sharing one event type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventTypeCount {
    /// Provider event type.
    pub event_type: String,
    /// Number of records.
    pub count: i64,
}

/// Aggregated ledger counts over a time window.
///
/// Derived entirely from persisted records; the write path carries no
/// extra instrumentation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookStats {
    /// Window start (inclusive).
    pub since: DateTime<Utc>,
    /// Counts grouped by status.
    pub by_status: Vec<StatusCount>,
    /// Counts grouped by event type.
    pub by_event_type: Vec<EventTypeCount>,
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn status_string_round_trip() {
        for status in [EventStatus::Received, EventStatus::Processed, EventStatus::Error] {
            assert_eq!(EventStatus::parse(status.as_str()), status);
        }
    }

    #[test]
    fn only_processed_and_error_are_terminal() {
        assert!(!EventStatus::Received.is_terminal());
        assert!(EventStatus::Processed.is_terminal());
        assert!(EventStatus::Error.is_terminal());
    }
}
