//! Webhook ingestion ledger: durable, idempotent event records.
//!
//! Inbound provider notifications are deduplicated by provider-assigned
//! event id, recorded with their raw payload, and driven through a
//! `received → processed | error` state machine by the ingestion
//! pipeline. Uniqueness lives in the store (a persistent unique index) so
//! idempotency survives process restarts.

pub mod ingest;
pub mod models;
pub mod postgres;
pub mod store;

pub use ingest::{IngestOutcome, SideEffectError, StatusSideEffect, ingest};
pub use models::{EventStatus, EventTypeCount, StatusCount, WebhookEventRecord, WebhookStats};
pub use postgres::PostgresLedger;
pub use store::{InMemoryLedger, LedgerError, WebhookLedger};
