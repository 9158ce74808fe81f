//! PostgreSQL implementation of the webhook ledger.
//!
//! Idempotency rests on the unique index over `webhook_events.event_id`:
//! a concurrent second delivery loses the insert race and surfaces
//! [`LedgerError::Duplicate`] via the 23505 unique-violation code. The
//! guarantee survives process restarts because it lives in the database,
//! not in memory.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use super::models::{EventStatus, EventTypeCount, StatusCount, WebhookEventRecord, WebhookStats};
use super::store::{LedgerError, WebhookLedger};

/// PostgreSQL error code for unique constraint violations.
const UNIQUE_VIOLATION: &str = "23505";

/// PostgreSQL-backed ledger using `sqlx::PgPool`.
#[derive(Debug, Clone)]
pub struct PostgresLedger {
    pool: PgPool,
}

impl PostgresLedger {
    /// Creates a new ledger with the given connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn map_db_error(err: sqlx::Error, event_id: &str) -> LedgerError {
    if let Some(db_err) = err.as_database_error()
        && db_err.code().as_deref() == Some(UNIQUE_VIOLATION)
    {
        return LedgerError::Duplicate(event_id.to_string());
    }
    LedgerError::Database(err.to_string())
}

type RecordRow = (
    i64,
    String,
    String,
    serde_json::Value,
    String,
    DateTime<Utc>,
    Option<DateTime<Utc>>,
    Option<String>,
);

fn row_to_record(row: RecordRow) -> WebhookEventRecord {
    let (id, event_id, event_type, raw_payload, status, received_at, processed_at, error_message) =
        row;
    WebhookEventRecord {
        id,
        event_id,
        event_type,
        raw_payload,
        status: EventStatus::parse(&status),
        received_at,
        processed_at,
        error_message,
    }
}

#[async_trait]
impl WebhookLedger for PostgresLedger {
    async fn is_event_processed(&self, event_id: &str) -> Result<bool, LedgerError> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM webhook_events WHERE event_id = $1 AND status IN ('processed', 'error'))",
        )
        .bind(event_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| LedgerError::Database(e.to_string()))?;

        Ok(exists)
    }

    async fn record_event(
        &self,
        event_id: &str,
        event_type: &str,
        raw_payload: &serde_json::Value,
    ) -> Result<WebhookEventRecord, LedgerError> {
        let row = sqlx::query_as::<_, RecordRow>(
            "INSERT INTO webhook_events (event_id, event_type, raw_payload, status) \
             VALUES ($1, $2, $3, 'received') \
             RETURNING id, event_id, event_type, raw_payload, status, received_at, processed_at, error_message",
        )
        .bind(event_id)
        .bind(event_type)
        .bind(raw_payload)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_db_error(e, event_id))?;

        Ok(row_to_record(row))
    }

    async fn mark_processed(&self, event_id: &str) -> Result<(), LedgerError> {
        sqlx::query(
            "UPDATE webhook_events SET status = 'processed', processed_at = NOW() \
             WHERE event_id = $1 AND status = 'received'",
        )
        .bind(event_id)
        .execute(&self.pool)
        .await
        .map_err(|e| LedgerError::Database(e.to_string()))?;

        Ok(())
    }

    async fn mark_error(&self, event_id: &str, message: &str) -> Result<(), LedgerError> {
        sqlx::query(
            "UPDATE webhook_events SET status = 'error', error_message = $2 \
             WHERE event_id = $1 AND status = 'received'",
        )
        .bind(event_id)
        .bind(message)
        .execute(&self.pool)
        .await
        .map_err(|e| LedgerError::Database(e.to_string()))?;

        Ok(())
    }

    async fn fetch(&self, event_id: &str) -> Result<Option<WebhookEventRecord>, LedgerError> {
        let row = sqlx::query_as::<_, RecordRow>(
            "SELECT id, event_id, event_type, raw_payload, status, received_at, processed_at, error_message \
             FROM webhook_events WHERE event_id = $1",
        )
        .bind(event_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| LedgerError::Database(e.to_string()))?;

        Ok(row.map(row_to_record))
    }

    async fn stats_since(&self, since: DateTime<Utc>) -> Result<WebhookStats, LedgerError> {
        let status_rows = sqlx::query_as::<_, (String, i64)>(
            "SELECT status, COUNT(*) FROM webhook_events \
             WHERE received_at >= $1 GROUP BY status",
        )
        .bind(since)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| LedgerError::Database(e.to_string()))?;

        let type_rows = sqlx::query_as::<_, (String, i64)>(
            "SELECT event_type, COUNT(*) FROM webhook_events \
             WHERE received_at >= $1 GROUP BY event_type ORDER BY COUNT(*) DESC",
        )
        .bind(since)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| LedgerError::Database(e.to_string()))?;

        Ok(WebhookStats {
            since,
            by_status: status_rows
                .into_iter()
                .map(|(status, count)| StatusCount { status, count })
                .collect(),
            by_event_type: type_rows
                .into_iter()
                .map(|(event_type, count)| EventTypeCount { event_type, count })
                .collect(),
        })
    }
}
