//! Subscription status applier: the webhook side effect.
//!
//! Maps a provider event onto exactly one status write against the
//! subscriptions table. The service does not own the subscription
//! lifecycle beyond that single write; creation, renewal dates, and
//! retention are handled elsewhere.

use async_trait::async_trait;
use sqlx::PgPool;

use crate::domain::{SubscriptionStatus, map_event_type};
use crate::ledger::{SideEffectError, StatusSideEffect};

/// Applies provider events to subscription records.
#[derive(Debug, Clone)]
pub struct SubscriptionService {
    pool: PgPool,
}

impl SubscriptionService {
    /// Creates a new service over the given connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Extracts the provider-side subscription id from a webhook payload.
///
/// Providers nest the id differently per event family: subscription
/// events carry `subscription.id`, payment events carry
/// `payment.subscription`.
#[must_use]
pub fn extract_external_id(payload: &serde_json::Value) -> Option<&str> {
    payload
        .get("subscription")
        .and_then(|s| s.get("id"))
        .and_then(|id| id.as_str())
        .or_else(|| {
            payload
                .get("payment")
                .and_then(|p| p.get("subscription"))
                .and_then(|id| id.as_str())
        })
}

#[async_trait]
impl StatusSideEffect for SubscriptionService {
    async fn apply(
        &self,
        event_type: &str,
        payload: &serde_json::Value,
    ) -> Result<SubscriptionStatus, SideEffectError> {
        let external_id = extract_external_id(payload)
            .ok_or_else(|| SideEffectError::MissingField("subscription id".to_string()))?;

        let status = map_event_type(event_type);

        let result = sqlx::query(
            "UPDATE subscriptions SET status = $1, updated_at = NOW() WHERE external_id = $2",
        )
        .bind(status.as_str())
        .bind(external_id)
        .execute(&self.pool)
        .await
        .map_err(|e| SideEffectError::Downstream(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(SideEffectError::SubscriptionNotFound(
                external_id.to_string(),
            ));
        }

        tracing::info!(external_id, %status, event_type, "subscription status updated");
        Ok(status)
    }
}
