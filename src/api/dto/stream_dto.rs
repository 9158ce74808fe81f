//! DTOs for the publish and client-key endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Request body for publishing an event to a channel.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct PublishRequest {
    /// Event type discriminator (e.g. `"update"`).
    pub event_type: String,
    /// Arbitrary JSON payload; sealed before framing.
    pub payload: serde_json::Value,
}

/// Response body after a publish call.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PublishResponse {
    /// Channel the frame was published on.
    pub channel: String,
    /// Number of sinks the frame was successfully written to.
    pub delivered: usize,
}

/// Response body for client-key issuance.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct IssueKeyResponse {
    /// Channel the key grants access to.
    pub channel: String,
    /// Sealed client key to pass as the stream `key` query parameter.
    pub key: String,
    /// Expiry of the key.
    pub expires_at: DateTime<Utc>,
}
