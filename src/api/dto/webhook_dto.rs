//! DTOs for the webhook intake and stats endpoints.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Acknowledgment returned for every authenticated, well-formed webhook
/// delivery, regardless of internal outcome.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct WebhookAck {
    /// Always `true` once the request passed authentication and
    /// validation.
    pub received: bool,
    /// Internal outcome for operator visibility: `"applied"`,
    /// `"duplicate"`, or `"error"`.
    pub outcome: String,
}

/// Query parameters for the stats endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct StatsQuery {
    /// Window size in hours. Defaults to 24.
    #[serde(default = "default_hours")]
    pub hours: i64,
}

fn default_hours() -> i64 {
    24
}

impl StatsQuery {
    /// Clamps the window to at least one hour.
    #[must_use]
    pub fn clamped(&self) -> Self {
        Self {
            hours: self.hours.max(1),
        }
    }
}
