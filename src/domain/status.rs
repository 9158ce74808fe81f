//! Subscription status and the provider event-type mapping.
//!
//! [`map_event_type`] is the pure policy table at the heart of webhook
//! processing: given a provider event type string it returns the target
//! [`SubscriptionStatus`]. It performs no I/O and is total — unknown event
//! types map to [`SubscriptionStatus::Pending`] rather than failing.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Target status of a billing subscription record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    /// Payment confirmed or subscription activated.
    Active,
    /// Payment past due.
    Overdue,
    /// Payment reversed or subscription terminated.
    Cancelled,
    /// Awaiting payment confirmation (also the default for unknown event
    /// types).
    Pending,
}

impl SubscriptionStatus {
    /// Returns the status as its persisted string form.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Overdue => "overdue",
            Self::Cancelled => "cancelled",
            Self::Pending => "pending",
        }
    }
}

impl fmt::Display for SubscriptionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Maps a provider event type to the subscription status it should apply.
///
/// Total over all strings: anything outside the known set returns
/// [`SubscriptionStatus::Pending`]. Whether unknown provider event types
/// should instead be rejected is an open business question; this preserves
/// the default-to-pending policy.
#[must_use]
pub fn map_event_type(event_type: &str) -> SubscriptionStatus {
    match event_type {
        "PAYMENT_RECEIVED"
        | "PAYMENT_CONFIRMED"
        | "SUBSCRIPTION_CREATED"
        | "SUBSCRIPTION_UPDATED"
        | "SUBSCRIPTION_ACTIVATED" => SubscriptionStatus::Active,
        "PAYMENT_OVERDUE" => SubscriptionStatus::Overdue,
        "PAYMENT_REFUNDED"
        | "PAYMENT_DELETED"
        | "PAYMENT_CHARGEBACK"
        | "SUBSCRIPTION_INACTIVATED"
        | "SUBSCRIPTION_DELETED" => SubscriptionStatus::Cancelled,
        _ => SubscriptionStatus::Pending,
    }
}

/// All event types with an explicit (non-default) mapping, paired with
/// their target status. Used by the catalog endpoint.
#[must_use]
pub fn known_event_types() -> Vec<(&'static str, SubscriptionStatus)> {
    vec![
        ("PAYMENT_RECEIVED", SubscriptionStatus::Active),
        ("PAYMENT_CONFIRMED", SubscriptionStatus::Active),
        ("SUBSCRIPTION_CREATED", SubscriptionStatus::Active),
        ("SUBSCRIPTION_UPDATED", SubscriptionStatus::Active),
        ("SUBSCRIPTION_ACTIVATED", SubscriptionStatus::Active),
        ("PAYMENT_OVERDUE", SubscriptionStatus::Overdue),
        ("PAYMENT_REFUNDED", SubscriptionStatus::Cancelled),
        ("PAYMENT_DELETED", SubscriptionStatus::Cancelled),
        ("PAYMENT_CHARGEBACK", SubscriptionStatus::Cancelled),
        ("SUBSCRIPTION_INACTIVATED", SubscriptionStatus::Cancelled),
        ("SUBSCRIPTION_DELETED", SubscriptionStatus::Cancelled),
    ]
}
