//! Channel and subscriber identifiers.
//!
//! [`ChannelId`] is a validated topic name (e.g. a table id like
//! `"table-7"`). [`SubscriberId`] is a newtype wrapper around
//! [`uuid::Uuid`] (v4) identifying one live subscriber sink.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::GatewayError;

/// Logical topic identifier scoping a set of subscribers and a per-channel
/// sequence counter.
///
/// Channels are ephemeral: the broadcaster creates a registry entry on the
/// first `subscribe` and removes it when the last subscriber leaves.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChannelId(String);

impl ChannelId {
    /// Creates a `ChannelId` from a topic name.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidChannel`] if the name is empty or
    /// consists only of whitespace.
    pub fn new(name: impl Into<String>) -> Result<Self, GatewayError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(GatewayError::InvalidChannel(
                "must be non-empty".to_string(),
            ));
        }
        Ok(Self(name))
    }

    /// Returns the channel name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ChannelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque handle identifying one registered subscriber sink.
///
/// Generated at `subscribe` time and never reused once removed from the
/// registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubscriberId(uuid::Uuid);

impl SubscriberId {
    /// Creates a new random `SubscriberId` (UUID v4).
    #[must_use]
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }

    /// Returns the inner [`uuid::Uuid`].
    #[must_use]
    pub const fn as_uuid(&self) -> &uuid::Uuid {
        &self.0
    }
}

impl Default for SubscriberId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SubscriberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn channel_accepts_non_empty_name() {
        let channel = ChannelId::new("table-7");
        assert!(channel.is_ok());
    }

    #[test]
    fn channel_rejects_empty_name() {
        assert!(ChannelId::new("").is_err());
        assert!(ChannelId::new("   ").is_err());
    }

    #[test]
    fn channel_display_is_name() {
        let Ok(channel) = ChannelId::new("table-7") else {
            panic!("valid channel");
        };
        assert_eq!(format!("{channel}"), "table-7");
        assert_eq!(channel.as_str(), "table-7");
    }

    #[test]
    fn subscriber_ids_are_unique() {
        let a = SubscriberId::new();
        let b = SubscriberId::new();
        assert_ne!(a, b);
    }

    #[test]
    fn subscriber_id_hash_works_in_hashmap() {
        use std::collections::HashMap;
        let id = SubscriberId::new();
        let mut map = HashMap::new();
        map.insert(id, "test");
        assert_eq!(map.get(&id), Some(&"test"));
    }
}
