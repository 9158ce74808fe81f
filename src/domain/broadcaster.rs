//! Channel-keyed broadcast fan-out.
//!
//! [`Broadcaster`] holds per-channel sets of live subscriber sinks and
//! writes a formatted [`EventFrame`] to every sink of a channel on
//! `publish`. Delivery is best-effort to currently-open connections: there
//! is no persistence, no retry, and no delivery guarantee beyond "written
//! to every sink that was registered and alive at call time."

use std::collections::HashMap;
use std::fmt;

use tokio::sync::RwLock;

use super::channel::{ChannelId, SubscriberId};
use super::frame::{EventFrame, KEEP_ALIVE_FRAME};
use super::sink::FrameSink;

/// Handle to one registered subscriber sink.
///
/// Returned by [`Broadcaster::subscribe`] and consumed by
/// [`Broadcaster::unsubscribe`]. Once removed, a handle is never reused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriberHandle {
    /// Channel the sink is registered under.
    pub channel: ChannelId,
    /// Registry key of the sink.
    pub id: SubscriberId,
}

/// Per-channel registry entry: the live sinks plus the sequence counter.
struct ChannelEntry {
    /// Next sequence id to assign; the first published frame gets 1.
    next_sequence: u64,
    sinks: HashMap<SubscriberId, Box<dyn FrameSink>>,
}

impl ChannelEntry {
    fn new() -> Self {
        Self {
            next_sequence: 1,
            sinks: HashMap::new(),
        }
    }
}

/// Best-effort broadcast fan-out over channel-keyed subscriber sinks.
///
/// Owned by one long-lived service instance and injected into the HTTP
/// layer; tests construct independent instances freely.
///
/// # Concurrency
///
/// The registry is a `tokio::sync::RwLock<HashMap<..>>`. `publish` holds
/// the write lock for its whole delivery pass, so within one channel
/// frames reach every subscriber in publish order and sequence ids never
/// interleave. Sink writes are synchronous and non-blocking, so the lock
/// is never held across a suspension point.
///
/// # Cleanup
///
/// A sink whose write fails is unsubscribed on the spot and the error is
/// logged, never propagated: one broken consumer must not prevent delivery
/// to others. Removing the last sink of a channel drops the channel entry,
/// and publishing to an unknown channel never creates one.
pub struct Broadcaster {
    channels: RwLock<HashMap<ChannelId, ChannelEntry>>,
}

impl fmt::Debug for Broadcaster {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Broadcaster").finish_non_exhaustive()
    }
}

impl Broadcaster {
    /// Creates an empty broadcaster.
    #[must_use]
    pub fn new() -> Self {
        Self {
            channels: RwLock::new(HashMap::new()),
        }
    }

    /// Registers `sink` under `channel`, lazily creating the channel entry.
    ///
    /// No subscriber limit is enforced here; connection-level resource
    /// limits are the caller's responsibility.
    pub async fn subscribe(
        &self,
        channel: ChannelId,
        sink: Box<dyn FrameSink>,
    ) -> SubscriberHandle {
        let id = SubscriberId::new();
        let mut map = self.channels.write().await;
        map.entry(channel.clone())
            .or_insert_with(ChannelEntry::new)
            .sinks
            .insert(id, sink);
        tracing::debug!(%channel, subscriber = %id, "subscriber registered");
        SubscriberHandle { channel, id }
    }

    /// Removes the sink behind `handle`.
    ///
    /// Idempotent: removing a handle twice, or one that was never
    /// registered, is a no-op. This tolerates races between transport-close
    /// cleanup and explicit unsubscribe.
    pub async fn unsubscribe(&self, handle: &SubscriberHandle) {
        let mut map = self.channels.write().await;
        let now_empty = match map.get_mut(&handle.channel) {
            Some(entry) => {
                entry.sinks.remove(&handle.id);
                entry.sinks.is_empty()
            }
            None => false,
        };
        if now_empty {
            map.remove(&handle.channel);
            tracing::debug!(channel = %handle.channel, "channel entry removed");
        }
    }

    /// Publishes an event to every live subscriber of `channel`.
    ///
    /// Assigns the channel's next sequence id, formats the frame once, and
    /// writes it to each sink. Sinks whose write fails are unsubscribed
    /// immediately. Returns the number of sinks the frame was successfully
    /// written to; publishing to a channel with no subscribers is a cheap
    /// no-op returning 0.
    pub async fn publish(&self, channel: &ChannelId, event_type: &str, payload: &str) -> usize {
        let mut map = self.channels.write().await;
        let Some(entry) = map.get_mut(channel) else {
            return 0;
        };

        let frame = EventFrame {
            channel: channel.clone(),
            sequence_id: entry.next_sequence,
            event_type: event_type.to_string(),
            payload: payload.to_string(),
        };
        entry.next_sequence = entry.next_sequence.saturating_add(1);

        let wire = frame.to_sse();
        let mut delivered = 0usize;
        let mut dead = Vec::new();
        for (id, sink) in &entry.sinks {
            match sink.write(&wire) {
                Ok(()) => delivered += 1,
                Err(_) => dead.push(*id),
            }
        }

        for id in &dead {
            entry.sinks.remove(id);
            tracing::warn!(%channel, subscriber = %id, "sink write failed, unsubscribed");
        }
        let now_empty = entry.sinks.is_empty();
        if now_empty {
            map.remove(channel);
        }

        tracing::debug!(
            %channel,
            sequence = frame.sequence_id,
            event_type,
            delivered,
            "frame published"
        );
        delivered
    }

    /// Writes a keep-alive comment frame to every subscriber of every
    /// channel.
    ///
    /// Failures follow the same unsubscribe-on-error rule as
    /// [`publish`](Self::publish). Returns the number of sinks written to.
    pub async fn heartbeat(&self) -> usize {
        let mut map = self.channels.write().await;
        let mut written = 0usize;
        let mut emptied = Vec::new();
        for (channel, entry) in map.iter_mut() {
            let mut dead = Vec::new();
            for (id, sink) in &entry.sinks {
                match sink.write(KEEP_ALIVE_FRAME) {
                    Ok(()) => written += 1,
                    Err(_) => dead.push(*id),
                }
            }
            for id in &dead {
                entry.sinks.remove(id);
                tracing::warn!(%channel, subscriber = %id, "sink dead at heartbeat, unsubscribed");
            }
            if entry.sinks.is_empty() {
                emptied.push(channel.clone());
            }
        }
        for channel in &emptied {
            map.remove(channel);
        }
        written
    }

    /// Returns the number of channels with at least one subscriber.
    pub async fn channel_count(&self) -> usize {
        self.channels.read().await.len()
    }

    /// Returns the number of live subscribers on `channel` (0 if absent).
    pub async fn subscriber_count(&self, channel: &ChannelId) -> usize {
        self.channels
            .read()
            .await
            .get(channel)
            .map_or(0, |entry| entry.sinks.len())
    }
}

impl Default for Broadcaster {
    fn default() -> Self {
        Self::new()
    }
}
