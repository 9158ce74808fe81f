//! Domain layer: channels, frames, the broadcaster, and status policy.
//!
//! This module contains the server-side domain model: channel identity,
//! SSE event frames, the sink capability, the channel-keyed broadcast
//! fan-out, and the pure provider-event → subscription-status mapping.

pub mod broadcaster;
pub mod channel;
pub mod frame;
pub mod sink;
pub mod status;

pub use broadcaster::{Broadcaster, SubscriberHandle};
pub use channel::{ChannelId, SubscriberId};
pub use frame::{EventFrame, KEEP_ALIVE_FRAME};
pub use sink::{FrameSink, MpscSink, SinkClosed};
pub use status::{SubscriptionStatus, known_event_types, map_event_type};
