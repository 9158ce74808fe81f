//! Event frames and SSE wire formatting.
//!
//! An [`EventFrame`] is one immutable, delivered unit of push data: an
//! event type, a per-channel sequence id, and an opaque payload string.
//! The wire format follows the Server-Sent-Events convention:
//!
//! ```text
//! event: <eventType>
//! id: <sequenceId>
//! data: <payload>
//!
//! ```

use serde::{Deserialize, Serialize};

use super::ChannelId;

/// Comment frame written on the heartbeat cadence to keep intermediaries
/// (proxies, load balancers) from closing idle connections.
pub const KEEP_ALIVE_FRAME: &str = ": keep-alive\n\n";

/// One formatted unit of push data delivered to every live subscriber of a
/// channel.
///
/// `sequence_id` is assigned by the broadcaster at publish time and is
/// strictly increasing within a channel's lifetime. The payload is opaque;
/// callers that require confidentiality seal it before publishing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventFrame {
    /// Channel the frame was published on.
    pub channel: ChannelId,
    /// Per-channel monotonically increasing sequence number (starts at 1).
    pub sequence_id: u64,
    /// Event type discriminator (e.g. `"update"`).
    pub event_type: String,
    /// Opaque payload string.
    pub payload: String,
}

impl EventFrame {
    /// Renders the frame in SSE wire format.
    ///
    /// Multi-line payloads are split into one `data:` line per payload
    /// line, as the SSE format requires.
    #[must_use]
    pub fn to_sse(&self) -> String {
        let mut out = String::with_capacity(self.payload.len() + 64);
        out.push_str("event: ");
        out.push_str(&self.event_type);
        out.push('\n');
        out.push_str("id: ");
        out.push_str(&self.sequence_id.to_string());
        out.push('\n');
        for line in self.payload.split('\n') {
            out.push_str("data: ");
            out.push_str(line);
            out.push('\n');
        }
        out.push('\n');
        out
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn make_frame(payload: &str) -> EventFrame {
        let Ok(channel) = ChannelId::new("table-7") else {
            panic!("valid channel");
        };
        EventFrame {
            channel,
            sequence_id: 1,
            event_type: "update".to_string(),
            payload: payload.to_string(),
        }
    }

    #[test]
    fn sse_format_matches_wire_contract() {
        let frame = make_frame("X");
        assert_eq!(frame.to_sse(), "event: update\nid: 1\ndata: X\n\n");
    }

    #[test]
    fn multi_line_payload_splits_into_data_lines() {
        let frame = make_frame("a\nb");
        assert_eq!(frame.to_sse(), "event: update\nid: 1\ndata: a\ndata: b\n\n");
    }

    #[test]
    fn keep_alive_is_a_comment_frame() {
        assert!(KEEP_ALIVE_FRAME.starts_with(':'));
        assert!(KEEP_ALIVE_FRAME.ends_with("\n\n"));
    }
}
