//! Subscriber sink capability.
//!
//! The broadcaster is transport-agnostic: it writes pre-formatted frames
//! through the [`FrameSink`] capability. The SSE endpoint backs a sink with
//! an unbounded mpsc sender whose receiver feeds the response body; tests
//! use in-memory doubles.

use tokio::sync::mpsc;

/// Error returned when a sink's underlying transport is gone.
///
/// The broadcaster reacts by unsubscribing the failing sink; the error is
/// never surfaced to the publisher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("sink closed")]
pub struct SinkClosed;

/// Write capability bound to one subscriber's live connection.
///
/// `write` must be synchronous and non-blocking: it hands the frame to an
/// already-open transport (or buffer) and reports only whether the
/// transport is still alive.
pub trait FrameSink: Send + Sync {
    /// Writes one pre-formatted frame to the subscriber.
    ///
    /// # Errors
    ///
    /// Returns [`SinkClosed`] if the underlying connection has been
    /// dropped.
    fn write(&self, frame: &str) -> Result<(), SinkClosed>;
}

/// [`FrameSink`] backed by an unbounded [`mpsc`] sender.
///
/// The paired receiver drives the SSE response body; once the client
/// disconnects the receiver is dropped and `write` starts failing, which
/// triggers auto-unsubscribe on the next delivery attempt.
#[derive(Debug, Clone)]
pub struct MpscSink {
    tx: mpsc::UnboundedSender<String>,
}

impl MpscSink {
    /// Creates a sink/receiver pair.
    #[must_use]
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<String>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl FrameSink for MpscSink {
    fn write(&self, frame: &str) -> Result<(), SinkClosed> {
        self.tx.send(frame.to_string()).map_err(|_| SinkClosed)
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn mpsc_sink_delivers_to_receiver() {
        let (sink, mut rx) = MpscSink::channel();
        assert!(sink.write("data: X\n\n").is_ok());
        assert_eq!(rx.try_recv().ok().as_deref(), Some("data: X\n\n"));
    }

    #[test]
    fn mpsc_sink_fails_after_receiver_dropped() {
        let (sink, rx) = MpscSink::channel();
        drop(rx);
        assert_eq!(sink.write("data: X\n\n"), Err(SinkClosed));
    }
}
