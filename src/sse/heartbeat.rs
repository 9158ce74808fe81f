//! Recurring keep-alive task.
//!
//! Writes a comment frame to every live subscriber on a fixed cadence so
//! proxies and load balancers do not close idle connections. Dead sinks
//! discovered during the pass are pruned by the broadcaster.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::domain::Broadcaster;

/// Spawns the heartbeat loop.
///
/// The returned handle may be aborted on shutdown; the loop itself never
/// exits on its own.
pub fn spawn_heartbeat(broadcaster: Arc<Broadcaster>, interval_secs: u64) -> JoinHandle<()> {
    let period = Duration::from_secs(interval_secs.max(1));
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // First tick fires immediately; skip it so a fresh subscriber is
        // not greeted with a keep-alive before any data.
        ticker.tick().await;
        loop {
            ticker.tick().await;
            let written = broadcaster.heartbeat().await;
            tracing::debug!(written, "heartbeat pass complete");
        }
    })
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::{ChannelId, KEEP_ALIVE_FRAME, MpscSink};

    #[tokio::test(start_paused = true)]
    async fn heartbeat_task_writes_keepalive_frames() {
        let broadcaster = Arc::new(Broadcaster::new());
        let Ok(channel) = ChannelId::new("table-7") else {
            panic!("valid channel");
        };
        let (sink, mut rx) = MpscSink::channel();
        broadcaster.subscribe(channel, Box::new(sink)).await;

        let task = spawn_heartbeat(Arc::clone(&broadcaster), 5);
        tokio::time::sleep(Duration::from_secs(11)).await;
        task.abort();

        let Some(frame) = rx.recv().await else {
            panic!("expected a keep-alive frame");
        };
        assert_eq!(frame, KEEP_ALIVE_FRAME);
    }
}
