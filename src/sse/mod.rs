//! SSE layer: the subscribe endpoint and the keep-alive task.
//!
//! The endpoint at `/api/v1/streams/{channel}` provides one-directional
//! push delivery of published frames to authorized clients.

pub mod handler;
pub mod heartbeat;

pub use handler::stream_handler;
pub use heartbeat::spawn_heartbeat;
