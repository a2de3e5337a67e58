//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the bridge and the outside world. Adapters implement these ports.
//!
//! - `UpstreamFeed` - Source of initial dumps and update batches
//! - `PushSink` - Callbacks the feed delivers into
//! - `BroadcastChannel` - Fan-out to downstream subscribers, with presence

mod broadcast_channel;
mod push_sink;
mod upstream_feed;

pub use broadcast_channel::{BroadcastChannel, BroadcastError, PresenceEvent};
pub use push_sink::PushSink;
pub use upstream_feed::{FeedSignal, UpstreamFeed};
