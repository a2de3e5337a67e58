//! Application layer - the bridge and what drives it.
//!
//! - `BroadcastForwarder` - `PushSink` relaying feed deliveries to subscribers
//! - `Bridge` - activation state in front of the upstream feed
//! - `LifecycleController` - presence events to start/stop
//! - `BridgeRuntime` / `RuntimeSlot` - process-wide wiring

mod bridge;
mod forwarder;
mod lifecycle;
mod runtime;

#[cfg(test)]
mod test_support;

pub use bridge::{Bridge, BridgeError, BridgeState};
pub use forwarder::{
    BroadcastForwarder, BRIDGE_EVENT_NAMES, NOTIFY_ENTITY_UPDATES, NOTIFY_INITIAL_DUMP,
};
pub use lifecycle::LifecycleController;
pub use runtime::{log_feed_signals, BridgeRuntime, BridgeStatus, RuntimeSlot, PROCESS_RUNTIME};
