//! UpstreamFeed port - Interface for the source of entity snapshots and updates.
//!
//! The feed transport itself (vendor TCP protocol, retries, framing) lives
//! behind this trait. The bridge only asks it to start and stop, and hands
//! it a [`PushSink`] to deliver into.
//!
//! Out-of-band conditions (subscription acknowledgements, transport errors)
//! are published as [`FeedSignal`]s. They are for the host process to log;
//! they never change bridge state.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use tokio::sync::broadcast;

use super::PushSink;

/// Out-of-band notification from the feed.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FeedSignal {
    /// The upstream accepted the subscription request.
    Subscribed {
        subscription: String,
        detail: serde_json::Value,
    },

    /// The transport hit an error at runtime (connection loss, bad payload).
    RuntimeError { message: String },
}

impl FeedSignal {
    pub fn runtime_error(message: impl Into<String>) -> Self {
        FeedSignal::RuntimeError {
            message: message.into(),
        }
    }
}

/// Port for the upstream push feed.
///
/// Both calls are requests, not handshakes: `start` must return promptly
/// even if the upstream takes a while to begin emitting, and failures to
/// reach the upstream are reported through [`UpstreamFeed::signals`].
///
/// After `stop`, a delivery already in flight may still reach the sink once.
#[async_trait]
pub trait UpstreamFeed: Send + Sync {
    /// Begin emitting for `subscription`, delivering into `sink`.
    async fn start(&self, subscription: &str, sink: Arc<dyn PushSink>);

    /// Halt emission and release timers and tasks held for delivery.
    async fn stop(&self);

    /// Subscribe to the side-channel of out-of-band conditions.
    fn signals(&self) -> broadcast::Receiver<FeedSignal>;
}
