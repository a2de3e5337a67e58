//! Bridge - activation state in front of the upstream feed.
//!
//! The bridge is either inactive or active for exactly one subscription.
//! Starting an active bridge is a caller bug and is refused; stopping an
//! inactive bridge is a no-op that never reaches the feed.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::Mutex;

use crate::domain::feed::{InitialDump, UpdateBatch};
use crate::ports::{BroadcastChannel, PushSink, UpstreamFeed};

use super::forwarder::BroadcastForwarder;

/// Errors raised by bridge lifecycle calls.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BridgeError {
    /// `start` while already active. Indicates a lifecycle controller bug.
    #[error("Bridge already active for subscription '{subscription}'")]
    AlreadyActive { subscription: String },
}

/// Point-in-time view of the bridge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BridgeState {
    pub active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subscription: Option<String>,
    pub last_applied_batch_uuid: String,
}

/// Owns activation of the upstream feed and the sink it delivers into.
pub struct Bridge {
    feed: Arc<dyn UpstreamFeed>,
    sink: Arc<dyn PushSink>,
    /// Subscription the feed was started for; `None` while inactive.
    active: Mutex<Option<String>>,
}

impl Bridge {
    /// Create a bridge delivering into an arbitrary sink.
    pub fn new(feed: Arc<dyn UpstreamFeed>, sink: Arc<dyn PushSink>) -> Self {
        Self {
            feed,
            sink,
            active: Mutex::new(None),
        }
    }

    /// Create a bridge that forwards deliveries to `channel`.
    pub fn with_channel(feed: Arc<dyn UpstreamFeed>, channel: Arc<dyn BroadcastChannel>) -> Self {
        Self::new(feed, BroadcastForwarder::new_shared(channel))
    }

    /// Register the sink with the feed and ask it to begin emitting.
    ///
    /// Returns as soon as the request is made. Transport failures are
    /// reported on the feed's signal channel, not here.
    pub async fn start(&self, subscription: &str) -> Result<(), BridgeError> {
        let mut active = self.active.lock().await;

        if let Some(current) = active.as_ref() {
            tracing::error!(
                subscription = %current,
                requested = subscription,
                "Refusing to start an already active bridge"
            );
            return Err(BridgeError::AlreadyActive {
                subscription: current.clone(),
            });
        }

        self.feed.start(subscription, self.sink.clone()).await;
        *active = Some(subscription.to_string());

        tracing::info!(subscription, "Bridge started");
        Ok(())
    }

    /// Ask the feed to halt. No-op when already inactive.
    ///
    /// The last applied batch uuid is kept.
    pub async fn stop(&self) {
        let mut active = self.active.lock().await;

        let Some(subscription) = active.take() else {
            tracing::debug!("Stop requested on inactive bridge, ignoring");
            return;
        };

        self.feed.stop().await;
        tracing::info!(subscription = %subscription, "Bridge stopped");
    }

    pub async fn is_active(&self) -> bool {
        self.active.lock().await.is_some()
    }

    /// Subscription the bridge is active for, if any.
    pub async fn subscription(&self) -> Option<String> {
        self.active.lock().await.clone()
    }

    /// Forward a snapshot as if delivered by the feed.
    pub async fn on_initial_dump(&self, dump: InitialDump) {
        self.sink.notify_initial_dump(dump).await;
    }

    /// Forward an update batch as if delivered by the feed.
    pub async fn on_update_batch(&self, batch: UpdateBatch) {
        self.sink.notify_update_batch(batch).await;
    }

    pub async fn last_applied_batch_uuid(&self) -> String {
        self.sink.last_applied_batch_uuid().await
    }

    pub async fn state(&self) -> BridgeState {
        let subscription = self.subscription().await;
        BridgeState {
            active: subscription.is_some(),
            subscription,
            last_applied_batch_uuid: self.last_applied_batch_uuid().await,
        }
    }
}
