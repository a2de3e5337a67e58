//! Broadcast forwarder - the `PushSink` that relays feed deliveries to subscribers.
//!
//! # Event Flow
//!
//! ```text
//! UpstreamFeed ──► notify_update_batch(batch)
//!                        │
//!                        ├─► emit("notifyEntityUpdates", batch) ──► BroadcastChannel
//!                        │
//!                        └─► last_applied_batch_uuid = batch.batch_uuid
//! ```
//!
//! Payloads are forwarded verbatim. Initial dumps are not deduplicated;
//! consumers treat them as idempotent.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use tokio::sync::RwLock;

use crate::domain::feed::{InitialDump, UpdateBatch};
use crate::ports::{BroadcastChannel, PushSink};

/// Event name for full snapshot deliveries.
pub const NOTIFY_INITIAL_DUMP: &str = "notifyInitialDump";

/// Event name for incremental update deliveries.
pub const NOTIFY_ENTITY_UPDATES: &str = "notifyEntityUpdates";

/// Every event name the bridge emits toward subscribers.
pub const BRIDGE_EVENT_NAMES: &[&str] = &[NOTIFY_INITIAL_DUMP, NOTIFY_ENTITY_UPDATES];

/// Relays upstream deliveries to a broadcast channel and remembers the last
/// applied update batch.
///
/// The uuid write lock is held across emit and bookkeeping, so a reader
/// never observes a batch that has been emitted but not yet recorded.
pub struct BroadcastForwarder {
    channel: Arc<dyn BroadcastChannel>,
    last_applied_batch_uuid: RwLock<String>,
}

impl BroadcastForwarder {
    pub fn new(channel: Arc<dyn BroadcastChannel>) -> Self {
        Self {
            channel,
            last_applied_batch_uuid: RwLock::new(String::new()),
        }
    }

    /// Create as an Arc (for handing to a feed).
    pub fn new_shared(channel: Arc<dyn BroadcastChannel>) -> Arc<Self> {
        Arc::new(Self::new(channel))
    }

    /// Encode and emit one event. Failures are logged, never returned:
    /// the caller is the feed's delivery task.
    async fn forward<T: Serialize>(&self, event_name: &str, payload: &T) -> Option<usize> {
        let value = match serde_json::to_value(payload) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(event = event_name, "Failed to encode payload: {}", e);
                return None;
            }
        };

        match self.channel.emit(event_name, value).await {
            Ok(delivered) => {
                tracing::trace!(event = event_name, delivered, "Forwarded feed event");
                Some(delivered)
            }
            Err(e) => {
                tracing::warn!(event = event_name, "Broadcast failed, dropping event: {}", e);
                None
            }
        }
    }
}

#[async_trait]
impl PushSink for BroadcastForwarder {
    async fn notify_initial_dump(&self, dump: InitialDump) {
        if !dump.is_consistent() {
            tracing::debug!(
                batch_id = %dump.batch_id,
                batches_left = dump.batches_left,
                "Complete initial dump still reports batches left"
            );
        }

        self.forward(NOTIFY_INITIAL_DUMP, &dump).await;
    }

    async fn notify_update_batch(&self, batch: UpdateBatch) {
        let mut last = self.last_applied_batch_uuid.write().await;

        self.forward(NOTIFY_ENTITY_UPDATES, &batch).await;

        tracing::debug!(
            batch_uuid = %batch.batch_uuid,
            batch_id = %batch.batch_id,
            changes = batch.len(),
            "Applied update batch"
        );
        *last = batch.batch_uuid;
    }

    async fn last_applied_batch_uuid(&self) -> String {
        self.last_applied_batch_uuid.read().await.clone()
    }
}
