//! PushSink port - The callbacks an upstream feed delivers into.
//!
//! A feed is handed a sink when it is started and calls it at its own pace.
//! Sinks must swallow their own failures: nothing a sink does may take the
//! feed's delivery task down.

use async_trait::async_trait;

use crate::domain::feed::{InitialDump, UpdateBatch};

/// Receiver of upstream feed deliveries.
///
/// # Example
///
/// ```ignore
/// let sink: Arc<dyn PushSink> = Arc::new(BroadcastForwarder::new(channel));
/// feed.start("sub-x", sink.clone()).await;
///
/// // ...later
/// let last = sink.last_applied_batch_uuid().await;
/// ```
#[async_trait]
pub trait PushSink: Send + Sync {
    /// Deliver a full snapshot batch.
    async fn notify_initial_dump(&self, dump: InitialDump);

    /// Deliver an incremental change set.
    ///
    /// Once this returns, `last_applied_batch_uuid` reports `batch.batch_uuid`.
    async fn notify_update_batch(&self, batch: UpdateBatch);

    /// Uuid of the most recently applied update batch, empty if none yet.
    async fn last_applied_batch_uuid(&self) -> String;
}
