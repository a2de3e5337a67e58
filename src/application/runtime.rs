//! Process-wide bridge runtime.
//!
//! One runtime exists per process: created once at startup, torn down at
//! shutdown. [`RuntimeSlot`] guards creation so a second `init` hands back
//! the runtime that already exists instead of wiring a second bridge.
//!
//! ```text
//! RuntimeSlot::init ──► BridgeRuntime
//!                         ├── Bridge ◄── LifecycleController ◄── presence
//!                         ├── controller task
//!                         └── feed signal logger task
//! ```

use std::sync::{Arc, Mutex};

use once_cell::sync::OnceCell;
use serde::Serialize;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;

use crate::domain::bridge::LifecycleState;
use crate::ports::{BroadcastChannel, FeedSignal, UpstreamFeed};

use super::bridge::Bridge;
use super::lifecycle::LifecycleController;

/// Runtime slot used by the server binary.
pub static PROCESS_RUNTIME: RuntimeSlot = RuntimeSlot::new();

/// Status snapshot reported by the health endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BridgeStatus {
    pub lifecycle: LifecycleState,
    pub active: bool,
    pub subscription: String,
    pub subscribers: usize,
    pub last_applied_batch_uuid: String,
}

/// The wired bridge, its controller and their background tasks.
pub struct BridgeRuntime {
    bridge: Arc<Bridge>,
    controller: Arc<LifecycleController>,
    channel: Arc<dyn BroadcastChannel>,
    shutdown_tx: watch::Sender<bool>,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl BridgeRuntime {
    /// Wire a bridge between `feed` and `channel` and spawn its tasks.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn launch(
        channel: Arc<dyn BroadcastChannel>,
        feed: Arc<dyn UpstreamFeed>,
        subscription: impl Into<String>,
    ) -> Self {
        let bridge = Arc::new(Bridge::with_channel(feed.clone(), channel.clone()));
        let controller = Arc::new(LifecycleController::new(
            bridge.clone(),
            channel.clone(),
            subscription,
        ));
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let controller_task = {
            let controller = controller.clone();
            let presence = channel.presence();
            let shutdown = shutdown_rx.clone();
            tokio::spawn(async move { controller.run(presence, shutdown).await })
        };
        let signal_task = tokio::spawn(log_feed_signals(feed.signals(), shutdown_rx));

        tracing::info!(subscription = controller.subscription(), "Bridge runtime launched");

        Self {
            bridge,
            controller,
            channel,
            shutdown_tx,
            tasks: Mutex::new(vec![controller_task, signal_task]),
        }
    }

    pub fn bridge(&self) -> &Arc<Bridge> {
        &self.bridge
    }

    pub fn controller(&self) -> &Arc<LifecycleController> {
        &self.controller
    }

    pub async fn status(&self) -> BridgeStatus {
        let state = self.bridge.state().await;
        BridgeStatus {
            lifecycle: self.controller.state().await,
            active: state.active,
            subscription: self.controller.subscription().to_string(),
            subscribers: self.channel.subscriber_count().await,
            last_applied_batch_uuid: state.last_applied_batch_uuid,
        }
    }

    /// Stop background tasks and the bridge. Safe to call more than once.
    pub async fn shutdown(&self) {
        let _ = self.shutdown_tx.send(true);

        let tasks: Vec<JoinHandle<()>> = match self.tasks.lock() {
            Ok(mut tasks) => tasks.drain(..).collect(),
            Err(poisoned) => poisoned.into_inner().drain(..).collect(),
        };
        for task in tasks {
            if let Err(e) = task.await {
                tracing::warn!("Bridge runtime task ended abnormally: {}", e);
            }
        }

        self.bridge.stop().await;
        tracing::info!("Bridge runtime shut down");
    }
}

/// Guarded holder for the process's single [`BridgeRuntime`].
pub struct RuntimeSlot {
    cell: OnceCell<BridgeRuntime>,
}

impl RuntimeSlot {
    pub const fn new() -> Self {
        Self {
            cell: OnceCell::new(),
        }
    }

    /// Launch the runtime on first call; later calls return the existing
    /// runtime and leave their arguments unused.
    pub fn init(
        &self,
        channel: Arc<dyn BroadcastChannel>,
        feed: Arc<dyn UpstreamFeed>,
        subscription: impl Into<String>,
    ) -> &BridgeRuntime {
        if let Some(existing) = self.cell.get() {
            tracing::debug!("Bridge runtime already initialized, reusing it");
            return existing;
        }
        self.cell
            .get_or_init(|| BridgeRuntime::launch(channel, feed, subscription))
    }

    pub fn get(&self) -> Option<&BridgeRuntime> {
        self.cell.get()
    }

    pub fn is_initialized(&self) -> bool {
        self.cell.get().is_some()
    }
}

impl Default for RuntimeSlot {
    fn default() -> Self {
        Self::new()
    }
}

/// Surface out-of-band feed conditions on the log. Never touches the bridge.
pub async fn log_feed_signals(
    mut signals: broadcast::Receiver<FeedSignal>,
    mut shutdown: watch::Receiver<bool>,
) {
    loop {
        tokio::select! {
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    break;
                }
            }
            signal = signals.recv() => match signal {
                Ok(FeedSignal::Subscribed { subscription, detail }) => {
                    tracing::info!(subscription = %subscription, detail = %detail, "Upstream subscription acknowledged");
                }
                Ok(FeedSignal::RuntimeError { message }) => {
                    tracing::error!(error = %message, "Upstream feed runtime error");
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Feed signals dropped");
                }
                Err(RecvError::Closed) => break,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::test_support::{RecordingChannel, RecordingFeed};

    #[tokio::test]
    async fn second_init_reuses_first_runtime() {
        let slot = RuntimeSlot::new();
        let channel = Arc::new(RecordingChannel::with_subscribers(0));
        let first_feed = Arc::new(RecordingFeed::new());
        let second_feed = Arc::new(RecordingFeed::new());

        let first = slot.init(channel.clone(), first_feed, "sub-x") as *const BridgeRuntime;
        let second = slot.init(channel.clone(), second_feed.clone(), "sub-y") as *const BridgeRuntime;

        assert_eq!(first, second);
        assert_eq!(slot.get().unwrap().controller().subscription(), "sub-x");

        slot.get().unwrap().shutdown().await;
    }

    #[tokio::test]
    async fn empty_slot_reports_uninitialized() {
        let slot = RuntimeSlot::default();
        assert!(!slot.is_initialized());
        assert!(slot.get().is_none());
    }

    #[tokio::test]
    async fn status_reflects_channel_and_bridge() {
        let channel = Arc::new(RecordingChannel::with_subscribers(0));
        let feed = Arc::new(RecordingFeed::new());
        let runtime = BridgeRuntime::launch(channel.clone(), feed.clone(), "sub-x");

        channel.connect();
        while !runtime.bridge().is_active().await {
            tokio::task::yield_now().await;
        }

        let status = runtime.status().await;
        assert_eq!(status.lifecycle, LifecycleState::Active);
        assert!(status.active);
        assert_eq!(status.subscribers, 1);
        assert_eq!(status.subscription, "sub-x");

        runtime.shutdown().await;
        assert!(!runtime.bridge().is_active().await);
        assert_eq!(feed.stop_count(), 1);
    }

    #[tokio::test]
    async fn shutdown_twice_is_harmless() {
        let channel = Arc::new(RecordingChannel::with_subscribers(0));
        let feed = Arc::new(RecordingFeed::new());
        let runtime = BridgeRuntime::launch(channel, feed.clone(), "sub-x");

        runtime.shutdown().await;
        runtime.shutdown().await;

        assert_eq!(feed.stop_count(), 0);
    }

    #[tokio::test]
    async fn feed_errors_do_not_change_bridge_state() {
        let channel = Arc::new(RecordingChannel::with_subscribers(0));
        let feed = Arc::new(RecordingFeed::new());
        let runtime = BridgeRuntime::launch(channel, feed.clone(), "sub-x");

        feed.signal(FeedSignal::runtime_error("connection refused"));
        tokio::task::yield_now().await;

        assert!(!runtime.bridge().is_active().await);
        assert_eq!(feed.stop_count(), 0);
        runtime.shutdown().await;
    }
}
