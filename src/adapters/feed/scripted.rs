//! Scripted upstream feed - replays a fixed timeline on tokio's clock.
//!
//! Delays are measured from the moment `start` is called. Under a paused
//! runtime (`#[tokio::test(start_paused = true)]`) the timeline advances only
//! when the test advances time, so delivery order is fully deterministic.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};

use crate::domain::feed::{InitialDump, UpdateBatch};
use crate::ports::{FeedSignal, PushSink, UpstreamFeed};

/// One entry of the scripted timeline.
#[derive(Debug, Clone)]
pub enum ScriptedEvent {
    Dump(InitialDump),
    Batch(UpdateBatch),
    Signal(FeedSignal),
}

/// A start or stop request observed by the feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedCall {
    Start(String),
    Stop,
}

/// Upstream feed double driven by a timeline of delayed events.
pub struct ScriptedFeed {
    script: Vec<(Duration, ScriptedEvent)>,
    calls: Mutex<Vec<FeedCall>>,
    sink: Mutex<Option<Arc<dyn PushSink>>>,
    stop_tx: Mutex<Option<watch::Sender<bool>>>,
    task: Mutex<Option<JoinHandle<()>>>,
    signals: broadcast::Sender<FeedSignal>,
}

impl ScriptedFeed {
    pub fn new() -> Self {
        let (signals, _) = broadcast::channel(32);
        Self {
            script: Vec::new(),
            calls: Mutex::new(Vec::new()),
            sink: Mutex::new(None),
            stop_tx: Mutex::new(None),
            task: Mutex::new(None),
            signals,
        }
    }

    /// Deliver `dump` once `delay` has elapsed after start.
    pub fn dump_at(self, delay: Duration, dump: InitialDump) -> Self {
        self.event_at(delay, ScriptedEvent::Dump(dump))
    }

    /// Deliver `batch` once `delay` has elapsed after start.
    pub fn batch_at(self, delay: Duration, batch: UpdateBatch) -> Self {
        self.event_at(delay, ScriptedEvent::Batch(batch))
    }

    /// Publish `signal` once `delay` has elapsed after start.
    pub fn signal_at(self, delay: Duration, signal: FeedSignal) -> Self {
        self.event_at(delay, ScriptedEvent::Signal(signal))
    }

    pub fn event_at(mut self, delay: Duration, event: ScriptedEvent) -> Self {
        self.script.push((delay, event));
        // Stable sort keeps insertion order for equal delays.
        self.script.sort_by_key(|(delay, _)| *delay);
        self
    }

    /// Every start/stop request received so far, in order.
    pub fn calls(&self) -> Vec<FeedCall> {
        self.lock_calls().clone()
    }

    pub fn start_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| matches!(call, FeedCall::Start(_)))
            .count()
    }

    pub fn stop_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| matches!(call, FeedCall::Stop))
            .count()
    }

    /// Publish an out-of-band signal immediately.
    pub fn emit_signal(&self, signal: FeedSignal) {
        let _ = self.signals.send(signal);
    }

    /// Deliver a dump through the last registered sink, even after `stop`.
    ///
    /// Models a callback that was already in flight when the feed was
    /// stopped. Returns false if no sink was ever registered.
    pub async fn deliver_dump_now(&self, dump: InitialDump) -> bool {
        match self.last_sink() {
            Some(sink) => {
                sink.notify_initial_dump(dump).await;
                true
            }
            None => false,
        }
    }

    /// Deliver a batch through the last registered sink, even after `stop`.
    pub async fn deliver_batch_now(&self, batch: UpdateBatch) -> bool {
        match self.last_sink() {
            Some(sink) => {
                sink.notify_update_batch(batch).await;
                true
            }
            None => false,
        }
    }

    fn last_sink(&self) -> Option<Arc<dyn PushSink>> {
        self.sink.lock().ok().and_then(|sink| sink.clone())
    }

    fn lock_calls(&self) -> std::sync::MutexGuard<'_, Vec<FeedCall>> {
        self.calls.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Signal the timeline task to stop and wait for it to finish.
    ///
    /// A delivery already in progress completes before this returns.
    async fn halt(&self) {
        if let Ok(mut stop_tx) = self.stop_tx.lock() {
            if let Some(tx) = stop_tx.take() {
                let _ = tx.send(true);
            }
        }
        let task = match self.task.lock() {
            Ok(mut task) => task.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };
        if let Some(task) = task {
            if let Err(e) = task.await {
                tracing::warn!("Scripted feed task ended abnormally: {}", e);
            }
        }
    }
}

impl Default for ScriptedFeed {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UpstreamFeed for ScriptedFeed {
    async fn start(&self, subscription: &str, sink: Arc<dyn PushSink>) {
        self.lock_calls().push(FeedCall::Start(subscription.to_string()));
        // A restart replays the timeline from the new start instant.
        self.halt().await;

        if let Ok(mut slot) = self.sink.lock() {
            *slot = Some(sink.clone());
        }

        let _ = self.signals.send(FeedSignal::Subscribed {
            subscription: subscription.to_string(),
            detail: serde_json::json!({ "scripted": self.script.len() }),
        });

        let (stop_tx, mut stop_rx) = watch::channel(false);
        let script = self.script.clone();
        let signals = self.signals.clone();
        let started = Instant::now();

        let handle = tokio::spawn(async move {
            for (delay, event) in script {
                tokio::select! {
                    _ = sleep_until(started + delay) => {}
                    _ = stop_rx.changed() => return,
                }
                if *stop_rx.borrow() {
                    return;
                }
                match event {
                    ScriptedEvent::Dump(dump) => sink.notify_initial_dump(dump).await,
                    ScriptedEvent::Batch(batch) => sink.notify_update_batch(batch).await,
                    ScriptedEvent::Signal(signal) => {
                        let _ = signals.send(signal);
                    }
                }
            }
        });

        if let Ok(mut slot) = self.stop_tx.lock() {
            *slot = Some(stop_tx);
        }
        if let Ok(mut slot) = self.task.lock() {
            *slot = Some(handle);
        }
    }

    async fn stop(&self) {
        self.lock_calls().push(FeedCall::Stop);
        self.halt().await;
    }

    fn signals(&self) -> broadcast::Receiver<FeedSignal> {
        self.signals.subscribe()
    }
}
