//! Hand-written doubles shared by the application layer's unit tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::broadcast;

use crate::domain::feed::{Entity, InitialDump, UpdateBatch};
use crate::domain::foundation::Timestamp;
use crate::ports::{
    BroadcastChannel, BroadcastError, FeedSignal, PresenceEvent, PushSink, UpstreamFeed,
};

pub fn sample_dump(batch_id: &str, entities: usize) -> InitialDump {
    let entities = (0..entities)
        .map(|i| Entity::new("User", format!("User{}", i + 1), (i + 1).to_string(), (i + 1000).to_string(), 100 + i as u64))
        .collect();
    InitialDump::new(true, entities, batch_id, 0)
}

pub fn sample_batch(batch_uuid: &str) -> UpdateBatch {
    UpdateBatch::new(
        Timestamp::now(),
        vec![Entity::new("Change", "Change1", "1", "42", 50)],
        "24",
        batch_uuid,
    )
}

/// Broadcast channel that records emits and lets tests drive the count.
pub struct RecordingChannel {
    emitted: Mutex<Vec<(String, serde_json::Value)>>,
    subscribers: AtomicUsize,
    presence: broadcast::Sender<PresenceEvent>,
    fail_emit: bool,
}

impl RecordingChannel {
    pub fn with_subscribers(count: usize) -> Self {
        Self::with_presence_capacity(count, 16)
    }

    /// Channel whose presence stream holds only `capacity` pending events.
    pub fn with_presence_capacity(count: usize, capacity: usize) -> Self {
        let (presence, _) = broadcast::channel(capacity);
        Self {
            emitted: Mutex::new(Vec::new()),
            subscribers: AtomicUsize::new(count),
            presence,
            fail_emit: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            fail_emit: true,
            ..Self::with_subscribers(1)
        }
    }

    pub fn set_subscribers(&self, count: usize) {
        self.subscribers.store(count, Ordering::SeqCst);
    }

    pub fn connect(&self) {
        self.subscribers.fetch_add(1, Ordering::SeqCst);
        let _ = self.presence.send(PresenceEvent::Connected);
    }

    pub fn disconnect(&self) {
        self.subscribers.fetch_sub(1, Ordering::SeqCst);
        let _ = self.presence.send(PresenceEvent::Disconnected);
    }

    pub fn emitted(&self) -> Vec<(String, serde_json::Value)> {
        self.emitted.lock().unwrap().clone()
    }

    pub fn emitted_names(&self) -> Vec<String> {
        self.emitted().into_iter().map(|(name, _)| name).collect()
    }
}

#[async_trait]
impl BroadcastChannel for RecordingChannel {
    async fn emit(
        &self,
        event_name: &str,
        payload: serde_json::Value,
    ) -> Result<usize, BroadcastError> {
        if self.fail_emit {
            return Err(BroadcastError::PayloadTooLarge { size: 10, limit: 1 });
        }
        self.emitted
            .lock()
            .unwrap()
            .push((event_name.to_string(), payload));
        Ok(self.subscribers.load(Ordering::SeqCst))
    }

    async fn subscriber_count(&self) -> usize {
        self.subscribers.load(Ordering::SeqCst)
    }

    fn presence(&self) -> broadcast::Receiver<PresenceEvent> {
        self.presence.subscribe()
    }
}

/// Upstream feed that records start/stop requests and keeps the sink.
pub struct RecordingFeed {
    starts: Mutex<Vec<String>>,
    stops: AtomicUsize,
    sink: Mutex<Option<Arc<dyn PushSink>>>,
    signals: broadcast::Sender<FeedSignal>,
}

impl RecordingFeed {
    pub fn new() -> Self {
        let (signals, _) = broadcast::channel(16);
        Self {
            starts: Mutex::new(Vec::new()),
            stops: AtomicUsize::new(0),
            sink: Mutex::new(None),
            signals,
        }
    }

    pub fn starts(&self) -> Vec<String> {
        self.starts.lock().unwrap().clone()
    }

    pub fn stop_count(&self) -> usize {
        self.stops.load(Ordering::SeqCst)
    }

    pub fn signal(&self, signal: FeedSignal) {
        let _ = self.signals.send(signal);
    }

    pub async fn deliver_batch(&self, batch: UpdateBatch) {
        let sink = self.sink.lock().unwrap().clone();
        if let Some(sink) = sink {
            sink.notify_update_batch(batch).await;
        }
    }
}

#[async_trait]
impl UpstreamFeed for RecordingFeed {
    async fn start(&self, subscription: &str, sink: Arc<dyn PushSink>) {
        self.starts.lock().unwrap().push(subscription.to_string());
        *self.sink.lock().unwrap() = Some(sink);
    }

    async fn stop(&self) {
        self.stops.fetch_add(1, Ordering::SeqCst);
    }

    fn signals(&self) -> broadcast::Receiver<FeedSignal> {
        self.signals.subscribe()
    }
}
