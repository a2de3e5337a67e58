//! Synthetic upstream feed for running the service without a push connector.
//!
//! On start, two interval timers begin: one delivers a full initial dump of
//! "User" entities, the other an update batch of "Change" entities. Change
//! versions keep growing across batches so consumers see real supersession.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::{broadcast, watch};
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use uuid::Uuid;

use crate::config::SyntheticFeedConfig;
use crate::domain::feed::{Entity, InitialDump, UpdateBatch};
use crate::domain::foundation::Timestamp;
use crate::ports::{FeedSignal, PushSink, UpstreamFeed};

const DUMP_BATCH_ID: &str = "42";
const UPDATE_BATCH_ID: &str = "24";

/// Timer-driven feed producing generated dumps and update batches.
pub struct SyntheticFeed {
    config: SyntheticFeedConfig,
    stop_tx: Mutex<Option<watch::Sender<bool>>>,
    signals: broadcast::Sender<FeedSignal>,
}

impl SyntheticFeed {
    pub fn new(config: SyntheticFeedConfig) -> Self {
        let (signals, _) = broadcast::channel(32);
        Self {
            config,
            stop_tx: Mutex::new(None),
            signals,
        }
    }

    fn halt(&self) -> bool {
        let previous = match self.stop_tx.lock() {
            Ok(mut slot) => slot.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };
        match previous {
            Some(tx) => {
                let _ = tx.send(true);
                true
            }
            None => false,
        }
    }
}

/// Snapshot of `count` users, always the same records at the same versions.
pub fn generate_dump(count: usize) -> InitialDump {
    let entities = (0..count)
        .map(|i| {
            Entity::new(
                "User",
                format!("User{}", i + 1),
                (i + 1).to_string(),
                (i + 1000).to_string(),
                100 + i as u64,
            )
        })
        .collect();
    InitialDump::new(true, entities, DUMP_BATCH_ID, 0)
}

/// The `sequence`-th batch of `count` changes, tagged with a fresh uuid.
pub fn generate_batch(count: usize, sequence: u64) -> UpdateBatch {
    let base = 50 + sequence * count as u64;
    let changes = (0..count)
        .map(|i| {
            Entity::new(
                "Change",
                format!("Change{}", i + 1),
                (i + 1).to_string(),
                (i + 42).to_string(),
                base + i as u64,
            )
        })
        .collect();
    UpdateBatch::new(
        Timestamp::now(),
        changes,
        UPDATE_BATCH_ID,
        Uuid::new_v4().to_string(),
    )
}

#[async_trait]
impl UpstreamFeed for SyntheticFeed {
    async fn start(&self, subscription: &str, sink: Arc<dyn PushSink>) {
        if self.halt() {
            tracing::warn!(subscription = %subscription, "Synthetic feed restarted while running");
        }

        let (stop_tx, mut stop_rx) = watch::channel(false);
        match self.stop_tx.lock() {
            Ok(mut slot) => *slot = Some(stop_tx),
            Err(poisoned) => *poisoned.into_inner() = Some(stop_tx),
        }

        let config = self.config.clone();
        let now = Instant::now();
        let mut dumps = interval_at(now + config.dump_interval(), config.dump_interval());
        let mut updates = interval_at(now + config.update_interval(), config.update_interval());
        dumps.set_missed_tick_behavior(MissedTickBehavior::Delay);
        updates.set_missed_tick_behavior(MissedTickBehavior::Delay);

        tokio::spawn(async move {
            let mut sequence = 0u64;
            loop {
                tokio::select! {
                    _ = stop_rx.changed() => break,
                    _ = dumps.tick() => {
                        sink.notify_initial_dump(generate_dump(config.dump_entities)).await;
                    }
                    _ = updates.tick() => {
                        sink.notify_update_batch(generate_batch(config.update_changes, sequence)).await;
                        sequence += 1;
                    }
                }
            }
            tracing::debug!("Synthetic feed timers released");
        });

        tracing::info!(
            subscription = %subscription,
            dump_every_secs = self.config.dump_interval_secs,
            update_every_secs = self.config.update_interval_secs,
            "Synthetic feed started"
        );

        let _ = self.signals.send(FeedSignal::Subscribed {
            subscription: subscription.to_string(),
            detail: serde_json::json!({ "source": "synthetic" }),
        });
    }

    async fn stop(&self) {
        if self.halt() {
            tracing::info!("Synthetic feed stopped");
        }
    }

    fn signals(&self) -> broadcast::Receiver<FeedSignal> {
        self.signals.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::sync::Mutex as AsyncMutex;

    #[derive(Default)]
    struct CountingSink {
        dumps: AsyncMutex<Vec<InitialDump>>,
        batches: AsyncMutex<Vec<UpdateBatch>>,
    }

    #[async_trait]
    impl PushSink for CountingSink {
        async fn notify_initial_dump(&self, dump: InitialDump) {
            self.dumps.lock().await.push(dump);
        }

        async fn notify_update_batch(&self, batch: UpdateBatch) {
            self.batches.lock().await.push(batch);
        }

        async fn last_applied_batch_uuid(&self) -> String {
            String::new()
        }
    }

    fn config() -> SyntheticFeedConfig {
        SyntheticFeedConfig {
            dump_interval_secs: 10,
            update_interval_secs: 6,
            dump_entities: 15,
            update_changes: 20,
        }
    }

    #[test]
    fn generated_dump_matches_shape() {
        let dump = generate_dump(15);

        assert!(dump.complete);
        assert_eq!(dump.len(), 15);
        assert_eq!(dump.entities[0].name, "User1");
        assert_eq!(dump.entities[0].id, "1000");
        assert_eq!(dump.entities[14].version, 114);
    }

    #[test]
    fn later_batches_supersede_earlier_ones() {
        let first = generate_batch(20, 0);
        let second = generate_batch(20, 1);

        assert_ne!(first.batch_uuid, second.batch_uuid);
        assert!(second.changes[0].supersedes(&first.changes[0]));
        assert_eq!(first.changes[19].version, 69);
    }

    #[tokio::test(start_paused = true)]
    async fn emits_on_both_timers_until_stopped() {
        let feed = SyntheticFeed::new(config());
        let sink = Arc::new(CountingSink::default());

        feed.start("sub-x", sink.clone()).await;
        tokio::time::sleep(Duration::from_millis(12_500)).await;

        assert_eq!(sink.dumps.lock().await.len(), 1);
        assert_eq!(sink.batches.lock().await.len(), 2);

        feed.stop().await;
        tokio::time::sleep(Duration::from_secs(60)).await;

        assert_eq!(sink.dumps.lock().await.len(), 1);
        assert_eq!(sink.batches.lock().await.len(), 2);
    }

    #[tokio::test]
    async fn start_publishes_subscribed_signal() {
        let feed = SyntheticFeed::new(config());
        let mut signals = feed.signals();

        feed.start("sub-x", Arc::new(CountingSink::default())).await;

        assert!(matches!(
            signals.recv().await.unwrap(),
            FeedSignal::Subscribed { .. }
        ));
        feed.stop().await;
    }
}
