//! BroadcastChannel port - Fan-out to every connected downstream subscriber.
//!
//! The channel owns the subscriber count. Consumers that need to know
//! whether anyone is listening must ask [`BroadcastChannel::subscriber_count`]
//! rather than keep their own tally from presence events.

use async_trait::async_trait;
use tokio::sync::broadcast;

/// A subscriber arrived or left.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresenceEvent {
    Connected,
    Disconnected,
}

/// Errors that can occur when emitting to subscribers.
#[derive(Debug, thiserror::Error)]
pub enum BroadcastError {
    /// Payload could not be encoded for the wire
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Encoded frame exceeds the per-message limit
    #[error("Payload of {size} bytes exceeds limit of {limit} bytes")]
    PayloadTooLarge { size: usize, limit: usize },
}

/// Port for delivering named events to all current subscribers.
///
/// # Example
///
/// ```ignore
/// let delivered = channel.emit("notifyEntityUpdates", payload).await?;
/// let mut presence = channel.presence();
/// while let Ok(event) = presence.recv().await {
///     if channel.subscriber_count().await == 0 { /* ... */ }
/// }
/// ```
#[async_trait]
pub trait BroadcastChannel: Send + Sync {
    /// Deliver `payload` under `event_name` to every current subscriber.
    ///
    /// Returns how many subscribers the event was handed to. Zero
    /// subscribers is not an error.
    async fn emit(
        &self,
        event_name: &str,
        payload: serde_json::Value,
    ) -> Result<usize, BroadcastError>;

    /// Authoritative count of live subscriber connections.
    async fn subscriber_count(&self) -> usize;

    /// Subscribe to connect/disconnect notifications.
    fn presence(&self) -> broadcast::Receiver<PresenceEvent>;
}
