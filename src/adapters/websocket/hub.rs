//! Socket hub - the broadcast channel behind the subscriber WebSocket.
//!
//! Every connected client holds a receiver on one shared broadcast channel;
//! an emit reaches all of them. The hub also keeps the authoritative set of
//! connected clients and announces joins and leaves on a presence channel.
//!
//! ```text
//!                 emit("notifyEntityUpdates")
//!                          │
//!                          ▼
//!   SocketHub ── broadcast::Sender<OutboundEvent>
//!   ├── client-a (receiver)
//!   ├── client-b (receiver)
//!   └── client-c (receiver)
//! ```

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::{broadcast, RwLock};
use uuid::Uuid;

use crate::config::BroadcastConfig;
use crate::domain::foundation::Timestamp;
use crate::ports::{BroadcastChannel, BroadcastError, PresenceEvent};

use super::messages::OutboundEvent;

/// Unique identifier for a WebSocket client connection.
///
/// Generated server-side when a client connects.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClientId(Uuid);

impl ClientId {
    /// Create a new random client ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ClientId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ClientId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Fan-out hub for all subscriber connections.
///
/// # Thread Safety
///
/// Emits only touch the broadcast sender and never take the client lock,
/// so joins and leaves never stall delivery.
pub struct SocketHub {
    sender: broadcast::Sender<OutboundEvent>,

    /// Connected clients and when they joined. Its size is the subscriber count.
    clients: RwLock<HashMap<ClientId, Timestamp>>,

    presence: broadcast::Sender<PresenceEvent>,

    max_message_bytes: usize,
}

impl SocketHub {
    /// Create a hub with explicit buffer sizes.
    ///
    /// # Arguments
    ///
    /// * `channel_capacity` - Events buffered per client before slow
    ///   clients skip ahead.
    /// * `presence_capacity` - Presence notifications buffered for listeners.
    /// * `max_message_bytes` - Largest encoded frame accepted by `emit`.
    pub fn new(channel_capacity: usize, presence_capacity: usize, max_message_bytes: usize) -> Self {
        let (sender, _) = broadcast::channel(channel_capacity);
        let (presence, _) = broadcast::channel(presence_capacity);
        Self {
            sender,
            clients: RwLock::new(HashMap::new()),
            presence,
            max_message_bytes,
        }
    }

    pub fn from_config(config: &BroadcastConfig, max_message_bytes: usize) -> Self {
        Self::new(config.channel_capacity, config.presence_capacity, max_message_bytes)
    }

    /// Create with default capacities (256 events, 64 presence, 5 MB frames).
    pub fn with_default_capacity() -> Self {
        Self::new(256, 64, 5_000_000)
    }

    /// Register a client and return its event receiver.
    ///
    /// The client is counted before the `Connected` notification goes out,
    /// so listeners reading the count see it.
    pub async fn join(&self, client_id: ClientId) -> broadcast::Receiver<OutboundEvent> {
        let receiver = self.sender.subscribe();

        self.clients
            .write()
            .await
            .insert(client_id.clone(), Timestamp::now());

        tracing::debug!(client_id = %client_id, "Subscriber joined");
        let _ = self.presence.send(PresenceEvent::Connected);

        receiver
    }

    /// Remove a client. Unknown clients are ignored, so a double leave
    /// announces only one disconnect.
    pub async fn leave(&self, client_id: &ClientId) {
        let removed = self.clients.write().await.remove(client_id);

        if let Some(joined_at) = removed {
            tracing::debug!(
                client_id = %client_id,
                joined_at = %joined_at.to_rfc3339(),
                "Subscriber left"
            );
            let _ = self.presence.send(PresenceEvent::Disconnected);
        }
    }

    /// All currently connected client IDs (for monitoring/debugging).
    pub async fn connected_clients(&self) -> Vec<ClientId> {
        self.clients.read().await.keys().cloned().collect()
    }
}

impl Default for SocketHub {
    fn default() -> Self {
        Self::with_default_capacity()
    }
}

#[async_trait]
impl BroadcastChannel for SocketHub {
    async fn emit(
        &self,
        event_name: &str,
        payload: serde_json::Value,
    ) -> Result<usize, BroadcastError> {
        let event = OutboundEvent::encode(event_name, &payload, self.max_message_bytes)?;

        // No receivers is fine: nobody is listening right now.
        Ok(self.sender.send(event).unwrap_or(0))
    }

    async fn subscriber_count(&self) -> usize {
        self.clients.read().await.len()
    }

    fn presence(&self) -> broadcast::Receiver<PresenceEvent> {
        self.presence.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn join_counts_client_and_announces_presence() {
        let hub = SocketHub::with_default_capacity();
        let mut presence = hub.presence();

        let _rx = hub.join(ClientId::new()).await;

        assert_eq!(hub.subscriber_count().await, 1);
        assert_eq!(presence.recv().await.unwrap(), PresenceEvent::Connected);
    }

    #[tokio::test]
    async fn all_clients_receive_emitted_event() {
        let hub = SocketHub::with_default_capacity();
        let mut rx1 = hub.join(ClientId::new()).await;
        let mut rx2 = hub.join(ClientId::new()).await;

        let delivered = hub
            .emit("notifyEntityUpdates", json!({"batchUuid": "b1"}))
            .await
            .unwrap();

        assert_eq!(delivered, 2);
        assert_eq!(&*rx1.recv().await.unwrap().event, "notifyEntityUpdates");
        assert_eq!(&*rx2.recv().await.unwrap().event, "notifyEntityUpdates");
    }

    #[tokio::test]
    async fn emit_without_clients_is_noop() {
        let hub = SocketHub::with_default_capacity();

        let delivered = hub.emit("notifyInitialDump", json!({})).await.unwrap();

        assert_eq!(delivered, 0);
    }

    #[tokio::test]
    async fn emit_rejects_oversized_payload() {
        let hub = SocketHub::new(8, 8, 16);
        let _rx = hub.join(ClientId::new()).await;

        let result = hub.emit("notifyInitialDump", json!({"entities": "x".repeat(32)})).await;

        assert!(matches!(result, Err(BroadcastError::PayloadTooLarge { .. })));
    }

    #[tokio::test]
    async fn leave_uncounts_client_and_announces_once() {
        let hub = SocketHub::with_default_capacity();
        let client_id = ClientId::new();
        let _rx = hub.join(client_id.clone()).await;
        let mut presence = hub.presence();

        hub.leave(&client_id).await;
        hub.leave(&client_id).await;

        assert_eq!(hub.subscriber_count().await, 0);
        assert_eq!(presence.recv().await.unwrap(), PresenceEvent::Disconnected);
        assert!(presence.try_recv().is_err());
    }

    #[tokio::test]
    async fn connected_clients_lists_every_join() {
        let hub = SocketHub::with_default_capacity();
        let a = ClientId::new();
        let b = ClientId::new();
        let _ra = hub.join(a.clone()).await;
        let _rb = hub.join(b.clone()).await;

        let clients = hub.connected_clients().await;
        assert_eq!(clients.len(), 2);
        assert!(clients.contains(&a));
        assert!(clients.contains(&b));
    }

    #[test]
    fn client_id_display_is_uuid() {
        assert_eq!(ClientId::new().to_string().len(), 36);
    }
}
