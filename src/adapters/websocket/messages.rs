//! WebSocket message types for the subscriber socket.
//!
//! Defines the protocol between server and connected clients:
//! - Server → Client: connection status, pongs, errors, and bridge events
//!   (`notifyInitialDump`, `notifyEntityUpdates`)
//! - Client → Server: pings
//!
//! Every server frame has the shape `{"event": <name>, "data": <payload>}`.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::ports::BroadcastError;

// ============================================
// Server → Client Messages
// ============================================

/// Control messages the server sends on its own initiative.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Connection established successfully.
    Connected(ConnectedMessage),

    /// Error occurred.
    Error(ErrorMessage),

    /// Heartbeat response.
    Pong(PongMessage),
}

/// Sent when client successfully connects.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectedMessage {
    pub client_id: String,
    pub timestamp: String,
}

/// Error message sent to client.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorMessage {
    pub code: String,
    pub message: String,
    pub timestamp: String,
}

/// Heartbeat response.
#[derive(Debug, Clone, Serialize)]
pub struct PongMessage {
    pub timestamp: String,
}

/// A bridge event as it goes on the wire.
#[derive(Debug, Serialize)]
struct EventFrame<'a> {
    event: &'a str,
    data: &'a serde_json::Value,
}

// ============================================
// Client → Server Messages
// ============================================

/// All message types that can be received from client.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Heartbeat request.
    Ping,
}

// ============================================
// Internal Types
// ============================================

/// A broadcast event, encoded once and shared by every subscriber's
/// send task.
#[derive(Debug, Clone)]
pub struct OutboundEvent {
    pub event: Arc<str>,
    pub frame: Arc<str>,
}

impl OutboundEvent {
    /// Encode `data` under `event`, refusing frames larger than `limit`.
    pub fn encode(
        event: &str,
        data: &serde_json::Value,
        limit: usize,
    ) -> Result<Self, BroadcastError> {
        let frame = serde_json::to_string(&EventFrame { event, data })?;
        if frame.len() > limit {
            return Err(BroadcastError::PayloadTooLarge {
                size: frame.len(),
                limit,
            });
        }
        Ok(Self {
            event: Arc::from(event),
            frame: Arc::from(frame),
        })
    }
}
