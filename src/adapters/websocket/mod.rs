//! WebSocket adapters for the subscriber side of the bridge.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                  BroadcastForwarder (PushSink)                       │
//! │   notifyInitialDump / notifyEntityUpdates                            │
//! └─────────────────────────────────────────────────────────────────────┘
//!                                     │ emit
//!                                     ▼
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                           SocketHub                                  │
//! │   ├── client-a   ├── client-b   └── client-c                         │
//! │   presence: Connected / Disconnected ──► LifecycleController         │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Components
//!
//! - [`messages`] - WebSocket message protocol types
//! - [`hub`] - Broadcast channel and subscriber registry
//! - [`handler`] - Axum WebSocket upgrade handler and health route

pub mod handler;
pub mod hub;
pub mod messages;

pub use handler::{health_handler, websocket_router, ws_handler, WebSocketState};
pub use hub::{ClientId, SocketHub};
pub use messages::{
    ClientMessage, ConnectedMessage, ErrorMessage, OutboundEvent, PongMessage, ServerMessage,
};
