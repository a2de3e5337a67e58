//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the bridge to the outside world:
//! - `feed` - Upstream feed implementations (synthetic, scripted)
//! - `websocket` - Subscriber fan-out hub and WebSocket route

pub mod feed;
pub mod websocket;

pub use feed::{ScriptedFeed, SyntheticFeed};
pub use websocket::{websocket_router, SocketHub, WebSocketState};
