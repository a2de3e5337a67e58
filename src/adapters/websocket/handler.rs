//! WebSocket upgrade handler for subscriber connections.
//!
//! Handles the HTTP → WebSocket upgrade and manages the connection lifecycle:
//! 1. Upgrade to WebSocket (bounded message size)
//! 2. Join the hub, which may activate the bridge
//! 3. Forward hub events until either side goes away
//! 4. Leave the hub, which may deactivate the bridge

use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
    routing::get,
    Json, Router,
};
use futures::{SinkExt, StreamExt};
use tokio::sync::{broadcast, mpsc};

use crate::application::{BridgeRuntime, BridgeStatus};
use crate::domain::foundation::Timestamp;

use super::{
    hub::{ClientId, SocketHub},
    messages::{ClientMessage, ConnectedMessage, ErrorMessage, PongMessage, ServerMessage},
};

/// State required for WebSocket handling.
#[derive(Clone)]
pub struct WebSocketState {
    /// Fan-out hub subscribers join.
    pub hub: Arc<SocketHub>,
    /// Process runtime, for the health report.
    pub runtime: &'static BridgeRuntime,
    /// Largest inbound message accepted from a client.
    pub max_message_bytes: usize,
}

impl WebSocketState {
    pub fn new(
        hub: Arc<SocketHub>,
        runtime: &'static BridgeRuntime,
        max_message_bytes: usize,
    ) -> Self {
        Self {
            hub,
            runtime,
            max_message_bytes,
        }
    }
}

/// Handle WebSocket upgrade requests from subscribers.
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<WebSocketState>) -> Response {
    ws.max_message_size(state.max_message_bytes)
        .on_upgrade(move |socket| handle_socket(socket, state))
}

/// Report bridge activation, subscriber count and idempotency position.
pub async fn health_handler(State(state): State<WebSocketState>) -> Json<BridgeStatus> {
    Json(state.runtime.status().await)
}

/// Handle an established WebSocket connection.
///
/// Runs for the lifetime of the connection. The client always leaves the
/// hub on the way out, whichever side closed first.
async fn handle_socket(socket: WebSocket, state: WebSocketState) {
    let (mut sender, mut receiver) = socket.split();
    let client_id = ClientId::new();

    let mut hub_rx = state.hub.join(client_id.clone()).await;

    let connected = ServerMessage::Connected(ConnectedMessage {
        client_id: client_id.to_string(),
        timestamp: Timestamp::now().to_rfc3339(),
    });

    if let Err(e) = send_control(&mut sender, &connected).await {
        tracing::debug!(client_id = %client_id, "Failed to send connected message: {}", e);
        state.hub.leave(&client_id).await;
        return;
    }

    // Replies to this client only (pongs, protocol errors).
    let (reply_tx, mut reply_rx) = mpsc::channel::<ServerMessage>(16);

    let mut send_task = {
        let client_id = client_id.clone();
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    event = hub_rx.recv() => match event {
                        Ok(event) => {
                            if let Err(e) = sender.send(Message::Text(event.frame.to_string())).await {
                                tracing::debug!(client_id = %client_id, "Send error, closing connection: {}", e);
                                break;
                            }
                        }
                        Err(broadcast::error::RecvError::Lagged(skipped)) => {
                            tracing::warn!(client_id = %client_id, skipped, "Slow subscriber skipped events");
                        }
                        Err(broadcast::error::RecvError::Closed) => break,
                    },
                    reply = reply_rx.recv() => match reply {
                        Some(reply) => {
                            if let Err(e) = send_control(&mut sender, &reply).await {
                                tracing::debug!(client_id = %client_id, "Send error, closing connection: {}", e);
                                break;
                            }
                        }
                        None => break,
                    },
                }
            }
        })
    };

    let mut recv_task = {
        let client_id = client_id.clone();
        tokio::spawn(async move {
            while let Some(result) = receiver.next().await {
                match result {
                    Ok(Message::Text(text)) => match serde_json::from_str::<ClientMessage>(&text) {
                        Ok(ClientMessage::Ping) => {
                            tracing::trace!(client_id = %client_id, "Received ping");
                            let pong = ServerMessage::Pong(PongMessage {
                                timestamp: Timestamp::now().to_rfc3339(),
                            });
                            if reply_tx.send(pong).await.is_err() {
                                break;
                            }
                        }
                        Err(e) => {
                            tracing::debug!(client_id = %client_id, "Ignoring unrecognised client message: {}", e);
                        }
                    },
                    Ok(Message::Binary(_)) => {
                        tracing::warn!(client_id = %client_id, "Received unsupported binary message");
                        let error = ServerMessage::Error(ErrorMessage {
                            code: "UNSUPPORTED".to_string(),
                            message: "Binary frames are not supported".to_string(),
                            timestamp: Timestamp::now().to_rfc3339(),
                        });
                        if reply_tx.send(error).await.is_err() {
                            break;
                        }
                    }
                    // Protocol-level ping/pong is answered by axum.
                    Ok(Message::Ping(_)) | Ok(Message::Pong(_)) => {}
                    Ok(Message::Close(_)) => {
                        tracing::debug!(client_id = %client_id, "Client sent close frame");
                        break;
                    }
                    Err(e) => {
                        tracing::debug!(client_id = %client_id, "Receive error: {}", e);
                        break;
                    }
                }
            }
        })
    };

    tokio::select! {
        _ = &mut send_task => recv_task.abort(),
        _ = &mut recv_task => send_task.abort(),
    }

    state.hub.leave(&client_id).await;
}

/// Send a control message as a JSON text frame.
async fn send_control(
    sender: &mut futures::stream::SplitSink<WebSocket, Message>,
    msg: &ServerMessage,
) -> Result<(), axum::Error> {
    let json = serde_json::to_string(msg).map_err(axum::Error::new)?;
    sender.send(Message::Text(json)).await
}

/// Create axum router for the subscriber socket and health endpoint.
///
/// # Example
///
/// ```ignore
/// let app = websocket_router("/api/socket").with_state(state);
/// ```
pub fn websocket_router(socket_path: &str) -> Router<WebSocketState> {
    Router::new()
        .route(socket_path, get(ws_handler))
        .route("/health", get(health_handler))
}
