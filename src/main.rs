use std::sync::Arc;

use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use entity_push_bridge::adapters::{websocket_router, SocketHub, SyntheticFeed, WebSocketState};
use entity_push_bridge::application::PROCESS_RUNTIME;
use entity_push_bridge::config::AppConfig;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load_validated()?;
    init_tracing(&config);

    let hub = Arc::new(SocketHub::from_config(
        &config.broadcast,
        config.server.max_message_bytes,
    ));
    let feed = Arc::new(SyntheticFeed::new(config.upstream.synthetic.clone()));

    tracing::info!(
        endpoint = %config.upstream.endpoint(),
        subscription = %config.upstream.subscription_name,
        "Using synthetic upstream feed"
    );

    let runtime = PROCESS_RUNTIME.init(
        hub.clone(),
        feed,
        config.upstream.subscription_name.clone(),
    );

    let state = WebSocketState::new(hub, runtime, config.server.max_message_bytes);
    let app = websocket_router(&config.server.socket_path)
        .with_state(state)
        .layer(TraceLayer::new_for_http());

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, socket_path = %config.server.socket_path, "Listening for subscribers");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    runtime.shutdown().await;
    Ok(())
}

fn init_tracing(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.server.log_level));

    if config.is_production() {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        return;
    }
    tracing::info!("Shutdown signal received");
}
