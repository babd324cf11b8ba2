use std::sync::Arc;
use std::time::Duration;

use belot_server::{ChannelBroadcaster, MemStore, ServerConfig, SessionManager};

#[tokio::main]
async fn main() {
    belot_server::telemetry::init_tracing();

    let config = ServerConfig::default();
    let store = Arc::new(MemStore::new());
    let broadcaster = Arc::new(ChannelBroadcaster::new());
    let manager = SessionManager::new(config, store, broadcaster);
    manager.spawn_sweeper(Duration::from_secs(60));

    tracing::info!("session manager running; waiting for shutdown signal");
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
    }
    manager.shutdown().await;
}
