use pocket_ledger::{
    api::start_server,
    config::TrackerConfig,
    conversation::ConversationEngine,
    persistence::JsonFileStore,
    state::LedgerStore,
};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = TrackerConfig::from_env()?;

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("Pocket Ledger - API Server");
    info!(port = config.port, data = %config.data_path.display(), "Configuration loaded");

    let gateway = Box::new(JsonFileStore::new(config.data_path.clone()));
    let store = Arc::new(LedgerStore::open(gateway).await);
    let engine = Arc::new(ConversationEngine::new(store));

    start_server(engine, config.port).await?;

    Ok(())
}
