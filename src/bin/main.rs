use pocket_ledger::{
    config::TrackerConfig,
    console::{menu_text, parse_line, ConsoleLine},
    conversation::ConversationEngine,
    persistence::JsonFileStore,
    presenter::{render_error, render_outcome},
    state::LedgerStore,
};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = TrackerConfig::from_env()?;

    // Logs go to stderr so replies stay readable on stdout
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    info!(user_id = %config.console_user, data = %config.data_path.display(), "Console bot starting");

    let gateway = Box::new(JsonFileStore::new(config.data_path.clone()));
    let store = Arc::new(LedgerStore::open(gateway).await);
    let engine = ConversationEngine::new(store);
    let user = config.console_user;

    let mut stdout = tokio::io::stdout();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    stdout.write_all(format!("{}\n", menu_text()).as_bytes()).await?;
    stdout.flush().await?;

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }

        let reply = match parse_line(&line) {
            Ok(ConsoleLine::Quit) => break,
            Ok(ConsoleLine::Menu) => menu_text(),
            Ok(ConsoleLine::Intent(intent)) => match engine.dispatch(user, intent).await {
                Ok(outcome) => render_outcome(&outcome),
                Err(e) => render_error(&e),
            },
            Ok(ConsoleLine::Text(text)) => match engine.advance(user, &text).await {
                Ok(outcome) => render_outcome(&outcome),
                Err(e) => render_error(&e),
            },
            Err(e) => {
                warn!("Rejected command {:?}: {}", line, e);
                render_error(&e)
            }
        };

        stdout.write_all(format!("{}\n", reply).as_bytes()).await?;
        stdout.flush().await?;
    }

    Ok(())
}
