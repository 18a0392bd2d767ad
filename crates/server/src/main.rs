//! Headless match server.
//!
//! Loads a scenario, plays it out with AI seats and replays every batch on
//! in-process clients, then checks that each client reached the server's
//! state root.
mod config;

use anyhow::{Result, bail};
use game_content::ContentFactory;
use runtime::{Runtime, RuntimeConfig, SkirmishProvider};
use tracing::{error, info};

use config::ServerConfig;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists (silently ignore if not found)
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = ServerConfig::from_env();
    let runtime_config = RuntimeConfig::from_env()?;
    info!(
        content_dir = %config.content_dir.display(),
        scenario = %config.scenario,
        clients = config.replay_clients,
        "starting match server"
    );

    let content = ContentFactory::new(&config.content_dir).load_match(&config.scenario)?;
    let mut runtime = Runtime::builder()
        .config(runtime_config)
        .with_content(content)
        .default_provider(SkirmishProvider)
        .replay_clients(config.replay_clients)
        .build()
        .await?;

    let played = runtime.run(config.max_turns).await?;
    let server_state = runtime.handle().query_state().await?;
    let server_root = hex::encode(server_state.state_root()?);
    info!(
        turns = played,
        round = server_state.turn.round,
        nonce = server_state.turn.nonce,
        root = %server_root,
        "match finished"
    );

    let mut diverged = 0;
    for client in runtime.clients() {
        let state = client.settle().await?;
        let root = hex::encode(state.state_root()?);
        if root == server_root {
            info!(client = client.index(), %root, "replay matches");
        } else {
            error!(client = client.index(), %root, expected = %server_root, "replay diverged");
            diverged += 1;
        }
    }

    runtime.shutdown().await?;
    if diverged > 0 {
        bail!("{diverged} replay client(s) diverged from the server");
    }
    Ok(())
}
