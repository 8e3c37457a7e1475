//! Tile World Server
//!
//! Generates the world, then serves it over WebSocket until interrupted.

use anyhow::Context;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use tile_world::{GameServer, ServerConfig, VERSION};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;

    info!("Tile World Server v{}", VERSION);

    let config = ServerConfig::from_env();
    match config.world_seed {
        Some(seed) => info!("World seed: {}", seed),
        None => info!("World seed: random"),
    }

    let server = GameServer::bind(config)
        .await
        .context("Failed to start server")?;

    tokio::select! {
        result = server.run() => result.context("Server stopped")?,
        _ = tokio::signal::ctrl_c() => {
            info!("Interrupted, shutting down");
            server.shutdown();
        }
    }

    Ok(())
}
