//! Duel Arena Server
//!
//! Loads configuration, sets up logging and serves the arena until Ctrl-C.

use std::sync::Arc;

use anyhow::Context;
use tracing::info;

use duel_arena::{
    network::{GameServer, ServerConfig},
    TICK_RATE, VERSION,
};

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let json = matches!(std::env::var("LOG_FORMAT").as_deref(), Ok("json"));
    if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .json()
            .with_current_span(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .compact()
            .init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env locally; safe to ignore when not present.
    let _ = dotenvy::dotenv();
    init_tracing();

    let config = ServerConfig::from_env().context("reading configuration")?;
    info!("Duel Arena Server v{}", VERSION);
    info!("Tick Rate: {} Hz", TICK_RATE);
    info!(bind_addr = %config.bind_addr, max_connections = config.max_connections, "configuration loaded");

    let server = Arc::new(GameServer::new(config));

    let signal_server = server.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Ctrl-C received");
            signal_server.shutdown();
        }
    });

    server.run().await.context("server failed")?;
    info!("Server stopped");
    Ok(())
}
