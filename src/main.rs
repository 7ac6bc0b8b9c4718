mod api;
mod commands;
mod config;
mod db;
mod error;
mod gateway;
mod render;
mod state;
mod types;
mod wheel;

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::api::routes::{router, ApiState};
use crate::api::{HealthState, LatencyStats};
use crate::commands::{CommandDispatcher, CommandWorker};
use crate::config::{Config, CHANNEL_CAPACITY};
use crate::db::SqliteWheelRepository;
use crate::error::Result;
use crate::gateway::GatewayClient;
use crate::render::HttpRenderer;
use crate::state::{CacheSweeper, WheelStore};

#[tokio::main]
async fn main() {
    let cfg = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Config error: {e}");
            std::process::exit(1);
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&cfg.log_level))
        .init();

    if let Err(e) = run(cfg).await {
        error!("Fatal error: {e}");
        std::process::exit(1);
    }
}

async fn run(cfg: Config) -> Result<()> {
    // --- Durable storage + cache ---
    let repo = SqliteWheelRepository::open(&cfg.db_path).await?;
    info!("Database ready at {}", cfg.db_path);

    let store = WheelStore::new(repo);
    let sweeper = CacheSweeper::new(Arc::clone(&store));
    tokio::spawn(async move { sweeper.run().await });

    // --- Shared stats ---
    let health = Arc::new(HealthState::new());
    let latency = Arc::new(LatencyStats::new());

    // --- Command handling ---
    let renderer = HttpRenderer::from_config(&cfg)?;
    info!(renderer = %cfg.renderer_url, font_dir = ?cfg.font_dir, "Renderer configured");
    if cfg.channel_prefix.is_empty() {
        info!("WHEEL_CHANNEL_PREFIX empty: commands accepted in every channel");
    }

    let dispatcher = Arc::new(CommandDispatcher::new(
        Arc::clone(&store),
        renderer,
        cfg.channel_prefix.clone(),
        cfg.spin_result_delay,
    ));

    let (command_tx, command_rx) = mpsc::channel(CHANNEL_CAPACITY);

    let worker = CommandWorker::new(
        dispatcher,
        Arc::clone(&health),
        Arc::clone(&latency),
        command_rx,
    );
    tokio::spawn(async move { worker.run().await });

    // --- Gateway ---
    let gateway = GatewayClient::from_config(&cfg, command_tx, Arc::clone(&health));
    tokio::spawn(async move { gateway.run().await });

    // --- HTTP API server ---
    let app = router(ApiState { store, health, latency });
    let bind_addr = format!("0.0.0.0:{}", cfg.api_port);
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!("HTTP API listening on {bind_addr}");

    axum::serve(listener, app).await?;

    Ok(())
}
