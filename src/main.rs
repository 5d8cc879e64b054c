//! edge-gate binary.
//!
//! Serves a minimal echo application behind the admission and capture
//! pipeline. Real deployments embed [`GateServer`] around their own
//! router instead.

use std::path::PathBuf;

use axum::{body::Bytes, routing::any, Router};
use clap::Parser;
use tokio::net::TcpListener;

use edge_gate::config::{self, GateConfig};
use edge_gate::observability::{logging, metrics};
use edge_gate::GateServer;

#[derive(Parser, Debug)]
#[command(
    name = "edge-gate",
    about = "Per-client admission control and traffic capture edge"
)]
struct Cli {
    /// Path to a TOML config file. Defaults apply when omitted.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => config::load_config(path)?,
        None => GateConfig::default(),
    };

    logging::init(&config.observability.log_filter);

    tracing::info!(
        bind_address = %config.listener.bind_address,
        refill_rate_per_sec = config.rate_limit.refill_rate_per_sec,
        burst_capacity = config.rate_limit.burst_capacity,
        capture_enabled = config.capture.enabled,
        "configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "listening for connections");

    let app = Router::new()
        .route("/", any(echo))
        .route("/{*path}", any(echo));

    let server = GateServer::new(config, app);
    server.run(listener).await?;

    tracing::info!("shutdown complete");
    Ok(())
}

/// Echo the request body back unchanged.
async fn echo(body: Bytes) -> Bytes {
    body
}
