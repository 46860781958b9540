//! trackr HTTP server binary.

use anyhow::Context;
use clap::Parser;
use trackr_server::{Args, DEFAULT_LOG_FILTER, ServerConfig};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .init();

    let args = Args::parse();
    let config = ServerConfig::resolve(&args).context("Failed to load configuration")?;

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "Starting trackr-server");
    trackr_server::run(config).await?;

    Ok(())
}
