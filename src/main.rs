// src/main.rs
//! Capture Engine
//!
//! Starts a capture session with the configured interception engine and
//! default session filename, then stops it on Ctrl-C.

use anyhow::Result;
use capture_engine::observability::init_tracing;
use capture_engine::supervisor::{EngineSupervisor, SupervisorConfig};
use capture_engine::utils::config::CaptureConfig;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing()?;

    info!("Starting capture engine v{}", env!("CARGO_PKG_VERSION"));

    let config = CaptureConfig::load()?;
    info!("Configuration loaded: {:?}", config);

    let supervisor = EngineSupervisor::new(SupervisorConfig::from(&config));
    let filename = config.capture.default_file.clone();

    supervisor.start(&filename).await?;
    info!("Capture session started, logging to {filename}");

    tokio::signal::ctrl_c().await?;
    info!("Received shutdown signal, stopping interception engine");

    if let Err(e) = supervisor.stop().await {
        error!("Failed to stop interception engine: {e}");
    }

    Ok(())
}
