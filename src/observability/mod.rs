// src/observability/mod.rs
//! Tracing and logging initialization

use tracing_subscriber::EnvFilter;

/// Initialize the global tracing subscriber.
///
/// Respects `RUST_LOG`; defaults to `info`. Set `CAPTURE_LOG_JSON=1` for
/// machine-readable output.
pub fn init_tracing() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let json_output = std::env::var("CAPTURE_LOG_JSON").is_ok_and(|v| v == "1" || v == "true");

    let result = if json_output {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .try_init()
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).try_init()
    };

    result.map_err(|e| anyhow::anyhow!("failed to initialize tracing: {e}"))
}
