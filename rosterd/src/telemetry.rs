//! Tracing initialization.
//!
//! Sets up a tracing-subscriber registry with an `EnvFilter` (respecting
//! `RUST_LOG`, defaulting to `info`) and a console fmt layer. `try_init` is
//! used so tests that initialize logging through `test-log` don't panic on
//! double initialization.

use tracing::info;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Initialize structured logging for the process.
pub fn init_telemetry() -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init()?;

    info!("Telemetry initialized");

    Ok(())
}
