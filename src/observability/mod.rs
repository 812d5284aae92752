// src/observability/mod.rs
//! Logging and metrics
//!
//! - **Tracing**: `tracing-subscriber` with `EnvFilter`, human or JSON output
//! - **Counters**: `metrics` facade counters for hook decisions and store I/O
//!
//! The engine never installs a metrics exporter; the embedding harness does.

pub mod counters;

use crate::utils::config::{LogFormat, LoggingConfig};
use anyhow::{Context, Result};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Registry};

/// Install the global tracing subscriber
///
/// `RUST_LOG` takes precedence over the configured filter. Calling this twice
/// is harmless: the second install fails and is reported, not panicked on.
pub fn init_tracing(config: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.filter))
        .context("invalid log filter")?;

    let registry = Registry::default().with(filter);

    match config.format {
        LogFormat::Json => registry
            .with(fmt::layer().json().with_target(true))
            .try_init()
            .context("tracing subscriber already installed")?,
        LogFormat::Pretty => registry
            .with(fmt::layer().with_target(false))
            .try_init()
            .context("tracing subscriber already installed")?,
    }

    counters::describe();

    Ok(())
}
