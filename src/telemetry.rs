//! Module for telemetry functionality such as logging

use anyhow::Result;
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Maps the `--debug` level (0-3) onto a default filter directive.
pub fn level_directive(debug: u8) -> &'static str {
    match debug {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Sets up logging. The log level is derived from `debug` unless the `RUST_LOG` env variable is set.
/// The logging format (pretty/json) is set by the `LOG_FORMAT` env variable.
pub fn setup_logging(debug: u8) -> Result<()> {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| level_directive(debug).into());

    let format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "pretty".to_string());
    // stdout carries the import tally
    let writer = std::io::stderr;

    if format == "json" {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json().with_writer(writer))
            .try_init()?;
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().pretty().with_writer(writer))
            .try_init()?;
    }
    debug!("Debug mode is enabled. Record contents will be logged.");
    Ok(())
}
