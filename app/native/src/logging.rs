//! Logging initialization using the `tracing` crate.
//!
//! This module configures the tracing subscriber with sensible defaults:
//! - Uses `RUST_LOG` environment variable for filtering
//! - Outputs to stderr so stdout stays clean for CLI output
//! - Includes target and log levels

use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

use crate::core::constants::{APP_ID, APP_VERSION};

/// Builds the filter used when `RUST_LOG` is not set.
fn default_filter() -> String {
    let default_level = if cfg!(debug_assertions) { "debug" } else { "info" };
    format!("warn,{APP_ID}={default_level}")
}

/// Initializes the global tracing subscriber.
///
/// This should be called once at application startup, before any logging occurs.
///
/// The log level can be controlled via the `RUST_LOG` environment variable:
/// - `RUST_LOG=debug` - Show debug and above
/// - `RUST_LOG=glint=trace,warn` - Trace for glint, warn for others
///
/// Default level is `info` for release builds and `debug` for debug builds.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter()));

    let subscriber = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_file(false)
        .with_line_number(false)
        .with_ansi(true)
        .compact();

    tracing_subscriber::registry().with(filter).with(subscriber).init();

    tracing::debug!(version = APP_VERSION, "starting glint");
}
