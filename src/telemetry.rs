//! Tracing subscriber setup for binaries.

use thiserror::Error;
use tracing_subscriber::EnvFilter;

/// Error returned when a global subscriber is already installed.
#[derive(Debug, Error)]
#[error("failed to install tracing subscriber: {0}")]
pub struct TelemetryError(String);

/// Directives used when `RUST_LOG` is unset.
#[must_use]
pub fn default_directives(level: &str) -> String {
    format!("taskdesk={level},warn")
}

/// Installs a `fmt` subscriber filtered by `RUST_LOG`, falling back to
/// `level` for this crate and `warn` for dependencies.
///
/// # Errors
///
/// Returns [`TelemetryError`] if a global subscriber is already set.
pub fn init_tracing(level: &str) -> Result<(), TelemetryError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(level)));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .try_init()
        .map_err(|err| TelemetryError(err.to_string()))
}
