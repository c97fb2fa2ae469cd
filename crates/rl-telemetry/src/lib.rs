//! Structured JSON logging bootstrap, shared by `rl-server` and, in tests,
//! by the library crates directly.

#![deny(unsafe_code)]

use thiserror::Error;
use tracing_subscriber::{fmt, layer::SubscriberExt, EnvFilter, Registry};

#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("logging already initialized: {0}")]
    AlreadyInitialized(String),
}

/// Initialize structured JSON logging with an env filter.
///
/// Controlled by `RUST_LOG`, e.g. `"info,rl_limiter=debug"`. Defaults to
/// `"info"` when unset or invalid.
pub fn init_json_logging() -> Result<(), TelemetryError> {
    let fmt_layer = fmt::layer().json().with_current_span(true).with_span_list(true);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = Registry::default().with(filter).with(fmt_layer);
    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| TelemetryError::AlreadyInitialized(e.to_string()))
}
