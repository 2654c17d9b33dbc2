//! Logging setup built on `tracing-subscriber`.
//!
//! The arbiter itself only emits `tracing` events. Embedders that don't install
//! their own subscriber can use one of these helpers.

use std::io::IsTerminal;

use tracing::Level;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::LoggingConfig;
use crate::error::FrameArbiterError;

/// Initializes a minimal logging setup, directing messages to `stderr`.
///
/// Filters by `RUST_LOG`, defaulting to "info". Errors (e.g. a global subscriber
/// already being set) are ignored, so this is safe to call from every test.
pub fn init_minimal_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(Level::INFO.to_string()));

    let _ = fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .try_init();
}

/// Installs the global subscriber described by `config`.
///
/// # Errors
///
/// Returns [`FrameArbiterError::LoggingInitialization`] for an unknown level or
/// format, or if a global subscriber is already installed.
pub fn initialize_logging(config: &LoggingConfig) -> Result<(), FrameArbiterError> {
    let level: Level = config.level.parse().map_err(|_| {
        FrameArbiterError::LoggingInitialization(format!("Invalid log level: {}", config.level))
    })?;
    let filter = EnvFilter::new(level.to_string());

    let result = match config.format.to_lowercase().as_str() {
        "json" => fmt::Subscriber::builder()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init(),
        "text" => fmt::Subscriber::builder()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_ansi(std::io::stderr().is_terminal())
            .try_init(),
        other => {
            return Err(FrameArbiterError::LoggingInitialization(format!(
                "Invalid log format: {}",
                other
            )))
        }
    };

    result.map_err(|e| {
        FrameArbiterError::LoggingInitialization(format!(
            "Failed to set global tracing subscriber: {}",
            e
        ))
    })
}
