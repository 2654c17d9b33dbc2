//! Error types for the frame arbiter.
//!
//! Every failure here is local and synchronous. None of these errors leave the
//! arbiter or schedule in a modified state; the caller simply must not render or
//! consume anything for the failed call.

use std::path::PathBuf;

use novade_buffer_manager::BufferId;
use thiserror::Error;

/// Errors produced by a [`crate::Schedule`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ScheduleError {
    /// `next_buffer` was called while nothing was scheduled.
    #[error("No buffer scheduled")]
    Underflow,

    /// The buffer is already waiting in this schedule.
    #[error("{0} is already scheduled")]
    AlreadyScheduled(BufferId),

    /// The schedule was dropped before the buffer was consumed.
    #[error("{0} was discarded before being consumed")]
    Discarded(BufferId),
}

/// Errors produced by [`crate::MultiMonitorArbiter`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ArbiterError {
    /// There is no current buffer and nothing scheduled to become one.
    #[error("No buffer available for compositing")]
    NoBufferAvailable,
}

/// Error type for configuration loading and validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("Failed to read configuration file from {path:?}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The configuration is not valid TOML or does not match the schema.
    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),

    /// The configuration parsed but holds invalid values.
    #[error("Configuration validation failed: {0}")]
    Validation(String),
}

/// Umbrella error for callers that drive the whole crate.
#[derive(Debug, Error)]
pub enum FrameArbiterError {
    #[error("Arbiter error: {0}")]
    Arbiter(#[from] ArbiterError),

    #[error("Schedule error: {0}")]
    Schedule(#[from] ScheduleError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Logging initialization failed: {0}")]
    LoggingInitialization(String),
}
