//! Default configuration values.
//!
//! These functions are used by `serde`'s `default` attribute in the configuration
//! structures when a value is not specified.

use super::types::{LoggingConfig, ScheduleConfig};

/// Returns the default `ScheduleConfig`.
pub(super) fn default_schedule_config() -> ScheduleConfig {
    ScheduleConfig {
        backlog_limit: default_backlog_limit(),
    }
}

/// Returns the default backlog limit (`None`, unbounded).
pub(super) fn default_backlog_limit() -> Option<usize> {
    None
}

/// Returns the default `LoggingConfig`.
pub(super) fn default_logging_config() -> LoggingConfig {
    LoggingConfig {
        level: default_log_level(),
        format: default_log_format(),
    }
}

/// Returns the default log level string (`"info"`).
pub(super) fn default_log_level() -> String {
    "info".to_string()
}

/// Returns the default log format string (`"text"`).
pub(super) fn default_log_format() -> String {
    "text".to_string()
}
