//! Configuration data structures.
//!
//! All structs reject unknown fields and fall back to the values in
//! [`super::defaults`] for anything left out.

use serde::Deserialize;

use super::defaults;

/// Settings for the producer-side [`crate::QueueingSchedule`].
///
/// ```
/// use novade_frame_arbiter::config::ScheduleConfig;
///
/// let config: ScheduleConfig = toml::from_str("backlog_limit = 3").unwrap();
/// assert_eq!(config.backlog_limit, Some(3));
/// assert_eq!(ScheduleConfig::default().backlog_limit, None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScheduleConfig {
    /// How many buffers may be queued before a blocking `schedule()` waits.
    /// `None` means unbounded. Must not be zero.
    #[serde(default = "defaults::default_backlog_limit")]
    pub backlog_limit: Option<usize>,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        defaults::default_schedule_config()
    }
}

/// Settings for the logging subsystem.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Minimum level: "trace", "debug", "info", "warn" or "error".
    #[serde(default = "defaults::default_log_level")]
    pub level: String,
    /// Output format: "text" or "json".
    #[serde(default = "defaults::default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        defaults::default_logging_config()
    }
}

/// Root configuration for the frame arbiter.
///
/// ```
/// use novade_frame_arbiter::config::FrameArbiterConfig;
///
/// let config = FrameArbiterConfig::from_toml_str(r#"
/// [schedule]
/// backlog_limit = 2
///
/// [logging]
/// level = "DEBUG"
/// "#).unwrap();
/// assert_eq!(config.schedule.backlog_limit, Some(2));
/// assert_eq!(config.logging.level, "debug");
/// assert_eq!(config.logging.format, "text");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FrameArbiterConfig {
    #[serde(default = "defaults::default_schedule_config")]
    pub schedule: ScheduleConfig,
    #[serde(default = "defaults::default_logging_config")]
    pub logging: LoggingConfig,
}
