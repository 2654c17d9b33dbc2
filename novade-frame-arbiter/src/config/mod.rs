//! Configuration for the frame arbiter.
//!
//! Configuration is TOML. [`FrameArbiterConfig::from_toml_str`] and
//! [`FrameArbiterConfig::load`] parse it, apply defaults for missing values, and
//! validate the result:
//!
//! - `schedule.backlog_limit` must be positive when set.
//! - `logging.level` and `logging.format` are lower-cased and must be known values.

mod defaults;
pub mod types;

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::error::ConfigError;

pub use types::{FrameArbiterConfig, LoggingConfig, ScheduleConfig};

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];
const LOG_FORMATS: [&str; 2] = ["text", "json"];

impl FrameArbiterConfig {
    /// Parses and validates a TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let mut config: FrameArbiterConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates the TOML file at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(?path, "loaded frame arbiter configuration");
        Self::from_toml_str(&content)
    }

    /// Normalises and checks values that `serde` can't.
    pub fn validate(&mut self) -> Result<(), ConfigError> {
        if self.schedule.backlog_limit == Some(0) {
            return Err(ConfigError::Validation(
                "schedule.backlog_limit must be at least 1".to_string(),
            ));
        }

        self.logging.level = self.logging.level.to_lowercase();
        if !LOG_LEVELS.contains(&self.logging.level.as_str()) {
            return Err(ConfigError::Validation(format!(
                "invalid logging.level '{}'",
                self.logging.level
            )));
        }

        self.logging.format = self.logging.format.to_lowercase();
        if !LOG_FORMATS.contains(&self.logging.format.as_str()) {
            return Err(ConfigError::Validation(format!(
                "invalid logging.format '{}'",
                self.logging.format
            )));
        }
        Ok(())
    }
}
