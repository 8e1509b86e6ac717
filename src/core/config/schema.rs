//! core::config::schema
//!
//! Configuration schema types.
//!
//! # Validation
//!
//! Config values are validated after parsing so that a bad value is
//! reported at load time rather than halfway through a shrink.

use serde::{Deserialize, Serialize};

use super::ConfigError;

/// User configuration.
///
/// # Example
///
/// ```toml
/// backup = true
/// backup_suffix = ".bak"
/// display_limit = 10
/// compression_level = 6
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ShrinkConfig {
    /// Write a backup before overwriting an input in place
    pub backup: Option<bool>,

    /// Suffix appended to the input file name for backups
    pub backup_suffix: Option<String>,

    /// Maximum number of unused master names listed in reports
    pub display_limit: Option<usize>,

    /// Deflate level used when rebuilding archives (0-9)
    pub compression_level: Option<i64>,
}

impl ShrinkConfig {
    /// Accepted range for `compression_level`.
    pub const COMPRESSION_LEVELS: std::ops::RangeInclusive<i64> = 0..=9;

    /// Validate the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if any value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(suffix) = &self.backup_suffix {
            if suffix.is_empty() {
                return Err(ConfigError::InvalidValue(
                    "backup_suffix cannot be empty".to_string(),
                ));
            }
            if suffix.contains('/') || suffix.contains('\\') {
                return Err(ConfigError::InvalidValue(format!(
                    "backup_suffix '{}' cannot contain path separators",
                    suffix
                )));
            }
        }

        if let Some(level) = self.compression_level {
            if !Self::COMPRESSION_LEVELS.contains(&level) {
                return Err(ConfigError::InvalidValue(format!(
                    "invalid compression_level {}, must be between {} and {}",
                    level,
                    Self::COMPRESSION_LEVELS.start(),
                    Self::COMPRESSION_LEVELS.end()
                )));
            }
        }

        Ok(())
    }
}
