//! core::config
//!
//! Configuration schema and loading.
//!
//! # Precedence
//!
//! Configuration values are resolved in this order (later overrides earlier):
//! 1. Default values
//! 2. Config file
//! 3. CLI flags (not handled here)
//!
//! # Config Locations
//!
//! Searched in order, first hit wins:
//! 1. Path given with `--config`
//! 2. `$VSDX_SHRINK_CONFIG` if set
//! 3. `$XDG_CONFIG_HOME/vsdx-shrink/config.toml`
//! 4. `~/.vsdx-shrink/config.toml`
//!
//! # Example
//!
//! ```no_run
//! use vsdx_shrink::core::config::Config;
//!
//! let config = Config::load(None).unwrap();
//! println!("Backups: {}", config.backup());
//! println!("Suffix: {}", config.backup_suffix());
//! ```

pub mod schema;

pub use schema::ShrinkConfig;

use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "VSDX_SHRINK_CONFIG";

/// Default suffix appended to backup files.
pub const DEFAULT_BACKUP_SUFFIX: &str = ".bak";

/// Default number of names listed in reports.
pub const DEFAULT_DISPLAY_LIMIT: usize = 10;

/// Errors from configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("config file not found: {0}")]
    NotFound(PathBuf),

    #[error("invalid config value: {0}")]
    InvalidValue(String),
}

/// Loaded configuration with accessors that apply defaults.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// File configuration
    pub file: ShrinkConfig,
    /// Path the configuration was loaded from, if any
    loaded_from: Option<PathBuf>,
}

impl Config {
    /// Load configuration.
    ///
    /// An `explicit` path must exist. Otherwise the standard locations are
    /// searched and a missing file simply yields defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if a config file exists but cannot be read, parsed
    /// or validated.
    pub fn load(explicit: Option<&Path>) -> Result<Config, ConfigError> {
        let path = match explicit {
            Some(path) if path.exists() => Some(path.to_path_buf()),
            Some(path) => return Err(ConfigError::NotFound(path.to_path_buf())),
            None => Self::find(),
        };

        let Some(path) = path else {
            return Ok(Config::default());
        };

        let file = Self::read_config(&path)?;
        file.validate()?;

        Ok(Config {
            file,
            loaded_from: Some(path),
        })
    }

    /// Search the standard locations.
    fn find() -> Option<PathBuf> {
        // 1. Check $VSDX_SHRINK_CONFIG
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            let path = PathBuf::from(path);
            if path.exists() {
                return Some(path);
            }
        }

        // 2. Check $XDG_CONFIG_HOME/vsdx-shrink/config.toml
        if let Ok(xdg_home) = std::env::var("XDG_CONFIG_HOME") {
            let path = PathBuf::from(xdg_home).join("vsdx-shrink/config.toml");
            if path.exists() {
                return Some(path);
            }
        }

        // 3. Check ~/.vsdx-shrink/config.toml
        dirs::home_dir()
            .map(|home| home.join(".vsdx-shrink/config.toml"))
            .filter(|path| path.exists())
    }

    /// Read and parse a config file.
    fn read_config(path: &Path) -> Result<ShrinkConfig, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    // =========================================================================
    // Accessor methods with defaults
    // =========================================================================

    /// Whether to back up inputs overwritten in place.
    ///
    /// Defaults to `true` if not configured.
    pub fn backup(&self) -> bool {
        self.file.backup.unwrap_or(true)
    }

    /// Suffix appended to backup file names.
    ///
    /// Defaults to `.bak` if not configured.
    pub fn backup_suffix(&self) -> &str {
        self.file
            .backup_suffix
            .as_deref()
            .unwrap_or(DEFAULT_BACKUP_SUFFIX)
    }

    /// Number of unused master names listed in reports.
    ///
    /// Defaults to 10 if not configured.
    pub fn display_limit(&self) -> usize {
        self.file.display_limit.unwrap_or(DEFAULT_DISPLAY_LIMIT)
    }

    /// Deflate level for rebuilt archives, if configured.
    pub fn compression_level(&self) -> Option<i64> {
        self.file.compression_level
    }

    /// Get the path the config was loaded from.
    pub fn loaded_from(&self) -> Option<&Path> {
        self.loaded_from.as_deref()
    }
}
