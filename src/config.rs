//! Questlog configuration.
//!
//! Loaded from `~/.questlog/config.toml`. Every key is optional and a
//! missing file means all defaults:
//!
//! ```toml
//! data-dir = "/home/me/.questlog/data"
//! time-zone = "Asia/Tokyo"
//! log-level = "info"
//! ```

use std::fs;
use std::path::PathBuf;

use jiff::tz::TimeZone;
use serde::{Deserialize, Serialize};

/// Errors that can occur while loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config at {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("unknown time zone {name:?}: {source}")]
    TimeZone { name: String, source: jiff::Error },

    #[error("could not determine home directory")]
    NoHome,
}

/// Questlog configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Config {
    /// Where events, progress and goal definitions are stored.
    /// Defaults to `~/.questlog/data`.
    pub data_dir: Option<PathBuf>,

    /// IANA time zone that decides where one day ends and the next begins.
    /// Defaults to the system time zone.
    pub time_zone: Option<String>,

    /// Default log filter when `RUST_LOG` is unset.
    pub log_level: Option<String>,
}

impl Config {
    /// Load config from `~/.questlog/config.toml`, or defaults if it doesn't exist.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::path().ok_or(ConfigError::NoHome)?;
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.clone(),
            source,
        })?;
        Self::parse(&contents).map_err(|source| ConfigError::Parse { path, source })
    }

    fn parse(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }

    /// The config file path: `~/.questlog/config.toml`.
    pub fn path() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".questlog").join("config.toml"))
    }

    /// The configured time zone, falling back to the system one.
    pub fn time_zone(&self) -> Result<TimeZone, ConfigError> {
        match &self.time_zone {
            Some(name) => TimeZone::get(name).map_err(|source| ConfigError::TimeZone {
                name: name.clone(),
                source,
            }),
            None => Ok(TimeZone::system()),
        }
    }

    /// The data directory, if one is configured or a home directory exists.
    pub fn data_dir(&self) -> Option<PathBuf> {
        self.data_dir.clone().or_else(crate::storage::Storage::default_root)
    }
}
