//! User configuration, read from `$EMTHREE_HOME/config.toml`.
//!
//! Every field is optional in the file; a missing file yields the defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::paths;
use crate::registry::{DEFAULT_API_URL, DEFAULT_MAX_REQUESTS, DEFAULT_SITE_URL};

pub const DEFAULT_GAME_VERSION: &str = "1.21.1";
pub const DEFAULT_LOADER: &str = "fabric";
pub const DEFAULT_WORKERS: usize = 8;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Target platform version.
    pub game_version: String,
    /// Target loader tag.
    pub loader: String,
    /// Where package files are installed.
    pub mod_dir: PathBuf,
    /// Where the manifest lives.
    pub data_dir: PathBuf,
    pub api_url: String,
    pub site_url: String,
    /// Registry request budget per 60 second window.
    pub max_requests_per_minute: u32,
    /// Concurrent package pipelines.
    pub workers: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            game_version: DEFAULT_GAME_VERSION.to_string(),
            loader: DEFAULT_LOADER.to_string(),
            mod_dir: paths::default_mod_dir(),
            data_dir: paths::default_data_dir(),
            api_url: DEFAULT_API_URL.to_string(),
            site_url: DEFAULT_SITE_URL.to_string(),
            max_requests_per_minute: DEFAULT_MAX_REQUESTS,
            workers: DEFAULT_WORKERS,
        }
    }
}

impl Config {
    /// Load from the default location, falling back to defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but is not valid config TOML.
    pub fn load() -> Result<Self, EngineError> {
        match paths::config_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    /// Load from `path`, falling back to defaults if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or holds
    /// out-of-range values.
    pub fn load_from(path: &Path) -> Result<Self, EngineError> {
        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("No config at {}, using defaults", path.display());
                return Ok(Self::default());
            }
            Err(e) => return Err(e.into()),
        };

        let config: Self = toml::from_str(&content)
            .map_err(|e| EngineError::Config(format!("{}: {e}", path.display())))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), EngineError> {
        if self.max_requests_per_minute == 0 {
            return Err(EngineError::Config(
                "max_requests_per_minute must be at least 1".into(),
            ));
        }
        if self.workers == 0 {
            return Err(EngineError::Config("workers must be at least 1".into()));
        }
        if self.loader.trim().is_empty() || self.game_version.trim().is_empty() {
            return Err(EngineError::Config(
                "loader and game_version must not be empty".into(),
            ));
        }
        Ok(())
    }

    /// Manifest location under `data_dir`.
    pub fn manifest_path(&self) -> PathBuf {
        paths::manifest_path(&self.data_dir)
    }
}
