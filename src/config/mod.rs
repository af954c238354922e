//! Configuration
//!
//! Layered with the `config` crate: built-in defaults, then the global config file, then an
//! explicit file, then `OVERLAY__*` environment variables (highest).

mod facade;
mod merge;
mod paths;
mod sources;

pub use facade::ConfigLoader;
pub use paths::xdg_root as xdg;

use crate::defaults::DefaultSource;
use crate::error::ApiError;
use crate::logging::LoggingConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub defaults: DefaultsConfig,
    #[serde(default)]
    pub watch: WatchConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Where the storage areas and the embedded database live
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    /// None means `$XDG_DATA_HOME/overlay`
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
}

impl StorageConfig {
    pub fn resolve_data_dir(&self) -> Result<PathBuf, ApiError> {
        match &self.data_dir {
            Some(dir) if !dir.as_os_str().is_empty() => Ok(dir.clone()),
            _ => xdg::data_dir(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Replacement for the bundled default dictionary
    #[serde(default)]
    pub asset_path: Option<PathBuf>,
}

impl DefaultsConfig {
    pub fn source(&self) -> DefaultSource {
        match &self.asset_path {
            Some(path) => DefaultSource::File(path.clone()),
            None => DefaultSource::Bundled,
        }
    }
}

/// Cross-process change detection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchConfig {
    #[serde(default = "default_true")]
    pub external_changes: bool,
}

fn default_true() -> bool {
    true
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            external_changes: default_true(),
        }
    }
}
