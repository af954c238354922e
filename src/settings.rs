//! Settings surface
//!
//! Persisted in the local area under `settings`. Stored fields are merged over the
//! defaults and numeric fields are clamped on every load and save.

use crate::error::{ApiError, StorageError};
use crate::store::DictionaryStore;
use crate::types::BackendId;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::info;

/// Key of the settings object in the local area
pub const SETTINGS_KEY: &str = "settings";

pub const MIN_UPDATE_INTERVAL_MS: u64 = 500;
pub const MAX_UPDATE_INTERVAL_MS: u64 = 10_000;
pub const MIN_CACHE_ENTRIES: usize = 100;
pub const MAX_CACHE_ENTRIES: usize = 10_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PanelPosition {
    #[default]
    Side,
    Bottom,
    Floating,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PanelTheme {
    #[default]
    Light,
    Dark,
    Auto,
}

/// User settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub backend: BackendId,
    /// Period of the fallback localization pass
    pub update_interval_ms: u64,
    pub max_cache_entries: usize,
    pub debug_mode: bool,
    pub auto_translate: bool,
    pub panel_position: PanelPosition,
    pub panel_theme: PanelTheme,
    pub auto_backup: bool,
    pub experimental: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            backend: BackendId::Local,
            update_interval_ms: 2000,
            max_cache_entries: 1000,
            debug_mode: false,
            auto_translate: true,
            panel_position: PanelPosition::default(),
            panel_theme: PanelTheme::default(),
            auto_backup: false,
            experimental: false,
        }
    }
}

impl Settings {
    /// Clamp numeric fields into their accepted ranges.
    pub fn clamped(mut self) -> Self {
        self.update_interval_ms = self
            .update_interval_ms
            .clamp(MIN_UPDATE_INTERVAL_MS, MAX_UPDATE_INTERVAL_MS);
        self.max_cache_entries = self
            .max_cache_entries
            .clamp(MIN_CACHE_ENTRIES, MAX_CACHE_ENTRIES);
        self
    }
}

/// Load settings; the backend field always reflects the store's active backend.
pub fn load_settings(store: &DictionaryStore) -> Result<Settings, ApiError> {
    let stored: Option<Settings> = store.platform().local_area().get_as(SETTINGS_KEY)?;
    let mut settings = stored.unwrap_or_default().clamped();
    settings.backend = store.backend()?;
    Ok(settings)
}

/// Save settings. A changed backend migrates the dictionary first; if the migration
/// fails nothing is saved.
pub fn save_settings(store: &DictionaryStore, settings: Settings) -> Result<Settings, ApiError> {
    let settings = settings.clamped();
    let active = store.backend()?;
    if settings.backend != active {
        store.migrate(active, settings.backend)?;
    }
    let value = serde_json::to_value(&settings).map_err(StorageError::from)?;
    store.platform().local_area().set(SETTINGS_KEY, value)?;
    info!(backend = %settings.backend, interval_ms = settings.update_interval_ms, "Settings saved");
    Ok(settings)
}

/// Restore defaults, keeping the active backend.
pub fn reset_settings(store: &DictionaryStore) -> Result<Settings, ApiError> {
    let settings = Settings {
        backend: store.backend()?,
        ..Settings::default()
    };
    save_settings(store, settings)
}

/// Pretty JSON with the settings, an RFC 3339 timestamp and the crate version.
pub fn export_settings(settings: &Settings) -> Result<String, ApiError> {
    let document: Value = json!({
        "settings": settings,
        "timestamp": Utc::now().to_rfc3339(),
        "version": env!("CARGO_PKG_VERSION"),
    });
    Ok(serde_json::to_string_pretty(&document).map_err(StorageError::from)?)
}
