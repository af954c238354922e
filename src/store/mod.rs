//! Dictionary Store
//!
//! Persists the translation map in whichever backend is active and reports usage.
//! The active backend selector lives in the local area regardless of where the
//! dictionary itself is stored, so it is always readable.

mod backend;
mod embedded;

pub use backend::{serialized_size, Backend, TRANSLATIONS_KEY};
pub use embedded::EmbeddedDb;

use crate::error::ApiError;
use crate::platform::Platform;
use crate::types::{BackendId, StorageInfo, TranslationMap};
use parking_lot::RwLock;
use serde_json::json;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Key of the backend selector in the local area
pub const BACKEND_KEY: &str = "backend";

const EMBEDDED_DB_DIR: &str = "dictionary.sled";
const SELF_TEST_KEY: &str = "__overlay_self_test__";

/// Dictionary store: one instance per host context, shared by reference
#[derive(Debug)]
pub struct DictionaryStore {
    platform: Platform,
    embedded: EmbeddedDb,
    active: RwLock<Option<BackendId>>,
}

impl DictionaryStore {
    pub fn new(platform: Platform, embedded_path: PathBuf) -> Self {
        Self {
            platform,
            embedded: EmbeddedDb::new(embedded_path),
            active: RwLock::new(None),
        }
    }

    /// Open the store with all backends rooted at `data_dir`.
    pub fn open(data_dir: &Path) -> Result<Self, ApiError> {
        let platform = Platform::open(data_dir)?;
        Ok(Self::new(platform, data_dir.join(EMBEDDED_DB_DIR)))
    }

    pub fn platform(&self) -> &Platform {
        &self.platform
    }

    /// Read the persisted backend selector, defaulting to local. Safe to call repeatedly;
    /// every call re-reads the selector.
    pub fn init(&self) -> Result<BackendId, ApiError> {
        let stored: Option<String> = self.platform.local_area().get_as(BACKEND_KEY)?;
        let backend = match stored {
            Some(raw) => raw.parse::<BackendId>().unwrap_or_else(|_| {
                warn!(selector = %raw, "Unknown stored backend selector, using local");
                BackendId::default()
            }),
            None => BackendId::default(),
        };
        *self.active.write() = Some(backend);
        info!(backend = %backend, "Dictionary store initialized");
        Ok(backend)
    }

    /// The active backend, initializing on first use
    pub fn backend(&self) -> Result<BackendId, ApiError> {
        if let Some(backend) = *self.active.read() {
            return Ok(backend);
        }
        self.init()
    }

    /// Persist a new selector. Does not move any data; see [`DictionaryStore::migrate`].
    pub fn set_backend(&self, backend: BackendId) -> Result<(), ApiError> {
        self.platform
            .local_area()
            .set(BACKEND_KEY, json!(backend.as_str()))?;
        *self.active.write() = Some(backend);
        info!(backend = %backend, "Active backend changed");
        Ok(())
    }

    /// Parse and persist a selector given by name.
    pub fn select_backend(&self, id: &str) -> Result<BackendId, ApiError> {
        let backend: BackendId = id.parse()?;
        self.set_backend(backend)?;
        Ok(backend)
    }

    fn resolve(&self, backend: BackendId) -> Backend<'_> {
        match backend {
            BackendId::Synchronized => Backend::Synchronized(self.platform.sync_area()),
            BackendId::Local => Backend::Local(self.platform.local_area()),
            BackendId::EmbeddedDb => Backend::EmbeddedDb(&self.embedded),
        }
    }

    pub fn save(&self, map: &TranslationMap) -> Result<(), ApiError> {
        let backend = self.backend()?;
        self.save_to(backend, map)
    }

    pub fn load(&self) -> Result<TranslationMap, ApiError> {
        let backend = self.backend()?;
        self.load_from(backend)
    }

    pub fn save_to(&self, backend: BackendId, map: &TranslationMap) -> Result<(), ApiError> {
        self.resolve(backend).save(map)
    }

    pub fn load_from(&self, backend: BackendId) -> Result<TranslationMap, ApiError> {
        self.resolve(backend).load()
    }

    /// Copy the dictionary from `from` to `to`, then make `to` active.
    ///
    /// The selector only changes after the copy succeeded.
    pub fn migrate(&self, from: BackendId, to: BackendId) -> Result<TranslationMap, ApiError> {
        info!(from = %from, to = %to, "Migrating dictionary");
        let map = self.load_from(from)?;
        if let Err(e) = self.save_to(to, &map) {
            warn!(from = %from, to = %to, error = %e, "Migration aborted, backend unchanged");
            return Err(e);
        }
        self.set_backend(to)?;
        info!(from = %from, to = %to, entries = map.len(), "Migration complete");
        Ok(map)
    }

    /// Usage of the active backend
    pub fn info(&self) -> Result<StorageInfo, ApiError> {
        let backend = self.backend()?;
        let map = self.load_from(backend)?;
        let size_bytes = serialized_size(&map)?;
        let limit = backend.capacity_bytes();
        let percent = size_bytes as f64 / limit as f64 * 100.0;
        Ok(StorageInfo {
            backend,
            count: map.len(),
            size_bytes,
            size_formatted: backend.format_size(size_bytes),
            limit,
            percent_used: (percent * 10.0).round() / 10.0,
        })
    }

    /// Round-trip a probe entry through the active backend and restore the original map.
    pub fn self_test(&self) -> Result<bool, ApiError> {
        let original = self.load()?;
        let mut probe = original.clone();
        probe.insert(SELF_TEST_KEY.to_string(), "ok".to_string());
        self.save(&probe)?;
        let loaded = self.load();
        self.save(&original)?;
        let passed = loaded?.get(SELF_TEST_KEY).map(String::as_str) == Some("ok");
        info!(backend = %self.backend()?, passed, "Storage self-test");
        Ok(passed)
    }
}
