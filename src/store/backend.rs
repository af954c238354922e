//! The three dictionary backends as one closed variant.

use super::embedded::EmbeddedDb;
use crate::error::{ApiError, StorageError};
use crate::platform::StorageArea;
use crate::types::{BackendId, TranslationMap};
use serde_json::Value;
use tracing::{debug, warn};

/// Key holding the dictionary inside the sync and local areas
pub const TRANSLATIONS_KEY: &str = "translations";

const KIB: u64 = 1024;
const MIB: u64 = 1024 * KIB;

impl BackendId {
    /// Capacity used for quota checks (sync, local) and usage reporting (all).
    ///
    /// The embedded database has no real limit; its value is symbolic.
    pub fn capacity_bytes(&self) -> u64 {
        match self {
            BackendId::Synchronized => 100 * KIB,
            BackendId::Local => 10 * MIB,
            BackendId::EmbeddedDb => 1024 * MIB,
        }
    }

    pub fn enforces_quota(&self) -> bool {
        !matches!(self, BackendId::EmbeddedDb)
    }

    /// Human-readable size in the unit used for this backend
    pub fn format_size(&self, size_bytes: u64) -> String {
        match self {
            BackendId::Synchronized | BackendId::Local => {
                format!("{:.2} KB", size_bytes as f64 / KIB as f64)
            }
            BackendId::EmbeddedDb => format!("{:.2} MB", size_bytes as f64 / MIB as f64),
        }
    }
}

/// Byte size of the compact JSON encoding of `map`
pub fn serialized_size(map: &TranslationMap) -> Result<u64, StorageError> {
    Ok(serde_json::to_vec(map)?.len() as u64)
}

/// A resolved backend
pub enum Backend<'a> {
    Synchronized(&'a StorageArea),
    Local(&'a StorageArea),
    EmbeddedDb(&'a EmbeddedDb),
}

impl Backend<'_> {
    pub fn id(&self) -> BackendId {
        match self {
            Backend::Synchronized(_) => BackendId::Synchronized,
            Backend::Local(_) => BackendId::Local,
            Backend::EmbeddedDb(_) => BackendId::EmbeddedDb,
        }
    }

    pub fn save(&self, map: &TranslationMap) -> Result<(), ApiError> {
        let id = self.id();
        let size = serialized_size(map)?;
        match self {
            Backend::Synchronized(area) | Backend::Local(area) => {
                let limit = id.capacity_bytes();
                if size > limit {
                    warn!(backend = %id, size, limit, "Dictionary exceeds backend capacity");
                    return Err(ApiError::QuotaExceeded {
                        backend: id.to_string(),
                        size,
                        limit,
                    });
                }
                // Atomicity of the area write is up to the platform.
                area.set(TRANSLATIONS_KEY, serde_json::to_value(map).map_err(StorageError::from)?)?;
            }
            Backend::EmbeddedDb(db) => db.save(map)?,
        }
        debug!(backend = %id, entries = map.len(), size, "Saved dictionary");
        Ok(())
    }

    /// Absence of stored data yields an empty map.
    pub fn load(&self) -> Result<TranslationMap, ApiError> {
        let map = match self {
            Backend::Synchronized(area) | Backend::Local(area) => {
                match area.get(TRANSLATIONS_KEY)? {
                    None | Some(Value::Null) => TranslationMap::new(),
                    Some(value) => serde_json::from_value(value).map_err(|e| {
                        StorageError::Corrupt {
                            location: format!("{}:{}", area.kind().as_str(), TRANSLATIONS_KEY),
                            reason: e.to_string(),
                        }
                    })?,
                }
            }
            Backend::EmbeddedDb(db) => db.load()?,
        };
        debug!(backend = %self.id(), entries = map.len(), "Loaded dictionary");
        Ok(map)
    }
}
