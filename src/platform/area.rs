//! File-backed key/value storage areas.
//!
//! Each area is one JSON object on disk. Writes read the current file, apply the
//! mutation, enforce the area's platform quota on the encoded result and replace the
//! file through a temp file + rename. The quota here is the platform's own post-hoc
//! limit on the whole area; the dictionary store performs its own pre-write size check.

use super::changes::{AreaKind, ChangeHub, StorageChange};
use crate::error::StorageError;
use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// A persistent key/value area
#[derive(Debug)]
pub struct StorageArea {
    kind: AreaKind,
    path: PathBuf,
    quota_bytes: u64,
    hub: ChangeHub,
    /// Content as last written or observed by this process
    known: Mutex<Map<String, Value>>,
}

impl StorageArea {
    /// Open (or create on first write) the area file for `kind` inside `dir`.
    pub fn open(
        kind: AreaKind,
        dir: &Path,
        quota_bytes: u64,
        hub: ChangeHub,
    ) -> Result<Self, StorageError> {
        std::fs::create_dir_all(dir)?;
        let path = dir.join(kind.file_name());
        let known = read_area_file(&path)?;
        debug!(area = kind.as_str(), path = %path.display(), keys = known.len(), "Opened storage area");
        Ok(Self {
            kind,
            path,
            quota_bytes,
            hub,
            known: Mutex::new(known),
        })
    }

    pub fn kind(&self) -> AreaKind {
        self.kind
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn snapshot(&self) -> Result<Map<String, Value>, StorageError> {
        let _guard = self.known.lock();
        read_area_file(&self.path)
    }

    pub fn get(&self, key: &str) -> Result<Option<Value>, StorageError> {
        Ok(self.snapshot()?.remove(key))
    }

    /// Read and deserialize a key. A present but undecodable value is reported as corrupt.
    pub fn get_as<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StorageError> {
        match self.get(key)? {
            Some(value) => serde_json::from_value(value)
                .map(Some)
                .map_err(|e| StorageError::Corrupt {
                    location: format!("{}:{}", self.kind.as_str(), key),
                    reason: e.to_string(),
                }),
            None => Ok(None),
        }
    }

    pub fn set(&self, key: &str, value: Value) -> Result<(), StorageError> {
        self.write_with(|current| match current.get(key) {
            Some(existing) if *existing == value => Vec::new(),
            _ => {
                current.insert(key.to_string(), value);
                vec![key.to_string()]
            }
        })
    }

    /// Re-read the file and report keys that differ from what this process last saw.
    ///
    /// Used when another process rewrote the area; publishes the change itself.
    pub fn refresh_from_disk(&self) -> Result<Vec<String>, StorageError> {
        let mut known = self.known.lock();
        let on_disk = read_area_file(&self.path)?;
        let mut changed: Vec<String> = on_disk
            .iter()
            .filter(|(key, value)| known.get(*key) != Some(*value))
            .map(|(key, _)| key.clone())
            .collect();
        changed.extend(
            known
                .keys()
                .filter(|key| !on_disk.contains_key(*key))
                .cloned(),
        );
        *known = on_disk;
        drop(known);

        self.hub.publish(StorageChange {
            area: self.kind,
            keys: changed.clone(),
        });
        Ok(changed)
    }

    fn write_with<F>(&self, mutate: F) -> Result<(), StorageError>
    where
        F: FnOnce(&mut Map<String, Value>) -> Vec<String>,
    {
        let mut known = self.known.lock();
        let mut current = read_area_file(&self.path)?;
        let changed = mutate(&mut current);
        if changed.is_empty() {
            return Ok(());
        }

        let encoded = serde_json::to_vec(&current)?;
        let size = encoded.len() as u64;
        if size > self.quota_bytes {
            warn!(
                area = self.kind.as_str(),
                size,
                quota = self.quota_bytes,
                "Platform quota exceeded, write rejected"
            );
            return Err(StorageError::PlatformQuota {
                area: self.kind.as_str().to_string(),
                size,
                quota: self.quota_bytes,
            });
        }

        let tmp_path = self.path.with_extension("json.tmp");
        std::fs::write(&tmp_path, &encoded)?;
        std::fs::rename(&tmp_path, &self.path)?;
        *known = current;
        drop(known);

        self.hub.publish(StorageChange {
            area: self.kind,
            keys: changed,
        });
        Ok(())
    }
}

fn read_area_file(path: &Path) -> Result<Map<String, Value>, StorageError> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Map::new()),
        Err(e) => return Err(StorageError::IoError(e)),
    };
    if content.trim().is_empty() {
        return Ok(Map::new());
    }
    match serde_json::from_str::<Value>(&content)? {
        Value::Object(map) => Ok(map),
        other => Err(StorageError::Corrupt {
            location: path.display().to_string(),
            reason: format!("expected a JSON object, found {}", json_kind(&other)),
        }),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
