//! Embedded database backend (sled)
//!
//! Row layout in the `translations` tree:
//! - `row:` + id (u64 big-endian) -> JSON `{"id", "source", "target"}`
//! - `src:` + source bytes -> id (u64 big-endian), the unique source index
//!
//! A save replaces every row in one atomic batch, so readers see either the old map or
//! the new one, never a mix.

use crate::error::StorageError;
use crate::types::TranslationMap;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{debug, info};

const TREE_NAME: &str = "translations";
const ROW_PREFIX: &[u8] = b"row:";
const SOURCE_PREFIX: &[u8] = b"src:";

#[derive(Debug, Clone, Serialize, Deserialize)]
struct TranslationRow {
    id: u64,
    source: String,
    target: String,
}

fn row_key(id: u64) -> Vec<u8> {
    let mut key = ROW_PREFIX.to_vec();
    key.extend_from_slice(&id.to_be_bytes());
    key
}

fn source_key(source: &str) -> Vec<u8> {
    let mut key = SOURCE_PREFIX.to_vec();
    key.extend_from_slice(source.as_bytes());
    key
}

/// Lazily opened, process-lifetime connection to the embedded database
#[derive(Debug)]
pub struct EmbeddedDb {
    path: PathBuf,
    connection: Mutex<Option<sled::Tree>>,
}

impl EmbeddedDb {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            connection: Mutex::new(None),
        }
    }

    /// Open the database on first use and reuse the handle afterwards.
    fn tree(&self) -> Result<sled::Tree, StorageError> {
        let mut connection = self.connection.lock();
        if let Some(tree) = connection.as_ref() {
            return Ok(tree.clone());
        }
        let db = sled::open(&self.path)?;
        let tree = db.open_tree(TREE_NAME)?;
        info!(path = %self.path.display(), "Opened embedded dictionary database");
        *connection = Some(tree.clone());
        Ok(tree)
    }

    /// Clear-then-insert-all in a single atomic batch.
    pub fn save(&self, map: &TranslationMap) -> Result<(), StorageError> {
        let tree = self.tree()?;
        let mut batch = sled::Batch::default();

        for existing in tree.iter().keys() {
            batch.remove(existing?);
        }

        for (id, (source, target)) in map.iter().enumerate() {
            let id = id as u64;
            let row = TranslationRow {
                id,
                source: source.clone(),
                target: target.clone(),
            };
            batch.insert(row_key(id), serde_json::to_vec(&row)?);
            batch.insert(source_key(source), id.to_be_bytes().to_vec());
        }

        tree.apply_batch(batch)?;
        tree.flush()?;
        debug!(entries = map.len(), "Saved dictionary to embedded database");
        Ok(())
    }

    /// Read every row and re-key by source.
    pub fn load(&self) -> Result<TranslationMap, StorageError> {
        let tree = self.tree()?;
        let mut map = TranslationMap::new();
        for entry in tree.scan_prefix(ROW_PREFIX) {
            let (key, value) = entry?;
            let row: TranslationRow =
                serde_json::from_slice(&value).map_err(|e| StorageError::Corrupt {
                    location: format!("{}:{}", self.path.display(), String::from_utf8_lossy(&key)),
                    reason: e.to_string(),
                })?;
            map.insert(row.source, row.target);
        }
        debug!(entries = map.len(), "Loaded dictionary from embedded database");
        Ok(map)
    }

    /// Look up a single target through the source index.
    pub fn lookup(&self, source: &str) -> Result<Option<String>, StorageError> {
        let tree = self.tree()?;
        let Some(id) = tree.get(source_key(source))? else {
            return Ok(None);
        };
        let id_bytes = <[u8; 8]>::try_from(&id[..]).map_err(|_| StorageError::Corrupt {
            location: format!("{}:src", self.path.display()),
            reason: format!("index entry for {:?} is not a row id", source),
        })?;
        match tree.get(row_key(u64::from_be_bytes(id_bytes)))? {
            Some(value) => {
                let row: TranslationRow = serde_json::from_slice(&value)?;
                Ok(Some(row.target))
            }
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample_map() -> TranslationMap {
        let mut map = TranslationMap::new();
        map.insert("Work Items".to_string(), "Arbeitselemente".to_string());
        map.insert("Boards".to_string(), "Boards".to_string());
        map.insert("Save".to_string(), "Speichern".to_string());
        map
    }

    #[test]
    fn test_empty_database_loads_empty_map() {
        let dir = TempDir::new().unwrap();
        let db = EmbeddedDb::new(dir.path().join("dict.sled"));
        assert!(db.load().unwrap().is_empty());
    }

    #[test]
    fn test_save_replaces_previous_rows() {
        let dir = TempDir::new().unwrap();
        let db = EmbeddedDb::new(dir.path().join("dict.sled"));
        db.save(&sample_map()).unwrap();

        let mut smaller = TranslationMap::new();
        smaller.insert("OK".to_string(), "In Ordnung".to_string());
        db.save(&smaller).unwrap();

        assert_eq!(db.load().unwrap(), smaller);
        assert_eq!(db.lookup("Save").unwrap(), None);
        assert_eq!(db.lookup("OK").unwrap().as_deref(), Some("In Ordnung"));
    }

    #[test]
    fn test_connection_is_reused() {
        let dir = TempDir::new().unwrap();
        let db = EmbeddedDb::new(dir.path().join("dict.sled"));
        db.save(&sample_map()).unwrap();
        // A second open of the same path in-process would fail on the file lock.
        assert_eq!(db.load().unwrap(), sample_map());
        db.save(&TranslationMap::new()).unwrap();
        assert!(db.load().unwrap().is_empty());
    }
}
