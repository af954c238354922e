//! Core types shared by the dictionary store and the localization engine.

use crate::error::ApiError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// TranslationMap: trimmed source string -> target string
pub type TranslationMap = BTreeMap<String, String>;

/// Storage backend identifier
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendId {
    /// Small synchronized area (~100 KiB)
    #[serde(rename = "sync")]
    Synchronized,
    /// Larger local area (~10 MiB)
    #[default]
    Local,
    /// Embedded structured database
    #[serde(rename = "embedded")]
    EmbeddedDb,
}

impl BackendId {
    pub const ALL: [BackendId; 3] = [
        BackendId::Synchronized,
        BackendId::Local,
        BackendId::EmbeddedDb,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BackendId::Synchronized => "sync",
            BackendId::Local => "local",
            BackendId::EmbeddedDb => "embedded",
        }
    }
}

impl fmt::Display for BackendId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BackendId {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sync" | "synchronized" => Ok(BackendId::Synchronized),
            "local" => Ok(BackendId::Local),
            "embedded" | "embedded_db" | "embedded-db" => Ok(BackendId::EmbeddedDb),
            _ => Err(ApiError::InvalidBackend(s.to_string())),
        }
    }
}

/// Read-only snapshot of the active backend's usage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageInfo {
    pub backend: BackendId,
    pub count: usize,
    pub size_bytes: u64,
    pub size_formatted: String,
    pub limit: u64,
    /// Informational only; may exceed 100
    pub percent_used: f64,
}

/// Whitespace as a browser's `String.prototype.trim` sees it: the zero-width no-break
/// space counts, U+0085 does not.
pub fn is_text_whitespace(c: char) -> bool {
    c == '\u{feff}' || (c.is_whitespace() && c != '\u{85}')
}

/// Trim `text` with [`is_text_whitespace`].
pub fn trim_text(text: &str) -> &str {
    text.trim_matches(is_text_whitespace)
}

/// Insert a raw entry, trimming the source. Entries with an empty trimmed source are dropped.
///
/// Returns whether the entry was kept.
pub fn insert_normalized(map: &mut TranslationMap, source: &str, target: &str) -> bool {
    let key = trim_text(source);
    if key.is_empty() {
        return false;
    }
    map.insert(key.to_string(), target.to_string());
    true
}

/// Build a TranslationMap from a JSON object, keeping only string values under non-empty keys.
pub fn map_from_json_object(object: &serde_json::Map<String, serde_json::Value>) -> TranslationMap {
    let mut map = TranslationMap::new();
    for (source, value) in object {
        if let Some(target) = value.as_str() {
            insert_normalized(&mut map, source, target);
        }
    }
    map
}
