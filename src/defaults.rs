//! Built-in default dictionary
//!
//! Seeds an empty store. Accepts `{"translations": {...}}` or a bare `{source: target}`
//! object. Loading is best-effort: any failure is logged and yields an empty map.

use crate::error::{ApiError, StorageError};
use crate::store::DictionaryStore;
use crate::types::{map_from_json_object, TranslationMap};
use serde_json::Value;
use std::path::PathBuf;
use tracing::{error, info};

/// The dictionary asset compiled into the binary
pub const BUNDLED_DEFAULTS: &str = include_str!("../assets/default-translations.json");

/// Where the default dictionary comes from
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DefaultSource {
    #[default]
    Bundled,
    File(PathBuf),
    Inline(String),
}

/// Parse a default dictionary document in either accepted shape.
pub fn parse_default_dictionary(text: &str) -> Result<TranslationMap, StorageError> {
    let value: Value = serde_json::from_str(text)?;
    let Value::Object(object) = value else {
        return Err(StorageError::Corrupt {
            location: "default dictionary".to_string(),
            reason: "expected a JSON object".to_string(),
        });
    };
    match object.get("translations") {
        Some(Value::Object(inner)) => Ok(map_from_json_object(inner)),
        _ => Ok(map_from_json_object(&object)),
    }
}

/// Load the default dictionary; never fails.
pub fn load_default_dictionary(source: &DefaultSource) -> TranslationMap {
    let text = match source {
        DefaultSource::Bundled => Ok(BUNDLED_DEFAULTS.to_string()),
        DefaultSource::Inline(text) => Ok(text.clone()),
        DefaultSource::File(path) => std::fs::read_to_string(path).map_err(StorageError::from),
    };
    match text.and_then(|t| parse_default_dictionary(&t)) {
        Ok(map) => {
            info!(entries = map.len(), source = ?source_label(source), "Default dictionary loaded");
            map
        }
        Err(e) => {
            error!(source = ?source_label(source), error = %e, "Failed to load default dictionary");
            TranslationMap::new()
        }
    }
}

/// Overwrite the active backend's dictionary with the default dictionary.
///
/// An empty default dictionary (missing or broken asset) is refused rather than
/// written, so a reset never wipes the store.
pub fn reset_dictionary(
    store: &DictionaryStore,
    source: &DefaultSource,
) -> Result<TranslationMap, ApiError> {
    let defaults = load_default_dictionary(source);
    if defaults.is_empty() {
        return Err(ApiError::ConfigError(format!(
            "Default dictionary from {} is empty, nothing restored",
            source_label(source)
        )));
    }
    store.save(&defaults)?;
    info!(backend = %store.backend()?, entries = defaults.len(), "Default dictionary restored");
    Ok(defaults)
}

fn source_label(source: &DefaultSource) -> String {
    match source {
        DefaultSource::Bundled => "bundled".to_string(),
        DefaultSource::File(path) => path.display().to_string(),
        DefaultSource::Inline(_) => "inline".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bundled_defaults_parse() {
        let map = load_default_dictionary(&DefaultSource::Bundled);
        assert_eq!(map.get("Work Items").map(String::as_str), Some("Arbeitselemente"));
        assert_eq!(map.get("OK").map(String::as_str), Some("In Ordnung"));
    }

    #[test]
    fn test_wrapped_and_bare_shapes() {
        let wrapped = parse_default_dictionary(r#"{"translations":{"OK":"In Ordnung"}}"#).unwrap();
        let bare = parse_default_dictionary(r#"{"OK":"In Ordnung"}"#).unwrap();
        assert_eq!(wrapped, bare);
        assert_eq!(wrapped.len(), 1);
    }

    #[test]
    fn test_missing_file_yields_empty_map() {
        let map = load_default_dictionary(&DefaultSource::File(PathBuf::from(
            "/nonexistent/overlay/defaults.json",
        )));
        assert!(map.is_empty());
    }

    #[test]
    fn test_reset_dictionary_replaces_stored_map() {
        let dir = tempfile::TempDir::new().unwrap();
        let store = DictionaryStore::open(dir.path()).unwrap();
        let mut custom = TranslationMap::new();
        custom.insert("Custom".to_string(), "Eigen".to_string());
        store.save(&custom).unwrap();

        let source = DefaultSource::Inline(r#"{"OK":"In Ordnung"}"#.to_string());
        let restored = reset_dictionary(&store, &source).unwrap();
        assert_eq!(restored.len(), 1);
        assert_eq!(store.load().unwrap(), restored);
        assert!(store.load().unwrap().get("Custom").is_none());
    }

    #[test]
    fn test_reset_dictionary_refuses_empty_defaults() {
        let dir = tempfile::TempDir::new().unwrap();
        let store = DictionaryStore::open(dir.path()).unwrap();
        let mut custom = TranslationMap::new();
        custom.insert("Custom".to_string(), "Eigen".to_string());
        store.save(&custom).unwrap();

        let broken = DefaultSource::Inline("not json".to_string());
        assert!(matches!(
            reset_dictionary(&store, &broken),
            Err(ApiError::ConfigError(_))
        ));
        assert_eq!(store.load().unwrap(), custom);
    }

    #[test]
    fn test_array_is_rejected() {
        assert!(parse_default_dictionary("[]").is_err());
        assert!(load_default_dictionary(&DefaultSource::Inline("[]".to_string())).is_empty());
    }
}
