//! Import and export of the dictionary
//!
//! Export writes `{"translations": {...}, "languagePair": "..."}` pretty-printed. Import
//! accepts that shape or a bare translation map and validates the whole file before
//! anything is written.

use crate::error::{ApiError, StorageError};
use crate::store::DictionaryStore;
use crate::types::{map_from_json_object, TranslationMap};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::info;

/// Key of the language pair in the local area
pub const LANGUAGE_PAIR_KEY: &str = "language_pair";
pub const DEFAULT_LANGUAGE_PAIR: &str = "en-de";

/// On-disk export document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportDocument {
    pub translations: TranslationMap,
    pub language_pair: String,
}

/// A validated import
#[derive(Debug, Clone, PartialEq)]
pub struct ImportPayload {
    pub translations: TranslationMap,
    pub language_pair: String,
}

pub fn language_pair(store: &DictionaryStore) -> Result<String, ApiError> {
    let stored: Option<String> = store.platform().local_area().get_as(LANGUAGE_PAIR_KEY)?;
    Ok(stored.unwrap_or_else(|| DEFAULT_LANGUAGE_PAIR.to_string()))
}

pub fn set_language_pair(store: &DictionaryStore, pair: &str) -> Result<(), ApiError> {
    store
        .platform()
        .local_area()
        .set(LANGUAGE_PAIR_KEY, json!(pair))?;
    Ok(())
}

/// Serialize the active dictionary and language pair for export.
pub fn export_translations(store: &DictionaryStore) -> Result<String, ApiError> {
    let document = ExportDocument {
        translations: store.load()?,
        language_pair: language_pair(store)?,
    };
    let text = serde_json::to_string_pretty(&document).map_err(StorageError::from)?;
    info!(entries = document.translations.len(), "Exported dictionary");
    Ok(text)
}

/// Validate an import file without touching storage.
pub fn parse_import(text: &str) -> Result<ImportPayload, ApiError> {
    let value: Value = serde_json::from_str(text)
        .map_err(|e| ApiError::MalformedImport(format!("not valid JSON: {}", e)))?;
    let object = match value {
        Value::Object(object) => object,
        Value::Array(_) => {
            return Err(ApiError::MalformedImport(
                "expected a JSON object, found an array".to_string(),
            ))
        }
        _ => {
            return Err(ApiError::MalformedImport(
                "expected a JSON object".to_string(),
            ))
        }
    };

    let (translations, language_pair) = match object.get("translations") {
        Some(Value::Object(inner)) => {
            let pair = object
                .get("languagePair")
                .and_then(Value::as_str)
                .filter(|p| !p.trim().is_empty())
                .unwrap_or(DEFAULT_LANGUAGE_PAIR);
            (map_from_json_object(inner), pair.to_string())
        }
        _ => (map_from_json_object(&object), DEFAULT_LANGUAGE_PAIR.to_string()),
    };

    if translations.is_empty() {
        return Err(ApiError::MalformedImport(
            "no translations found".to_string(),
        ));
    }

    Ok(ImportPayload {
        translations,
        language_pair,
    })
}

/// Replace the active dictionary with the file's content and store its language pair.
pub fn import_translations(
    store: &DictionaryStore,
    text: &str,
) -> Result<ImportPayload, ApiError> {
    let payload = parse_import(text)?;
    store.save(&payload.translations)?;
    set_language_pair(store, &payload.language_pair)?;
    info!(
        entries = payload.translations.len(),
        language_pair = %payload.language_pair,
        "Imported dictionary"
    );
    Ok(payload)
}
