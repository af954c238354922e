use crate::integration::support::{map, open_store};
use overlay::transfer::{export_translations, import_translations, language_pair};
use overlay::ApiError;
use tempfile::TempDir;

#[test]
fn import_sets_dictionary_and_language_pair() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir);
    import_translations(
        &store,
        r#"{"translations":{"Save":"Speichern"},"languagePair":"en-de"}"#,
    )
    .unwrap();
    assert_eq!(
        store.load().unwrap().get("Save").map(String::as_str),
        Some("Speichern")
    );
    assert_eq!(language_pair(&store).unwrap(), "en-de");
}

#[test]
fn malformed_import_writes_nothing() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir);
    store.save(&map(&[("OK", "In Ordnung")])).unwrap();
    let result = import_translations(&store, r#"[{"Save":"Speichern"}]"#);
    assert!(matches!(result, Err(ApiError::MalformedImport(_))));
    assert_eq!(store.load().unwrap(), map(&[("OK", "In Ordnung")]));
}

#[test]
fn export_then_import_into_fresh_store() {
    let source_dir = TempDir::new().unwrap();
    let source = open_store(&source_dir);
    source
        .save(&map(&[("Work Items", "Arbeitselemente"), ("OK", "In Ordnung")]))
        .unwrap();
    let exported = export_translations(&source).unwrap();
    let value: serde_json::Value = serde_json::from_str(&exported).unwrap();
    assert_eq!(value["languagePair"], "en-de");

    let target_dir = TempDir::new().unwrap();
    let target = open_store(&target_dir);
    let payload = import_translations(&target, &exported).unwrap();
    assert_eq!(payload.translations.len(), 2);
    assert_eq!(target.load().unwrap(), source.load().unwrap());
}
