use crate::integration::support::{map, open_store};
use overlay::{ApiError, BackendId, TranslationMap};
use tempfile::TempDir;

#[test]
fn migrate_moves_data_and_switches_backend() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir);
    let original = map(&[("Work Items", "Arbeitselemente"), ("Save", "Speichern")]);
    store.save(&original).unwrap();

    let migrated = store
        .migrate(BackendId::Local, BackendId::EmbeddedDb)
        .unwrap();
    assert_eq!(migrated, original);
    assert_eq!(store.backend().unwrap(), BackendId::EmbeddedDb);
    assert_eq!(store.load().unwrap(), original);

    // The selector is persisted; a fresh handle sees it without touching the database.
    assert_eq!(open_store(&dir).init().unwrap(), BackendId::EmbeddedDb);

    store
        .migrate(BackendId::EmbeddedDb, BackendId::Synchronized)
        .unwrap();
    assert_eq!(store.backend().unwrap(), BackendId::Synchronized);
    assert_eq!(store.load().unwrap(), original);
}

#[test]
fn failed_migration_leaves_selector_unchanged() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir);
    store.set_backend(BackendId::EmbeddedDb).unwrap();
    let mut big = TranslationMap::new();
    for i in 0..3000 {
        big.insert(format!("entry {}", i), "y".repeat(50));
    }
    store.save(&big).unwrap();

    let result = store.migrate(BackendId::EmbeddedDb, BackendId::Synchronized);
    assert!(matches!(result, Err(ApiError::QuotaExceeded { .. })));
    assert_eq!(store.backend().unwrap(), BackendId::EmbeddedDb);
    assert_eq!(open_store(&dir).init().unwrap(), BackendId::EmbeddedDb);
    assert!(store.load_from(BackendId::Synchronized).unwrap().is_empty());
}

#[test]
fn set_backend_does_not_move_data() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir);
    store.save(&map(&[("OK", "In Ordnung")])).unwrap();
    store.set_backend(BackendId::Synchronized).unwrap();
    assert!(store.load().unwrap().is_empty());
    assert_eq!(store.load_from(BackendId::Local).unwrap().len(), 1);
}
