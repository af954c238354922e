use crate::integration::support::{add_text, engine, map, open_store, text_of};
use overlay::engine::EngineState;
use overlay::{BackendId, PassOutcome};
use tempfile::TempDir;

#[test]
fn empty_store_is_seeded_from_defaults() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir);
    let engine = engine(&store, r#"{"OK":"In Ordnung"}"#);
    let node = add_text(engine.document(), "button", "OK");

    assert!(matches!(engine.bootstrap(), PassOutcome::Completed(_)));
    assert_eq!(engine.state(), EngineState::Steady);
    assert_eq!(*engine.dictionary(), map(&[("OK", "In Ordnung")]));
    assert_eq!(store.load().unwrap(), map(&[("OK", "In Ordnung")]));
    assert_eq!(text_of(engine.document(), node), "In Ordnung");
}

#[test]
fn stored_dictionary_wins_over_defaults() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir);
    store.save(&map(&[("Save", "Speichern")])).unwrap();
    let engine = engine(&store, r#"{"translations":{"OK":"In Ordnung"}}"#);
    engine.bootstrap();
    assert_eq!(*engine.dictionary(), map(&[("Save", "Speichern")]));
}

#[test]
fn broken_default_asset_yields_empty_dictionary() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir);
    let engine = engine(&store, "not json");
    let node = add_text(engine.document(), "span", "OK");
    assert_eq!(engine.bootstrap().translated(), 0);
    assert!(engine.dictionary().is_empty());
    assert_eq!(text_of(engine.document(), node), "OK");
}

#[test]
fn store_failure_falls_back_to_defaults() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir);
    store.set_backend(BackendId::Synchronized).unwrap();
    // Corrupt the synchronized area's dictionary entry.
    std::fs::write(
        dir.path().join("sync.json"),
        r#"{"translations":["not","a","map"]}"#,
    )
    .unwrap();
    store.platform().sync_area().refresh_from_disk().unwrap();

    let engine = engine(&store, r#"{"OK":"In Ordnung"}"#);
    assert!(matches!(engine.bootstrap(), PassOutcome::Completed(_)));
    assert_eq!(*engine.dictionary(), map(&[("OK", "In Ordnung")]));
}
