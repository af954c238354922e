use crate::integration::support::{add_text, engine, map, open_store, text_of};
use overlay::platform::{AreaKind, StorageChange};
use overlay::store::TRANSLATIONS_KEY;
use tempfile::TempDir;

#[test]
fn second_pass_translates_nothing() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir);
    store
        .save(&map(&[("Work Items", "Arbeitselemente"), ("Boards", "Boards")]))
        .unwrap();
    let engine = engine(&store, "{}");
    let a = add_text(engine.document(), "a", "  Work Items  ");
    let b = add_text(engine.document(), "span", "Boards");
    let c = add_text(engine.document(), "p", "Work Items are great");

    assert_eq!(engine.bootstrap().translated(), 2);
    assert_eq!(engine.translate_document().translated(), 0);
    assert_eq!(text_of(engine.document(), a), "  Arbeitselemente  ");
    assert_eq!(text_of(engine.document(), b), "Boards");
    assert_eq!(text_of(engine.document(), c), "Work Items are great");
}

#[test]
fn identical_dictionary_notification_still_clears_memo() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir);
    // Identity entry: the node still matches after translation.
    store.save(&map(&[("Boards", "Boards")])).unwrap();
    let engine = engine(&store, "{}");
    let node = add_text(engine.document(), "span", "Boards");
    engine.bootstrap();
    assert!(engine.is_processed(node));

    let change = StorageChange {
        area: AreaKind::Local,
        keys: vec![TRANSLATIONS_KEY.to_string()],
    };
    let outcome = engine.handle_storage_change(&change).unwrap();
    // Re-examined and re-matched under the new version.
    assert_eq!(outcome.translated(), 1);
    assert!(engine.is_processed(node));
    assert_eq!(text_of(engine.document(), node), "Boards");
}

#[test]
fn nested_content_and_skipped_containers() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir);
    store.save(&map(&[("Cancel", "Abbrechen")])).unwrap();
    let engine = engine(&store, "{}");
    let (nested, scripted) = {
        let mut doc = engine.document().lock();
        let body = doc.body();
        let outer = doc.append_element(body, "div").unwrap();
        let inner = doc.append_element(outer, "button").unwrap();
        let nested = doc.append_text(inner, "\n  Cancel\n").unwrap();
        let script = doc.append_element(outer, "script").unwrap();
        let scripted = doc.append_text(script, "Cancel").unwrap();
        (nested, scripted)
    };
    engine.bootstrap();
    assert_eq!(text_of(engine.document(), nested), "\n  Abbrechen\n");
    assert_eq!(text_of(engine.document(), scripted), "Cancel");
}

#[test]
fn reload_failure_keeps_last_dictionary() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir);
    store.save(&map(&[("OK", "In Ordnung")])).unwrap();
    let engine = engine(&store, "{}");
    engine.bootstrap();

    std::fs::write(dir.path().join("local.json"), r#"{"translations":42}"#).unwrap();
    store.platform().local_area().refresh_from_disk().unwrap();

    assert!(engine.reload_dictionary().is_err());
    assert_eq!(*engine.dictionary(), map(&[("OK", "In Ordnung")]));
}
