use crate::integration::support::{map, open_store};
use overlay::settings::{save_settings, Settings};
use overlay::store::serialized_size;
use overlay::{ApiError, BackendId, TranslationMap};
use proptest::prelude::*;
use tempfile::TempDir;

fn entries() -> impl Strategy<Value = TranslationMap> {
    prop::collection::btree_map("[A-Za-z][A-Za-z0-9 äöüß]{0,20}", "\\PC{0,30}", 0..40)
        .prop_map(|raw| {
            raw.into_iter()
                .filter(|(k, _)| !k.trim().is_empty())
                .map(|(k, v)| (k.trim().to_string(), v))
                .collect()
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn load_returns_what_was_saved(m in entries(), backend in prop::sample::select(BackendId::ALL.to_vec())) {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir);
        store.set_backend(backend).unwrap();
        store.save(&m).unwrap();
        prop_assert_eq!(store.load().unwrap(), m);
    }
}

#[test]
fn oversized_save_is_rejected_and_prior_data_kept() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir);
    store.set_backend(BackendId::Synchronized).unwrap();
    let prior = map(&[("Save", "Speichern")]);
    store.save(&prior).unwrap();

    let mut big = TranslationMap::new();
    for i in 0..2000 {
        big.insert(format!("Source string number {}", i), "x".repeat(40));
    }
    let size = serialized_size(&big).unwrap();
    assert!(size > BackendId::Synchronized.capacity_bytes());

    match store.save(&big) {
        Err(ApiError::QuotaExceeded {
            size: reported,
            limit,
            ..
        }) => {
            assert_eq!(reported, size);
            assert_eq!(limit, 102_400);
        }
        other => panic!("expected QuotaExceeded, got {:?}", other),
    }
    assert_eq!(store.load().unwrap(), prior);

    // The same map fits the embedded database.
    store.set_backend(BackendId::EmbeddedDb).unwrap();
    store.save(&big).unwrap();
    assert_eq!(store.load().unwrap().len(), 2000);
}

#[test]
fn empty_backends_load_as_empty_maps() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir);
    for backend in BackendId::ALL {
        assert!(store.load_from(backend).unwrap().is_empty());
    }
}

#[test]
fn info_reports_active_backend_usage() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir);
    store.save(&map(&[("OK", "In Ordnung")])).unwrap();
    let info = store.info().unwrap();
    assert_eq!(info.backend, BackendId::Local);
    assert_eq!(info.count, 1);
    assert_eq!(info.size_bytes, r#"{"OK":"In Ordnung"}"#.len() as u64);
    assert_eq!(info.size_formatted, "0.02 KB");
    assert_eq!(info.limit, 10 * 1024 * 1024);
}

/// `{"k":"vvv…"}` whose compact encoding is exactly `size` bytes.
fn map_of_size(size: u64) -> TranslationMap {
    let value = "v".repeat(size as usize - r#"{"k":""}"#.len());
    map(&[("k", value.as_str())])
}

#[test]
fn map_at_exact_capacity_round_trips_on_capped_backends() {
    for backend in [BackendId::Synchronized, BackendId::Local] {
        let dir = TempDir::new().unwrap();
        let store = open_store(&dir);
        store.set_backend(backend).unwrap();
        // Metadata shares the local area with the dictionary.
        let settings = Settings {
            backend,
            ..Settings::default()
        };
        save_settings(&store, settings).unwrap();

        let full = map_of_size(backend.capacity_bytes());
        assert_eq!(serialized_size(&full).unwrap(), backend.capacity_bytes());
        store.save(&full).unwrap();
        assert_eq!(store.load().unwrap(), full);

        let over = map_of_size(backend.capacity_bytes() + 1);
        assert!(matches!(
            store.save(&over),
            Err(ApiError::QuotaExceeded { .. })
        ));
        assert_eq!(store.load().unwrap(), full);
    }
}
