use devprobe::core::http::AuthConfig;
use devprobe::presets::{
    JsonPresetStore, MemoryPresetStore, NewPreset, PresetError, PresetRepository, NAME_REQUIRED,
    URL_REQUIRED,
};
use std::fs;

fn sample(name: &str) -> NewPreset {
    NewPreset {
        method: "post".to_string(),
        request_body: " {\"a\":1} ".to_string(),
        expected_status: 201,
        auth: AuthConfig::bearer("t"),
        checks: vec!["status-code".to_string()],
        ..NewPreset::new(name, "https://api.example.test/things")
    }
}

#[test]
fn test_add_validates_name_then_url() {
    let store = MemoryPresetStore::new();

    let missing_name = store.add(NewPreset::new("  ", "")).unwrap_err();
    assert_eq!(missing_name.to_string(), NAME_REQUIRED);

    let missing_url = store.add(NewPreset::new("Things", " ")).unwrap_err();
    assert_eq!(missing_url.to_string(), URL_REQUIRED);

    assert!(store.list().unwrap().is_empty());
}

#[test]
fn test_add_normalizes_fields() {
    let store = MemoryPresetStore::new();
    let saved = store.add(sample(" Things ")).unwrap();

    assert_eq!(saved.name, "Things");
    assert_eq!(saved.method, "POST");
    assert_eq!(saved.request_body, "{\"a\":1}");
    assert!(saved.id > 0);
}

#[test]
fn test_ids_unique_and_increasing() {
    let store = MemoryPresetStore::new();
    let ids: Vec<i64> = (0..5)
        .map(|i| store.add(sample(&format!("p{}", i))).unwrap().id)
        .collect();

    for pair in ids.windows(2) {
        assert!(pair[1] > pair[0]);
    }
}

#[test]
fn test_get_and_remove() {
    let store = MemoryPresetStore::new();
    let first = store.add(sample("first")).unwrap();
    let second = store.add(sample("second")).unwrap();

    assert_eq!(store.get(second.id).unwrap(), second);

    let removed = store.remove(first.id).unwrap();
    assert_eq!(removed.name, "first");
    assert!(matches!(store.get(first.id), Err(PresetError::NotFound(_))));
    assert!(matches!(store.remove(first.id), Err(PresetError::NotFound(_))));
    assert_eq!(store.list().unwrap().len(), 1);
}

#[test]
fn test_saved_preset_to_request() {
    let store = MemoryPresetStore::new();
    let saved = store.add(sample("things")).unwrap();
    let request = saved.to_request();

    assert_eq!(request.url, "https://api.example.test/things");
    assert_eq!(request.method.as_deref(), Some("POST"));
    assert_eq!(request.body.as_deref(), Some("{\"a\":1}"));
    assert_eq!(request.expected_status, 201);
    assert_eq!(request.auth, AuthConfig::bearer("t"));
}

#[test]
fn test_json_store_persists_across_instances() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("presets.json");

    let saved = {
        let store = JsonPresetStore::new(&path);
        assert!(store.list().unwrap().is_empty());
        store.add(sample("persisted")).unwrap()
    };

    let reopened = JsonPresetStore::new(&path);
    assert_eq!(reopened.list().unwrap(), vec![saved.clone()]);

    let content = fs::read_to_string(&path).unwrap();
    assert!(content.contains("\"requestBody\""));
    assert!(content.contains("\"expectedStatus\": 201"));

    reopened.remove(saved.id).unwrap();
    assert!(JsonPresetStore::new(&path).list().unwrap().is_empty());
}

#[test]
fn test_json_store_corrupted_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("presets.json");
    fs::write(&path, "{ not an array").unwrap();

    let store = JsonPresetStore::new(&path);
    assert!(matches!(store.list(), Err(PresetError::Corrupted(_))));
}
