//! Browser tests for the storage backends
#![cfg(target_arch = "wasm32")]

use text_util::{
    BackendKind, ItemManager, ItemStore, LocalStorage, StorageBackend, STORAGE_KEY,
};
use std::rc::Rc;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

fn clear_local_storage() {
    let storage = web_sys::window().unwrap().local_storage().unwrap().unwrap();
    storage.remove_item(STORAGE_KEY).unwrap();
}

#[wasm_bindgen_test]
async fn test_local_storage_missing_key_loads_empty() {
    clear_local_storage();
    let store = ItemStore::new(LocalStorage);

    assert_eq!(store.kind(), BackendKind::Local);
    assert!(store.load().await.is_empty());
}

#[wasm_bindgen_test]
async fn test_local_storage_stores_json_string() {
    clear_local_storage();
    let store = Rc::new(ItemStore::new(LocalStorage));
    let mut manager = ItemManager::new(store.clone());

    let save = manager.add("Home", "123 Main St", "Personal").unwrap();
    save.commit().await.unwrap();

    let raw = web_sys::window()
        .unwrap()
        .local_storage()
        .unwrap()
        .unwrap()
        .get_item(STORAGE_KEY)
        .unwrap()
        .unwrap();
    assert!(raw.starts_with('['));
    assert!(raw.contains("\"createdAt\""));

    let reloaded = ItemManager::load(store).await;
    assert_eq!(reloaded.collection().items(), manager.collection().items());
}

#[wasm_bindgen_test]
async fn test_local_storage_corrupt_value_loads_empty() {
    web_sys::window()
        .unwrap()
        .local_storage()
        .unwrap()
        .unwrap()
        .set_item(STORAGE_KEY, "{not json")
        .unwrap();

    let backend = LocalStorage;
    assert!(backend.read(STORAGE_KEY).await.is_err());
    assert!(ItemStore::new(backend).load().await.is_empty());

    clear_local_storage();
}
