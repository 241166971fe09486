/// Browser storage backends: extension sync storage and localStorage

use crate::storage::{BackendKind, StorageBackend, StorageError};
use async_trait::async_trait;
use serde_json::Value;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

// Import JS bridge functions
#[wasm_bindgen(module = "/popup.js")]
extern "C" {
    fn isSyncStorageAvailable() -> bool;

    #[wasm_bindgen(catch)]
    async fn getSyncStorage(key: &str) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn setSyncStorage(key: &str, value: JsValue) -> Result<(), JsValue>;
}

/// Message carried by a JS exception, falling back to its debug form.
pub fn js_error_message(err: &JsValue) -> String {
    if let Some(error) = err.dyn_ref::<js_sys::Error>() {
        return String::from(error.message());
    }
    err.as_string().unwrap_or_else(|| format!("{:?}", err))
}

/// `chrome.storage.sync`, reached through the JS bridge.
#[derive(Debug, Default, Clone, Copy)]
pub struct SyncStorage;

#[async_trait(?Send)]
impl StorageBackend for SyncStorage {
    fn kind(&self) -> BackendKind {
        BackendKind::Sync
    }

    async fn read(&self, key: &str) -> Result<Option<Value>, StorageError> {
        let value_js = getSyncStorage(key)
            .await
            .map_err(|e| StorageError::Read(js_error_message(&e)))?;

        if value_js.is_null() || value_js.is_undefined() {
            return Ok(None);
        }

        serde_wasm_bindgen::from_value(value_js)
            .map(Some)
            .map_err(|e| StorageError::Serialization(e.to_string()))
    }

    async fn write(&self, key: &str, value: Value) -> Result<(), StorageError> {
        // Plain objects, not Maps, so chrome.storage can clone them
        let serializer = serde_wasm_bindgen::Serializer::json_compatible();
        let value_js = serde::Serialize::serialize(&value, &serializer)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;

        setSyncStorage(key, value_js)
            .await
            .map_err(|e| StorageError::Write(js_error_message(&e)))
    }
}

/// `window.localStorage`, holding the collection as a JSON string.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalStorage;

impl LocalStorage {
    fn storage() -> Result<web_sys::Storage, StorageError> {
        web_sys::window()
            .ok_or_else(|| StorageError::Unavailable("no window".to_string()))?
            .local_storage()
            .map_err(|e| StorageError::Unavailable(js_error_message(&e)))?
            .ok_or_else(|| StorageError::Unavailable("localStorage is disabled".to_string()))
    }
}

#[async_trait(?Send)]
impl StorageBackend for LocalStorage {
    fn kind(&self) -> BackendKind {
        BackendKind::Local
    }

    async fn read(&self, key: &str) -> Result<Option<Value>, StorageError> {
        let stored = Self::storage()?
            .get_item(key)
            .map_err(|e| StorageError::Read(js_error_message(&e)))?;

        match stored {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    async fn write(&self, key: &str, value: Value) -> Result<(), StorageError> {
        let json = serde_json::to_string(&value)?;

        Self::storage()?
            .set_item(key, &json)
            .map_err(|e| StorageError::Write(js_error_message(&e)))
    }
}

/// The backend picked for this popup instance.
#[derive(Debug, Clone, Copy)]
pub enum BrowserStorage {
    Sync(SyncStorage),
    Local(LocalStorage),
}

impl BrowserStorage {
    /// Use synchronized storage when the runtime offers it, localStorage otherwise.
    /// Called once per popup; the choice is not revisited.
    pub fn detect() -> Self {
        let backend = if isSyncStorageAvailable() {
            BrowserStorage::Sync(SyncStorage)
        } else {
            BrowserStorage::Local(LocalStorage)
        };
        log::info!("Using {} storage backend", backend.kind().label());
        backend
    }
}

#[async_trait(?Send)]
impl StorageBackend for BrowserStorage {
    fn kind(&self) -> BackendKind {
        match self {
            BrowserStorage::Sync(backend) => backend.kind(),
            BrowserStorage::Local(backend) => backend.kind(),
        }
    }

    async fn read(&self, key: &str) -> Result<Option<Value>, StorageError> {
        match self {
            BrowserStorage::Sync(backend) => backend.read(key).await,
            BrowserStorage::Local(backend) => backend.read(key).await,
        }
    }

    async fn write(&self, key: &str, value: Value) -> Result<(), StorageError> {
        match self {
            BrowserStorage::Sync(backend) => backend.write(key, value).await,
            BrowserStorage::Local(backend) => backend.write(key, value).await,
        }
    }
}
