/// Persistence of the whole item collection under one storage key

use crate::item::TextItem;
use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

/// Key under which the collection is stored, in every backend.
pub const STORAGE_KEY: &str = "text_util_items";

/// Per-value limit of the synchronized extension store (key + JSON value).
pub const SYNC_QUOTA_BYTES_PER_ITEM: usize = 8192;

/// Typical `localStorage` budget per origin.
pub const LOCAL_QUOTA_BYTES: usize = 5 * 1024 * 1024;

/// Usage percentage at which the popup warns.
pub const QUOTA_WARNING_PERCENT: u8 = 90;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    #[error("storage read failed: {0}")]
    Read(String),

    #[error("storage write failed: {0}")]
    Write(String),

    #[error("storage value could not be (de)serialized: {0}")]
    Serialization(String),

    #[error("storage backend unavailable: {0}")]
    Unavailable(String),
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        StorageError::Serialization(err.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    /// Extension storage synchronized across the user's devices
    Sync,
    /// Storage confined to the current browser profile
    Local,
}

impl BackendKind {
    pub fn quota_bytes(self) -> usize {
        match self {
            BackendKind::Sync => SYNC_QUOTA_BYTES_PER_ITEM,
            BackendKind::Local => LOCAL_QUOTA_BYTES,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            BackendKind::Sync => "sync",
            BackendKind::Local => "local",
        }
    }
}

/// A key-value store holding JSON values.
///
/// Everything runs on the browser's single thread, so futures are not `Send`.
#[async_trait(?Send)]
pub trait StorageBackend {
    fn kind(&self) -> BackendKind;

    /// Read the value under `key`; `Ok(None)` when nothing was ever stored.
    async fn read(&self, key: &str) -> Result<Option<Value>, StorageError>;

    /// Replace the value under `key`.
    async fn write(&self, key: &str, value: Value) -> Result<(), StorageError>;
}

/// Bytes used by the stored collection relative to the backend limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuotaUsage {
    pub used: usize,
    pub limit: usize,
}

impl QuotaUsage {
    pub fn percent_used(&self) -> u8 {
        if self.limit == 0 {
            return 100;
        }
        (self.used.saturating_mul(100) / self.limit).min(100) as u8
    }

    pub fn is_near_limit(&self) -> bool {
        self.percent_used() >= QUOTA_WARNING_PERCENT
    }
}

/// Reads and writes the full collection through a backend.
pub struct ItemStore<B> {
    backend: B,
}

impl<B: StorageBackend> ItemStore<B> {
    pub fn new(backend: B) -> Self {
        ItemStore { backend }
    }

    pub fn kind(&self) -> BackendKind {
        self.backend.kind()
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Load the stored collection.
    ///
    /// Never fails: a missing value or any backend/decoding error yields an
    /// empty collection, and errors are only logged.
    pub async fn load(&self) -> Vec<TextItem> {
        match self.try_load().await {
            Ok(items) => items,
            Err(e) => {
                log::error!("Storage read error: {}", e);
                Vec::new()
            }
        }
    }

    async fn try_load(&self) -> Result<Vec<TextItem>, StorageError> {
        match self.backend.read(STORAGE_KEY).await? {
            None | Some(Value::Null) => Ok(Vec::new()),
            Some(value) => Ok(serde_json::from_value(value)?),
        }
    }

    /// Write the whole collection as one value.
    pub async fn save(&self, items: &[TextItem]) -> Result<(), StorageError> {
        let value = serde_json::to_value(items)?;

        let usage = self.usage(items);
        if usage.is_near_limit() {
            log::warn!(
                "Storage {}% full ({} of {} bytes, {} backend)",
                usage.percent_used(),
                usage.used,
                usage.limit,
                self.kind().label()
            );
        }

        self.backend
            .write(STORAGE_KEY, value)
            .await
            .inspect_err(|e| log::error!("Storage write error: {}", e))
    }

    /// Size the collection would occupy once stored.
    pub fn usage(&self, items: &[TextItem]) -> QuotaUsage {
        let json_len = serde_json::to_string(items).map(|s| s.len()).unwrap_or(0);

        QuotaUsage {
            used: STORAGE_KEY.len() + json_len,
            limit: self.kind().quota_bytes(),
        }
    }
}

/// Pretty JSON of the collection, for export files.
pub fn export_json(items: &[TextItem]) -> Result<String, StorageError> {
    Ok(serde_json::to_string_pretty(items)?)
}

/// In-process backend whose reads and writes can be made to fail.
#[cfg(test)]
#[derive(Debug, Default)]
pub(crate) struct MemoryStorage {
    values: std::cell::RefCell<std::collections::HashMap<String, Value>>,
    fail_reads: std::cell::Cell<bool>,
    fail_writes: std::cell::Cell<bool>,
    writes: std::cell::Cell<usize>,
}

#[cfg(test)]
impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(key: &str, value: Value) -> Self {
        let storage = Self::new();
        storage.values.borrow_mut().insert(key.to_string(), value);
        storage
    }

    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.set(fail);
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.set(fail);
    }

    /// Number of successful writes so far.
    pub fn write_count(&self) -> usize {
        self.writes.get()
    }

    pub fn value(&self, key: &str) -> Option<Value> {
        self.values.borrow().get(key).cloned()
    }
}

#[cfg(test)]
#[async_trait(?Send)]
impl StorageBackend for MemoryStorage {
    fn kind(&self) -> BackendKind {
        BackendKind::Local
    }

    async fn read(&self, key: &str) -> Result<Option<Value>, StorageError> {
        if self.fail_reads.get() {
            return Err(StorageError::Read("simulated read failure".to_string()));
        }
        Ok(self.value(key))
    }

    async fn write(&self, key: &str, value: Value) -> Result<(), StorageError> {
        if self.fail_writes.get() {
            return Err(StorageError::Write("simulated write failure".to_string()));
        }
        self.values.borrow_mut().insert(key.to_string(), value);
        self.writes.set(self.writes.get() + 1);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::NewItem;
    use futures::executor::block_on;

    fn create_test_item(title: &str, content: &str, category: &str) -> TextItem {
        NewItem::new(title, content, category).into_item().unwrap()
    }

    #[test]
    fn test_load_empty_store() {
        let store = ItemStore::new(MemoryStorage::new());

        assert!(block_on(store.load()).is_empty());
    }

    #[test]
    fn test_load_null_value() {
        let store = ItemStore::new(MemoryStorage::with_value(STORAGE_KEY, Value::Null));

        assert!(block_on(store.load()).is_empty());
    }

    #[test]
    fn test_save_then_load_round_trip() {
        let store = ItemStore::new(MemoryStorage::new());
        let items = vec![
            create_test_item("Home", "123 Main St", "Personal"),
            create_test_item("Reply", "Thanks, will do.", "Work"),
        ];

        block_on(store.save(&items)).unwrap();
        let loaded = block_on(store.load());

        assert_eq!(loaded, items);
        assert_eq!(loaded[0].title, "Home");
        assert_eq!(loaded[1].content, "Thanks, will do.");
        assert_eq!(loaded[1].created_at, items[1].created_at);
    }

    #[test]
    fn test_save_writes_json_array_under_fixed_key() {
        let store = ItemStore::new(MemoryStorage::new());
        let items = vec![create_test_item("Home", "123 Main St", "Personal")];

        block_on(store.save(&items)).unwrap();

        let stored = store.backend().value(STORAGE_KEY).unwrap();
        let array = stored.as_array().unwrap();
        assert_eq!(array.len(), 1);
        assert_eq!(array[0]["title"], "Home");
        assert!(array[0]["createdAt"].is_i64());
    }

    #[test]
    fn test_load_read_error_is_fail_open() {
        let backend = MemoryStorage::new();
        let store = ItemStore::new(backend);
        block_on(store.save(&[create_test_item("Home", "x", "Personal")])).unwrap();

        store.backend().set_fail_reads(true);

        assert!(block_on(store.load()).is_empty());
    }

    #[test]
    fn test_load_malformed_value_is_fail_open() {
        let store = ItemStore::new(MemoryStorage::with_value(
            STORAGE_KEY,
            serde_json::json!({ "not": "an array" }),
        ));

        assert!(block_on(store.load()).is_empty());
    }

    #[test]
    fn test_save_write_error_is_reported() {
        let store = ItemStore::new(MemoryStorage::new());
        store.backend().set_fail_writes(true);

        let result = block_on(store.save(&[create_test_item("Home", "x", "Personal")]));

        assert!(matches!(result, Err(StorageError::Write(_))));
        assert_eq!(store.backend().write_count(), 0);
    }

    #[test]
    fn test_usage_counts_key_and_json() {
        let store = ItemStore::new(MemoryStorage::new());
        let items = vec![create_test_item("Home", "123 Main St", "Personal")];

        let usage = store.usage(&items);

        let expected = STORAGE_KEY.len() + serde_json::to_string(&items).unwrap().len();
        assert_eq!(usage.used, expected);
        assert_eq!(usage.limit, LOCAL_QUOTA_BYTES);
        assert!(!usage.is_near_limit());
    }

    #[test]
    fn test_quota_percent() {
        let usage = QuotaUsage { used: 7500, limit: SYNC_QUOTA_BYTES_PER_ITEM };
        assert_eq!(usage.percent_used(), 91);
        assert!(usage.is_near_limit());

        let over = QuotaUsage { used: 20000, limit: SYNC_QUOTA_BYTES_PER_ITEM };
        assert_eq!(over.percent_used(), 100);

        let half = QuotaUsage { used: 4096, limit: SYNC_QUOTA_BYTES_PER_ITEM };
        assert_eq!(half.percent_used(), 50);
        assert!(!half.is_near_limit());
    }

    #[test]
    fn test_export_json() {
        let items = vec![create_test_item("Home", "123 Main St", "Personal")];

        let json = export_json(&items).unwrap();
        let parsed: Vec<TextItem> = serde_json::from_str(&json).unwrap();

        assert!(json.contains("\"createdAt\""));
        assert_eq!(parsed, items);
    }
}
