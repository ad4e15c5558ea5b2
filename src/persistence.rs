//! Durable key/value storage for the configuration root
//!
//! Values are namespaced under a component name. [`JsonFileStore`] keeps every
//! component in one pretty-printed document:
//!
//! ```json
//! { "monitor-presets": { "DisplaySystemConfig": { ... } } }
//! ```

use async_trait::async_trait;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::{debug, info};

use crate::error::StoreError;

#[async_trait]
pub trait ConfigStore: Send + Sync {
    /// `StoreError::NotFound` when the key was never written
    async fn read(&self, key: &str) -> Result<Value, StoreError>;

    async fn write(&self, key: &str, value: &Value) -> Result<(), StoreError>;
}

/// Process-local store that counts writes
#[derive(Debug, Default)]
pub struct MemoryStore {
    component: String,
    values: Mutex<HashMap<String, Value>>,
    writes: AtomicUsize,
}

impl MemoryStore {
    pub fn new(component: impl Into<String>) -> Self {
        Self {
            component: component.into(),
            ..Self::default()
        }
    }

    /// Pre-populate a key without counting it as a write
    pub fn with_value(self, key: &str, value: Value) -> Self {
        self.values
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(key.to_string(), value);
        self
    }

    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        self.values
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(key)
            .cloned()
    }
}

#[async_trait]
impl ConfigStore for MemoryStore {
    async fn read(&self, key: &str) -> Result<Value, StoreError> {
        self.get(key)
            .ok_or_else(|| StoreError::not_found(&self.component, key))
    }

    async fn write(&self, key: &str, value: &Value) -> Result<(), StoreError> {
        self.values
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(key.to_string(), value.clone());
        self.writes.fetch_add(1, Ordering::SeqCst);
        debug!(component = %self.component, key, "memory store write");
        Ok(())
    }
}

/// Single JSON document on disk, rewritten atomically on every write
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
    component: String,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>, component: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            component: component.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whole document, or an empty object when the file does not exist yet
    async fn load_document(&self) -> Result<Map<String, Value>, StoreError> {
        let contents = match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Map::new()),
            Err(source) => {
                return Err(StoreError::IoAt {
                    path: self.path.clone(),
                    source,
                });
            }
        };

        match serde_json::from_str::<Value>(&contents) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(_) => Err(StoreError::Corrupt {
                location: self.path.display().to_string(),
                source: serde::de::Error::custom("document root is not an object"),
            }),
            Err(source) => Err(StoreError::Corrupt {
                location: self.path.display().to_string(),
                source,
            }),
        }
    }

    async fn store_document(&self, document: &Map<String, Value>) -> Result<(), StoreError> {
        let io_err = |source: std::io::Error| StoreError::IoAt {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent).await.map_err(io_err)?;
        }

        let json = serde_json::to_string_pretty(document)?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json).await.map_err(io_err)?;
        tokio::fs::rename(&tmp, &self.path).await.map_err(io_err)?;
        Ok(())
    }
}

#[async_trait]
impl ConfigStore for JsonFileStore {
    async fn read(&self, key: &str) -> Result<Value, StoreError> {
        let document = self.load_document().await?;
        document
            .get(&self.component)
            .and_then(|component| component.get(key))
            .cloned()
            .ok_or_else(|| StoreError::not_found(&self.component, key))
    }

    async fn write(&self, key: &str, value: &Value) -> Result<(), StoreError> {
        // An unreadable document is replaced rather than blocking every write
        let mut document = match self.load_document().await {
            Ok(document) => document,
            Err(StoreError::Corrupt { location, .. }) => {
                info!(location = %location, "Replacing corrupt storage document");
                Map::new()
            }
            Err(err) => return Err(err),
        };

        let section = document
            .entry(self.component.clone())
            .or_insert_with(|| Value::Object(Map::new()));
        if !section.is_object() {
            *section = Value::Object(Map::new());
        }
        if let Value::Object(section) = section {
            section.insert(key.to_string(), value.clone());
        }

        self.store_document(&document).await?;
        debug!(path = %self.path.display(), component = %self.component, key, "stored value");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_memory_store_counts_writes() {
        let store = MemoryStore::new("test").with_value("seed", json!(1));
        assert_eq!(store.read("seed").await.unwrap(), json!(1));
        assert_eq!(store.write_count(), 0);

        store.write("key", &json!({"a": 1})).await.unwrap();
        assert_eq!(store.write_count(), 1);
        assert_eq!(store.get("key"), Some(json!({"a": 1})));
    }

    #[tokio::test]
    async fn test_memory_store_missing_key() {
        let store = MemoryStore::new("test");
        let err = store.read("nope").await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_file_store_round_trip_keeps_other_components() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");
        tokio::fs::write(&path, r#"{"other": {"Key": true}}"#).await.unwrap();

        let store = JsonFileStore::new(&path, "presets");
        assert!(matches!(
            store.read("Config").await,
            Err(StoreError::NotFound { .. })
        ));

        store.write("Config", &json!({"List": [1, 2]})).await.unwrap();
        assert_eq!(store.read("Config").await.unwrap(), json!({"List": [1, 2]}));

        let raw: Value =
            serde_json::from_str(&tokio::fs::read_to_string(&path).await.unwrap()).unwrap();
        assert_eq!(raw["other"]["Key"], json!(true));
        assert_eq!(raw["presets"]["Config"]["List"], json!([1, 2]));
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[tokio::test]
    async fn test_file_store_missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("nested/storage.json"), "presets");
        assert!(matches!(
            store.read("Config").await,
            Err(StoreError::NotFound { .. })
        ));
        store.write("Config", &json!(1)).await.unwrap();
        assert_eq!(store.read("Config").await.unwrap(), json!(1));
    }

    #[tokio::test]
    async fn test_file_store_corrupt_document() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");
        tokio::fs::write(&path, "{ broken").await.unwrap();

        let store = JsonFileStore::new(&path, "presets");
        assert!(matches!(
            store.read("Config").await,
            Err(StoreError::Corrupt { .. })
        ));

        store.write("Config", &json!("fresh")).await.unwrap();
        assert_eq!(store.read("Config").await.unwrap(), json!("fresh"));
    }
}
