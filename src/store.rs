//! Widget configuration storage: the host's config API as a trait, plus
//! in-memory and JSON-file backed implementations.

use async_trait::async_trait;
use serde_json::{Map as JsonMap, Value};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use tokio::fs;

use crate::error::{Result, WidgetError};

/// Key/value configuration owned by the host dashboard.
#[async_trait]
pub trait ConfigStore: Send + Sync {
    /// Reads one config field; `None` when it was never written.
    async fn get_field_value(&self, key: &str) -> Result<Option<Value>>;

    /// Overwrites the given fields, leaving the rest untouched.
    async fn update(&self, partial: JsonMap<String, Value>) -> Result<()>;

    /// Replaces the whole config.
    async fn replace(&self, full: JsonMap<String, Value>) -> Result<()>;

    /// True when the widget had no saved config when it started.
    fn is_new_config(&self) -> bool;
}

/// Config held in memory. Records a snapshot of the full config after every write.
#[derive(Debug)]
pub struct MemoryConfigStore {
    inner: Mutex<MemoryInner>,
    is_new: bool,
}

#[derive(Debug, Default)]
struct MemoryInner {
    config: JsonMap<String, Value>,
    writes: Vec<JsonMap<String, Value>>,
}

impl Default for MemoryConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryConfigStore {
    /// Empty store for a freshly added widget.
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(MemoryInner::default()),
            is_new: true,
        }
    }

    /// Store for a widget that already has saved config.
    pub fn with_config(config: JsonMap<String, Value>) -> Self {
        Self {
            inner: Mutex::new(MemoryInner {
                config,
                writes: Vec::new(),
            }),
            is_new: false,
        }
    }

    fn lock(&self) -> MutexGuard<'_, MemoryInner> {
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Full config after each write, oldest first.
    pub fn writes(&self) -> Vec<JsonMap<String, Value>> {
        self.lock().writes.clone()
    }
}

#[async_trait]
impl ConfigStore for MemoryConfigStore {
    async fn get_field_value(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.lock().config.get(key).cloned())
    }

    async fn update(&self, partial: JsonMap<String, Value>) -> Result<()> {
        let mut inner = self.lock();
        for (key, value) in partial {
            inner.config.insert(key, value);
        }
        let snapshot = inner.config.clone();
        inner.writes.push(snapshot);
        Ok(())
    }

    async fn replace(&self, full: JsonMap<String, Value>) -> Result<()> {
        let mut inner = self.lock();
        inner.config = full;
        let snapshot = inner.config.clone();
        inner.writes.push(snapshot);
        Ok(())
    }

    fn is_new_config(&self) -> bool {
        self.is_new
    }
}

/// Config persisted as a JSON object in a file, by default under the platform config directory.
pub struct FileConfigStore {
    path: PathBuf,
    is_new: bool,
}

impl FileConfigStore {
    /// Opens the store at the platform-specific config path.
    pub async fn open_default() -> Result<Self> {
        let dirs = directories::ProjectDirs::from("com", "worklog-exporter", "worklog-exporter")
            .ok_or_else(|| WidgetError::Store("could not determine config directory".to_string()))?;
        Self::open(dirs.config_dir().join("widget.json")).await
    }

    pub async fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let is_new = !fs::try_exists(&path).await?;
        Ok(Self { path, is_new })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> Result<JsonMap<String, Value>> {
        if !fs::try_exists(&self.path).await? {
            return Ok(JsonMap::new());
        }
        let content = fs::read_to_string(&self.path).await?;
        match serde_json::from_str::<Value>(&content)? {
            Value::Object(map) => Ok(map),
            other => Err(WidgetError::Store(format!(
                "config file {} holds {} instead of an object",
                self.path.display(),
                other
            ))),
        }
    }

    async fn save(&self, config: &JsonMap<String, Value>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).await?;
        }
        let content = serde_json::to_string_pretty(config)?;
        fs::write(&self.path, content).await?;
        Ok(())
    }
}

#[async_trait]
impl ConfigStore for FileConfigStore {
    async fn get_field_value(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.load().await?.get(key).cloned())
    }

    async fn update(&self, partial: JsonMap<String, Value>) -> Result<()> {
        // A corrupt file is overwritten rather than blocking every later save.
        let mut config = self.load().await.unwrap_or_default();
        for (key, value) in partial {
            config.insert(key, value);
        }
        self.save(&config).await
    }

    async fn replace(&self, full: JsonMap<String, Value>) -> Result<()> {
        self.save(&full).await
    }

    fn is_new_config(&self) -> bool {
        self.is_new
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigStore, FileConfigStore, MemoryConfigStore};
    use serde_json::{json, Map as JsonMap, Value};
    use std::env;
    use std::fs;
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn unique_path(name: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system time before unix epoch")
            .as_nanos();
        env::temp_dir().join(format!("worklog-exporter-tests-{name}-{nanos}/widget.json"))
    }

    fn single(key: &str, value: Value) -> JsonMap<String, Value> {
        let mut map = JsonMap::new();
        map.insert(key.to_string(), value);
        map
    }

    #[tokio::test]
    async fn memory_update_merges_and_replace_overwrites() {
        let store = MemoryConfigStore::with_config(single("title", json!("Exports")));
        assert!(!store.is_new_config());

        store.update(single("filter", json!({"query": "a"}))).await.expect("update");
        assert_eq!(store.get_field_value("title").await.expect("read"), Some(json!("Exports")));

        store.replace(single("filter", json!({}))).await.expect("replace");
        assert_eq!(store.get_field_value("title").await.expect("read"), None);
        assert_eq!(store.writes().len(), 2);
    }

    #[tokio::test]
    async fn file_store_reports_new_config_and_round_trips() {
        let path = unique_path("roundtrip");
        let store = FileConfigStore::open(path.clone()).await.expect("open");
        assert!(store.is_new_config());
        assert_eq!(store.get_field_value("filter").await.expect("read"), None);

        store
            .update(single("filter", json!({"query": "for: me"})))
            .await
            .expect("update");

        let reopened = FileConfigStore::open(path.clone()).await.expect("reopen");
        assert!(!reopened.is_new_config());
        assert_eq!(
            reopened.get_field_value("filter").await.expect("read"),
            Some(json!({"query": "for: me"}))
        );

        if let Some(parent) = path.parent() {
            let _ = fs::remove_dir_all(parent);
        }
    }

    #[tokio::test]
    async fn file_store_surfaces_invalid_json_and_recovers_on_write() {
        let path = unique_path("invalid");
        let parent = path.parent().expect("parent must exist").to_path_buf();
        fs::create_dir_all(&parent).expect("create temp directory");
        fs::write(&path, "not-valid-json").expect("write invalid config");

        let store = FileConfigStore::open(path.clone()).await.expect("open");
        assert!(store.get_field_value("filter").await.is_err());

        store.update(single("filter", json!({}))).await.expect("update");
        assert_eq!(store.get_field_value("filter").await.expect("read"), Some(json!({})));

        let _ = fs::remove_dir_all(parent);
    }
}
