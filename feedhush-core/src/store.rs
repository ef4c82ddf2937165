// File: src/store.rs
//
// Option stores backing the settings loader.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::{Map, Value};
use tracing::debug;

use feedhush_common::error::Error;
use feedhush_common::traits::OptionStore;

/// Option store held entirely in memory.
#[derive(Default)]
pub struct MemoryOptionStore {
    values: RwLock<Map<String, Value>>,
}

impl MemoryOptionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_map(values: Map<String, Value>) -> Self {
        Self {
            values: RwLock::new(values),
        }
    }

    pub fn set(&self, name: impl Into<String>, value: impl Into<Value>) {
        self.values.write().insert(name.into(), value.into());
    }

    pub fn remove(&self, name: &str) {
        self.values.write().remove(name);
    }
}

#[async_trait]
impl OptionStore for MemoryOptionStore {
    async fn get_option(&self, name: &str) -> Result<Option<Value>, Error> {
        Ok(self.values.read().get(name).cloned())
    }
}

/// Option store backed by a JSON object on disk.
///
/// The file is re-read on every lookup so edits are picked up the next time
/// settings are loaded.
#[derive(Debug, Clone)]
pub struct JsonFileOptionStore {
    path: PathBuf,
}

impl JsonFileOptionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_all(&self) -> Result<Map<String, Value>, Error> {
        let raw = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| Error::Storage(format!("reading {}: {}", self.path.display(), e)))?;

        match serde_json::from_str::<Value>(&raw) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(other) => Err(Error::Storage(format!(
                "{} must hold a JSON object, found {}",
                self.path.display(),
                json_kind(&other)
            ))),
            Err(e) => Err(Error::Storage(format!("parsing {}: {}", self.path.display(), e))),
        }
    }
}

#[async_trait]
impl OptionStore for JsonFileOptionStore {
    async fn get_option(&self, name: &str) -> Result<Option<Value>, Error> {
        let mut values = self.read_all().await?;
        debug!("Read option '{}' from {}", name, self.path.display());
        Ok(values.remove(name))
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn temp_file(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[tokio::test]
    async fn test_memory_store_roundtrip() {
        let store = MemoryOptionStore::new();
        store.set("hide_threshold", json!(0.7));

        assert_eq!(store.get_option("hide_threshold").await.unwrap(), Some(json!(0.7)));
        assert_eq!(store.get_option("apiKey").await.unwrap(), None);

        store.remove("hide_threshold");
        assert_eq!(store.get_option("hide_threshold").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_json_file_store_reads_keys() {
        let file = temp_file(r#"{"apiUrl": "http://localhost:1234/v1", "hide_threshold": 0.8}"#);
        let store = JsonFileOptionStore::new(file.path());

        assert_eq!(
            store.get_option("apiUrl").await.unwrap(),
            Some(json!("http://localhost:1234/v1"))
        );
        assert_eq!(store.get_option("missing").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_json_file_store_failures_are_storage_errors() {
        let missing = JsonFileOptionStore::new("/nonexistent/feedhush/options.json");
        assert!(matches!(missing.get_option("apiUrl").await, Err(Error::Storage(_))));

        let file = temp_file("[1, 2, 3]");
        let not_object = JsonFileOptionStore::new(file.path());
        assert!(matches!(not_object.get_option("apiUrl").await, Err(Error::Storage(_))));
    }
}
