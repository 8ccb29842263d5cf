//! Persistent Key-Value Store Adapter
//!
//! Wraps a string-to-string persistent store (browser `localStorage`, a
//! JSON file on disk, memory in tests) with typed, JSON-encoded access.
//! Reads fall back to a caller-supplied default and writes never fail
//! loudly: persistence problems are logged and execution continues.

use serde::{de::DeserializeOwned, Serialize};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use crate::error::StorageError;

/// Key holding the ordered project list
pub const PROJECTS_KEY: &str = "projects";
/// Key holding the active project id (or `null`)
pub const ACTIVE_PROJECT_KEY: &str = "activeProjectId";
/// Key holding the completion endpoint URL
pub const ENDPOINT_KEY: &str = "azureEndpoint";
/// Key holding the completion API key
pub const API_KEY_KEY: &str = "azureApiKey";
/// Key holding the selected model name
pub const MODEL_KEY: &str = "selectedGptModel";

/// Raw persistent string store
pub trait KeyValueStore {
    /// Read the raw text stored under `key`
    fn read(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Durably store `value` under `key`
    fn write(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// In-memory store. Clones share the same entries.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Arc<Mutex<BTreeMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw text under `key`, bypassing JSON decoding
    pub fn raw(&self, key: &str) -> Option<String> {
        self.entries
            .lock()
            .ok()
            .and_then(|entries| entries.get(key).cloned())
    }

    /// Store raw text under `key`, bypassing JSON encoding
    pub fn insert_raw(&self, key: &str, value: &str) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(key.to_string(), value.to_string());
        }
    }
}

impl KeyValueStore for MemoryStore {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        let entries = self
            .entries
            .lock()
            .map_err(|e| StorageError::Unavailable(e.to_string()))?;
        Ok(entries.get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|e| StorageError::Unavailable(e.to_string()))?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Typed JSON view over a [`KeyValueStore`]
#[derive(Debug, Clone)]
pub struct JsonStore<K> {
    backend: K,
}

impl<K: KeyValueStore> JsonStore<K> {
    pub fn new(backend: K) -> Self {
        Self { backend }
    }

    /// Decode the value under `key`, or return `default` when it is missing or unreadable
    pub fn get<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        let raw = match self.backend.read(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                tracing::debug!(key, "No stored value, using default");
                return default;
            }
            Err(e) => {
                tracing::warn!(key, error = %e, "Error reading stored value");
                return default;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(key, error = %e, "Stored value is corrupt, using default");
                default
            }
        }
    }

    /// Encode and persist `value` under `key`. Failures are logged, not returned.
    pub fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T) {
        let encoded = match serde_json::to_string(value) {
            Ok(encoded) => encoded,
            Err(e) => {
                tracing::error!(key, error = %e, "Error encoding value for storage");
                return;
            }
        };

        if let Err(e) = self.backend.write(key, &encoded) {
            tracing::error!(key, error = %e, "Error writing stored value");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ChatMessage, Project};

    struct BrokenStore;

    impl KeyValueStore for BrokenStore {
        fn read(&self, _key: &str) -> Result<Option<String>, StorageError> {
            Err(StorageError::Unavailable("disabled".into()))
        }

        fn write(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
            Err(StorageError::WriteRejected("quota exceeded".into()))
        }
    }

    #[test]
    fn test_missing_key_returns_default() {
        let store = JsonStore::new(MemoryStore::new());
        let value: Vec<Project> = store.get(PROJECTS_KEY, Vec::new());
        assert!(value.is_empty());
    }

    #[test]
    fn test_corrupt_value_returns_default() {
        let backend = MemoryStore::new();
        backend.insert_raw(MODEL_KEY, "{not json");
        let store = JsonStore::new(backend);

        let model: String = store.get(MODEL_KEY, "gpt-4".to_string());
        assert_eq!(model, "gpt-4");
    }

    #[test]
    fn test_strings_are_json_encoded() {
        let backend = MemoryStore::new();
        let store = JsonStore::new(backend.clone());

        store.set(ENDPOINT_KEY, "https://example.openai.azure.com/");
        assert_eq!(
            backend.raw(ENDPOINT_KEY).as_deref(),
            Some("\"https://example.openai.azure.com/\"")
        );
    }

    #[test]
    fn test_null_active_id_round_trip() {
        let store = JsonStore::new(MemoryStore::new());
        store.set(ACTIVE_PROJECT_KEY, &None::<String>);

        let active: Option<String> = store.get(ACTIVE_PROJECT_KEY, Some("stale".into()));
        assert_eq!(active, None);
    }

    #[test]
    fn test_project_list_round_trip() {
        let store = JsonStore::new(MemoryStore::new());

        let mut with_history = Project::new();
        with_history.name = "Budget".into();
        with_history.system_prompt = Some("Be terse.".into());
        with_history.history = vec![ChatMessage::user("hello"), ChatMessage::assistant("hi")];

        let mut bare = Project::new();
        bare.system_prompt = None;

        let projects = vec![with_history, Project::new(), bare];
        store.set(PROJECTS_KEY, &projects);

        let loaded: Vec<Project> = store.get(PROJECTS_KEY, Vec::new());
        assert_eq!(loaded, projects);
        assert_eq!(loaded[1].system_prompt.as_deref(), Some(""));
        assert!(loaded[1].history.is_empty());
    }

    #[test]
    fn test_backend_failures_are_swallowed() {
        let store = JsonStore::new(BrokenStore);
        store.set(MODEL_KEY, "gpt-4o");

        let model: String = store.get(MODEL_KEY, "fallback".to_string());
        assert_eq!(model, "fallback");
    }
}
