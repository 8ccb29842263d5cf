//! File-backed key-value store
//!
//! All keys live in one JSON object (`state.json`) under the data
//! directory. Every write rewrites the file through a temporary file and a
//! rename, so a crash never leaves a half-written state behind.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use railchat_core::error::StorageError;
use railchat_core::kv::KeyValueStore;

/// Name of the state file inside the data directory
pub const STATE_FILE: &str = "state.json";

#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, String>>,
}

impl FileStore {
    /// Open the store in `data_dir`, creating the directory if needed.
    ///
    /// A state file that cannot be parsed is moved aside as `state.json.corrupt`
    /// and the store starts empty. Other IO failures are logged and the store
    /// starts empty too; later writes then fail and are logged by the adapter.
    pub fn open(data_dir: impl AsRef<Path>) -> Self {
        let dir = data_dir.as_ref();
        if let Err(e) = std::fs::create_dir_all(dir) {
            tracing::warn!(dir = ?dir, error = %e, "Could not create data directory");
        }
        let path = dir.join(STATE_FILE);

        let entries = match std::fs::read_to_string(&path) {
            Ok(content) => match serde_json::from_str::<BTreeMap<String, String>>(&content) {
                Ok(entries) => entries,
                Err(e) => {
                    let backup = path.with_extension("json.corrupt");
                    tracing::warn!(path = ?path, error = %e, "State file is corrupt, moving it to {:?}", backup);
                    if let Err(e) = std::fs::rename(&path, &backup) {
                        tracing::warn!(path = ?path, error = %e, "Could not move corrupt state file aside");
                    }
                    BTreeMap::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => {
                tracing::warn!(path = ?path, error = %e, "Could not read state file, starting empty");
                BTreeMap::new()
            }
        };

        tracing::debug!(path = ?path, keys = entries.len(), "Opened file store");

        Self {
            path,
            entries: Mutex::new(entries),
        }
    }

    fn persist(&self, entries: &BTreeMap<String, String>) -> Result<(), StorageError> {
        let encoded = serde_json::to_string_pretty(entries)?;
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, encoded)?;
        std::fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
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

        let previous = entries.insert(key.to_string(), value.to_string());
        if let Err(e) = self.persist(&entries) {
            // Keep memory in line with what is on disk.
            match previous {
                Some(previous) => entries.insert(key.to_string(), previous),
                None => entries.remove(key),
            };
            return Err(StorageError::WriteRejected(e.to_string()));
        }
        Ok(())
    }
}
