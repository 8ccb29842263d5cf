//! Completion settings
//!
//! Endpoint, API key and model are process-wide values persisted under
//! their own keys, independent of any project.

use serde::{Deserialize, Serialize};

use crate::kv::{JsonStore, KeyValueStore, API_KEY_KEY, ENDPOINT_KEY, MODEL_KEY};

/// Model selected when nothing is stored
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";

/// Models offered by the settings panel
pub const MODEL_CHOICES: [&str; 4] = ["gpt-3.5-turbo", "gpt-4o", "gpt-4-turbo", "gpt-4"];

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    pub endpoint: String,
    pub api_key: String,
    pub model: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            api_key: String::new(),
            model: DEFAULT_MODEL.to_string(),
        }
    }
}

// Keeps the key out of logs.
impl std::fmt::Debug for Settings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Settings")
            .field("endpoint", &self.endpoint)
            .field("api_key", &if self.api_key.is_empty() { "" } else { "***" })
            .field("model", &self.model)
            .finish()
    }
}

impl Settings {
    pub fn load<K: KeyValueStore>(store: &JsonStore<K>) -> Self {
        Self {
            endpoint: store.get(ENDPOINT_KEY, String::new()),
            api_key: store.get(API_KEY_KEY, String::new()),
            model: store.get(MODEL_KEY, DEFAULT_MODEL.to_string()),
        }
    }

    pub fn save<K: KeyValueStore>(&self, store: &JsonStore<K>) {
        store.set(ENDPOINT_KEY, &self.endpoint);
        store.set(API_KEY_KEY, &self.api_key);
        store.set(MODEL_KEY, &self.model);
    }

    /// Both endpoint and key are filled in
    pub fn has_credentials(&self) -> bool {
        !self.endpoint.trim().is_empty() && !self.api_key.trim().is_empty()
    }

    /// Model to send, falling back to the default when blank
    pub fn effective_model(&self) -> &str {
        if self.model.trim().is_empty() {
            DEFAULT_MODEL
        } else {
            &self.model
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kv::MemoryStore;

    #[test]
    fn test_defaults_when_empty() {
        let store = JsonStore::new(MemoryStore::new());
        let settings = Settings::load(&store);
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.model, "gpt-3.5-turbo");
        assert!(!settings.has_credentials());
    }

    #[test]
    fn test_save_and_load() {
        let backend = MemoryStore::new();
        let store = JsonStore::new(backend.clone());

        let settings = Settings {
            endpoint: "https://res.openai.azure.com/".into(),
            api_key: "secret".into(),
            model: "gpt-4o".into(),
        };
        settings.save(&store);

        assert_eq!(backend.raw("selectedGptModel").as_deref(), Some("\"gpt-4o\""));
        assert_eq!(Settings::load(&store), settings);
        assert!(settings.has_credentials());
    }

    #[test]
    fn test_whitespace_credentials_are_missing() {
        let settings = Settings {
            endpoint: "  ".into(),
            api_key: "key".into(),
            ..Settings::default()
        };
        assert!(!settings.has_credentials());
    }

    #[test]
    fn test_debug_hides_key() {
        let settings = Settings {
            api_key: "sk-live".into(),
            ..Settings::default()
        };
        assert!(!format!("{:?}", settings).contains("sk-live"));
    }
}
