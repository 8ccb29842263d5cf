//! `localStorage` backend for the core key-value adapter

use railchat_core::error::StorageError;
use railchat_core::kv::KeyValueStore;
use wasm_bindgen::JsValue;

/// Handle on `window.localStorage`, looked up on every access so a
/// disabled or missing storage degrades to logged failures.
#[derive(Clone, Copy, Debug, Default)]
pub struct LocalStorage;

impl LocalStorage {
    fn storage() -> Result<web_sys::Storage, StorageError> {
        let window =
            web_sys::window().ok_or_else(|| StorageError::Unavailable("no window".to_string()))?;
        window
            .local_storage()
            .map_err(|e| StorageError::Unavailable(js_message(&e)))?
            .ok_or_else(|| StorageError::Unavailable("localStorage is disabled".to_string()))
    }
}

impl KeyValueStore for LocalStorage {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        Self::storage()?
            .get_item(key)
            .map_err(|e| StorageError::Unavailable(js_message(&e)))
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
        // Quota errors surface here
        Self::storage()?
            .set_item(key, value)
            .map_err(|e| StorageError::WriteRejected(js_message(&e)))
    }
}

/// Readable text for a thrown JS value
pub fn js_message(value: &JsValue) -> String {
    value
        .as_string()
        .or_else(|| {
            js_sys::Reflect::get(value, &JsValue::from_str("message"))
                .ok()
                .and_then(|m| m.as_string())
        })
        .unwrap_or_else(|| format!("{:?}", value))
}
