//! Durable storage of the persisted settings subset.
//!
//! The whole document lives under one localStorage key. Reads and writes
//! never fail the caller: problems are logged and the store carries on with
//! defaults or with session-only settings.

use contracts::shared::preferences::PersistedSettings;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

pub const GLOBAL_STATE_STORAGE_KEY: &str = "global-app-state";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage is not available")]
    Unavailable,
    #[error("storage backend error: {0}")]
    Backend(String),
}

/// Key/value backend the settings document is written to.
pub trait SettingsStorage: Send + Sync {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn write(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// `window.localStorage`.
#[derive(Clone, Copy, Debug, Default)]
pub struct BrowserStorage;

fn local_storage() -> Result<web_sys::Storage, StorageError> {
    web_sys::window()
        .and_then(|w| w.local_storage().ok().flatten())
        .ok_or(StorageError::Unavailable)
}

impl SettingsStorage for BrowserStorage {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        local_storage()?
            .get_item(key)
            .map_err(|e| StorageError::Backend(format!("{:?}", e)))
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
        local_storage()?
            .set_item(key, value)
            .map_err(|e| StorageError::Backend(format!("{:?}", e)))
    }
}

/// In-memory backend for tests and hosts without a browser.
#[derive(Clone, Debug, Default)]
pub struct MemoryStorage {
    entries: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry(key: &str, value: &str) -> Self {
        let storage = Self::new();
        let _ = storage.write(key, value);
        storage
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.read(key).ok().flatten()
    }
}

impl SettingsStorage for MemoryStorage {
    fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
        let entries = self
            .entries
            .lock()
            .map_err(|_| StorageError::Backend("memory storage lock poisoned".into()))?;
        Ok(entries.get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| StorageError::Backend("memory storage lock poisoned".into()))?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Loads the stored settings, falling back to defaults on any problem.
pub fn load_persisted(storage: &dyn SettingsStorage) -> PersistedSettings {
    match storage.read(GLOBAL_STATE_STORAGE_KEY) {
        Ok(Some(raw)) => parse_persisted(&raw),
        Ok(None) => {
            log::debug!("No stored settings under '{}', using defaults", GLOBAL_STATE_STORAGE_KEY);
            PersistedSettings::default()
        }
        Err(e) => {
            log::warn!("Failed to read stored settings: {}", e);
            PersistedSettings::default()
        }
    }
}

/// Parses a stored document section by section so that one broken section
/// does not discard the others.
pub fn parse_persisted(raw: &str) -> PersistedSettings {
    let value: Value = match serde_json::from_str(raw) {
        Ok(value) => value,
        Err(e) => {
            log::warn!("Stored settings are not valid JSON, using defaults: {}", e);
            return PersistedSettings::default();
        }
    };
    let Value::Object(mut sections) = value else {
        log::warn!("Stored settings are not a JSON object, using defaults");
        return PersistedSettings::default();
    };

    PersistedSettings {
        user_preferences: take_section(&mut sections, "userPreferences"),
        table_configs: take_section(&mut sections, "tableConfigs"),
        notification_settings: take_section(&mut sections, "notificationSettings"),
        active_features: take_section(&mut sections, "activeFeatures"),
    }
}

fn take_section<T: DeserializeOwned + Default>(sections: &mut Map<String, Value>, name: &str) -> T {
    match sections.remove(name) {
        None | Some(Value::Null) => T::default(),
        Some(value) => serde_json::from_value(value).unwrap_or_else(|e| {
            log::warn!("Stored section '{}' is malformed, using defaults: {}", name, e);
            T::default()
        }),
    }
}

/// Writes the settings document, replacing whatever was stored before.
pub fn save_persisted(storage: &dyn SettingsStorage, settings: &PersistedSettings) {
    let raw = match serde_json::to_string(settings) {
        Ok(raw) => raw,
        Err(e) => {
            log::error!("Failed to serialize settings: {}", e);
            return;
        }
    };
    if let Err(e) = storage.write(GLOBAL_STATE_STORAGE_KEY, &raw) {
        log::error!("Failed to persist settings: {}", e);
    }
}
