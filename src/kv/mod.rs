//! Typed JSON access to a persistent string store
//!
//! This module provides:
//! - The `KvBackend` trait with file and in-memory implementations
//! - `KvStore`, which degrades to defaults when storage is missing or corrupt
//! - One-time migration of legacy keys

pub mod backend;
pub mod migration;

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

pub use backend::{FileBackend, KvBackend, MemoryBackend};
pub use migration::{ACTIVE_SET_KEY, LEGACY_ACTIVE_SET_KEY, LEGACY_SETS_KEY, SETS_KEY};

#[derive(Error, Debug)]
pub enum KvError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Data directory not found")]
    DataDirNotFound,

    #[error("Storage lock poisoned")]
    Poisoned,
}

pub type Result<T> = std::result::Result<T, KvError>;

/// Adapter over an optional persistent medium.
///
/// Reads never fail: a missing medium, a missing key, or a value that doesn't
/// decode all yield the caller's default. Writes are best-effort.
#[derive(Clone)]
pub struct KvStore {
    backend: Option<Arc<dyn KvBackend>>,
    /// Keys whose legacy counterpart has already been checked
    migrated: Arc<Mutex<HashSet<String>>>,
}

impl KvStore {
    pub fn new(backend: Arc<dyn KvBackend>) -> Self {
        Self {
            backend: Some(backend),
            migrated: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    /// A store with no medium behind it
    pub fn unavailable() -> Self {
        Self {
            backend: None,
            migrated: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryBackend::new()))
    }

    pub fn is_available(&self) -> bool {
        self.backend.is_some()
    }

    /// Read the raw JSON value stored under `key`
    pub fn read(&self, key: &str) -> Option<Value> {
        let backend = self.backend.as_deref()?;

        match backend.get_item(key) {
            Ok(Some(raw)) if !raw.is_empty() => match serde_json::from_str(&raw) {
                Ok(value) => Some(value),
                Err(e) => {
                    log::warn!("Stored value for {} is not valid JSON, using default: {}", key, e);
                    None
                }
            },
            Ok(_) => self.migrate_once(backend, key),
            Err(e) => {
                log::warn!("Failed to read {} from storage: {}", key, e);
                None
            }
        }
    }

    /// Read and decode `key`, falling back to `default`
    pub fn load<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        let Some(value) = self.read(key) else {
            return default;
        };

        match serde_json::from_value(value) {
            Ok(decoded) => decoded,
            Err(e) => {
                log::warn!("Stored value for {} has an unexpected shape, using default: {}", key, e);
                default
            }
        }
    }

    /// Encode and write `value` under `key`. Failures are logged, not returned.
    pub fn write<T: Serialize + ?Sized>(&self, key: &str, value: &T) {
        let Some(backend) = self.backend.as_deref() else {
            return;
        };

        if migration::is_legacy_key(key) {
            log::warn!("Refusing to write legacy storage key {}", key);
            return;
        }

        let result = serde_json::to_string(value)
            .map_err(KvError::from)
            .and_then(|raw| backend.set_item(key, &raw));
        if let Err(e) = result {
            log::warn!("Failed to write {} to storage: {}", key, e);
        }
    }

    pub fn remove(&self, key: &str) {
        let Some(backend) = self.backend.as_deref() else {
            return;
        };
        if let Err(e) = backend.remove_item(key) {
            log::warn!("Failed to remove {} from storage: {}", key, e);
        }
    }

    fn migrate_once(&self, backend: &dyn KvBackend, key: &str) -> Option<Value> {
        let legacy = migration::legacy_key_for(key)?;

        let first_check = match self.migrated.lock() {
            Ok(mut migrated) => migrated.insert(key.to_string()),
            Err(_) => false,
        };
        if !first_check {
            return None;
        }

        match migration::migrate_legacy_key(backend, key, legacy) {
            Ok(value) => value,
            Err(e) => {
                log::warn!("Migration: {} → {} failed, legacy data kept: {}", legacy, key, e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with_backend() -> (KvStore, Arc<MemoryBackend>) {
        let backend = Arc::new(MemoryBackend::new());
        (KvStore::new(backend.clone()), backend)
    }

    #[test]
    fn test_unavailable_store_returns_defaults() {
        let store = KvStore::unavailable();
        assert!(!store.is_available());

        store.write("flashcard-ai-voice", "Enif");
        let voice: String = store.load("flashcard-ai-voice", "Algenib".to_string());
        assert_eq!(voice, "Algenib");
    }

    #[test]
    fn test_load_after_write() {
        let store = KvStore::in_memory();
        store.write("numbers", &vec![1, 2, 3]);
        let numbers: Vec<i32> = store.load("numbers", Vec::new());
        assert_eq!(numbers, vec![1, 2, 3]);
    }

    #[test]
    fn test_corrupt_json_falls_back_to_default() {
        let (store, backend) = store_with_backend();
        backend.set_item("numbers", "[1, 2,").unwrap();

        let numbers: Vec<i32> = store.load("numbers", vec![7]);
        assert_eq!(numbers, vec![7]);
    }

    #[test]
    fn test_wrong_shape_falls_back_to_default() {
        let (store, backend) = store_with_backend();
        backend.set_item("numbers", "{\"not\": \"a list\"}").unwrap();

        let numbers: Vec<i32> = store.load("numbers", Vec::new());
        assert!(numbers.is_empty());
    }

    #[test]
    fn test_legacy_sets_migrate_once() {
        let (store, backend) = store_with_backend();
        let legacy = r#"[{"id":"a","name":"Old palace","flashcards":[],"createdAt":"2024-01-01T00:00:00.000Z"}]"#;
        backend.set_item(LEGACY_SETS_KEY, legacy).unwrap();

        let first = store.read(SETS_KEY).unwrap();
        assert_eq!(first[0]["id"], "a");
        assert_eq!(backend.get_item(LEGACY_SETS_KEY).unwrap(), None);
        assert!(backend.get_item(SETS_KEY).unwrap().is_some());

        // A restored legacy key is not consulted again
        backend.set_item(LEGACY_SETS_KEY, r#"[{"id":"b"}]"#).unwrap();
        let second = store.read(SETS_KEY).unwrap();
        assert_eq!(second[0]["id"], "a");
        assert!(backend.get_item(LEGACY_SETS_KEY).unwrap().is_some());
    }

    #[test]
    fn test_migration_not_rechecked_after_new_key_removed() {
        let (store, backend) = store_with_backend();
        assert_eq!(store.read(ACTIVE_SET_KEY), None);

        backend.set_item(LEGACY_ACTIVE_SET_KEY, "\"late\"").unwrap();
        assert_eq!(store.read(ACTIVE_SET_KEY), None);
        assert!(backend.get_item(LEGACY_ACTIVE_SET_KEY).unwrap().is_some());
    }

    #[test]
    fn test_legacy_keys_are_never_written() {
        let (store, backend) = store_with_backend();
        store.write(LEGACY_SETS_KEY, &Vec::<i32>::new());
        assert_eq!(backend.get_item(LEGACY_SETS_KEY).unwrap(), None);
    }

    #[test]
    fn test_existing_new_key_wins_over_legacy() {
        let (store, backend) = store_with_backend();
        backend.set_item(ACTIVE_SET_KEY, "\"current\"").unwrap();
        backend.set_item(LEGACY_ACTIVE_SET_KEY, "\"old\"").unwrap();

        let active: Option<String> = store.load(ACTIVE_SET_KEY, None);
        assert_eq!(active.as_deref(), Some("current"));
        assert!(backend.get_item(LEGACY_ACTIVE_SET_KEY).unwrap().is_some());
    }
}
