//! Persistent string stores the adapter can sit on top of
//!
//! Layout of the file backend:
//! ```text
//! storage/
//! ├── flashcard-ai-sets.json
//! ├── flashcard-ai-active-set.json
//! └── {key}.json
//! ```

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;

use super::{KvError, Result};

/// A browser-style persistent string store.
pub trait KvBackend: Send + Sync {
    fn get_item(&self, key: &str) -> Result<Option<String>>;
    fn set_item(&self, key: &str, value: &str) -> Result<()>;
    fn remove_item(&self, key: &str) -> Result<()>;
}

/// One file per key inside a storage directory
pub struct FileBackend {
    base_path: PathBuf,
}

impl FileBackend {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    /// Create the storage directory if it doesn't exist
    pub fn init(&self) -> Result<()> {
        fs::create_dir_all(&self.base_path)?;
        Ok(())
    }

    /// Get the default storage directory
    pub fn default_dir() -> Result<PathBuf> {
        dirs::data_local_dir()
            .map(|p| p.join("flashcard-ai").join("storage"))
            .ok_or(KvError::DataDirNotFound)
    }

    fn item_path(&self, key: &str) -> PathBuf {
        self.base_path.join(format!("{}.json", sanitize_key(key)))
    }
}

impl KvBackend for FileBackend {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        match fs::read_to_string(self.item_path(key)) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        self.init()?;
        // temp file + rename: readers only ever see a complete value
        let path = self.item_path(key);
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        match fs::remove_file(self.item_path(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Map a storage key onto a file-safe name
fn sanitize_key(key: &str) -> String {
    key.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// In-process store, lost when dropped
#[derive(Default)]
pub struct MemoryBackend {
    items: Mutex<HashMap<String, String>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KvBackend for MemoryBackend {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        let items = self.items.lock().map_err(|_| KvError::Poisoned)?;
        Ok(items.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        let mut items = self.items.lock().map_err(|_| KvError::Poisoned)?;
        items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        let mut items = self.items.lock().map_err(|_| KvError::Poisoned)?;
        items.remove(key);
        Ok(())
    }
}
