pub mod config;
pub mod flashcards;
pub mod gateways;
pub mod kv;
pub mod settings;

use std::path::PathBuf;
use std::sync::Arc;

use config::AppConfig;
use kv::{FileBackend, KvStore};

/// Open the persistent store described by `config`.
///
/// Falls back to an unavailable store when no storage directory can be
/// resolved or created; the application then runs on defaults.
pub fn open_store(config: &AppConfig) -> KvStore {
    let dir: Option<PathBuf> = match &config.storage.dir {
        Some(dir) => Some(dir.clone()),
        None => FileBackend::default_dir().ok(),
    };

    let Some(dir) = dir else {
        log::warn!("No data directory available, running without persistent storage");
        return KvStore::unavailable();
    };

    let backend = FileBackend::new(dir.clone());
    if let Err(e) = backend.init() {
        log::warn!("Cannot use storage at {:?}, running without persistence: {}", dir, e);
        return KvStore::unavailable();
    }

    log::debug!("Using storage at {:?}", dir);
    KvStore::new(Arc::new(backend))
}
