//! One-time migration of "palace"-era storage keys onto their "set" names.
//!
//! Earlier releases called a flashcard set a "palace" and stored the collection
//! and the active pointer under different keys. On the first read of a new key
//! that has no stored value, the legacy value is copied over and the legacy key
//! is removed.

use serde_json::Value;

use super::backend::KvBackend;
use super::Result;

/// Key holding the JSON array of flashcard sets
pub const SETS_KEY: &str = "flashcard-ai-sets";
/// Key holding the active set id (JSON string or null)
pub const ACTIVE_SET_KEY: &str = "flashcard-ai-active-set";

pub const LEGACY_SETS_KEY: &str = "flashcard-ai-palaces";
pub const LEGACY_ACTIVE_SET_KEY: &str = "flashcard-ai-active";

const LEGACY_KEYS: &[(&str, &str)] = &[
    (SETS_KEY, LEGACY_SETS_KEY),
    (ACTIVE_SET_KEY, LEGACY_ACTIVE_SET_KEY),
];

/// The legacy key a new key migrates from, if any
pub fn legacy_key_for(key: &str) -> Option<&'static str> {
    LEGACY_KEYS
        .iter()
        .find(|(new, _)| *new == key)
        .map(|(_, legacy)| *legacy)
}

/// Legacy keys are read during migration and never written
pub fn is_legacy_key(key: &str) -> bool {
    LEGACY_KEYS.iter().any(|(_, legacy)| *legacy == key)
}

/// Copy `legacy` onto `key`, then remove `legacy`.
///
/// - Missing, undecodable, null or empty-string legacy values migrate nothing
///   and leave the legacy key untouched.
/// - The legacy key is removed only after the new key was written.
/// - A failed removal is logged; the value already lives under the new key.
pub(super) fn migrate_legacy_key(
    backend: &dyn KvBackend,
    key: &str,
    legacy: &str,
) -> Result<Option<Value>> {
    let Some(raw) = backend.get_item(legacy)? else {
        return Ok(None);
    };

    let value: Value = match serde_json::from_str(&raw) {
        Ok(value) => value,
        Err(e) => {
            log::warn!(
                "Migration: legacy key {} is not valid JSON, leaving it in place: {}",
                legacy,
                e
            );
            return Ok(None);
        }
    };

    if is_blank(&value) {
        return Ok(None);
    }

    backend.set_item(key, &serde_json::to_string(&value)?)?;

    if let Err(e) = backend.remove_item(legacy) {
        log::warn!("Migration: copied {} → {} but could not remove legacy key: {}", legacy, key, e);
    } else {
        log::info!("Migration: moved {} → {}", legacy, key);
    }

    Ok(Some(value))
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kv::backend::MemoryBackend;

    #[test]
    fn test_legacy_key_table() {
        assert_eq!(legacy_key_for(SETS_KEY), Some(LEGACY_SETS_KEY));
        assert_eq!(legacy_key_for(ACTIVE_SET_KEY), Some(LEGACY_ACTIVE_SET_KEY));
        assert_eq!(legacy_key_for("flashcard-ai-voice"), None);
        assert!(is_legacy_key(LEGACY_SETS_KEY));
        assert!(!is_legacy_key(SETS_KEY));
    }

    #[test]
    fn test_migrate_copies_then_removes() {
        let backend = MemoryBackend::new();
        backend.set_item(LEGACY_ACTIVE_SET_KEY, "\"abc\"").unwrap();

        let value = migrate_legacy_key(&backend, ACTIVE_SET_KEY, LEGACY_ACTIVE_SET_KEY).unwrap();
        assert_eq!(value, Some(Value::String("abc".to_string())));
        assert_eq!(backend.get_item(ACTIVE_SET_KEY).unwrap().as_deref(), Some("\"abc\""));
        assert_eq!(backend.get_item(LEGACY_ACTIVE_SET_KEY).unwrap(), None);
    }

    #[test]
    fn test_corrupt_legacy_value_is_kept() {
        let backend = MemoryBackend::new();
        backend.set_item(LEGACY_SETS_KEY, "[{broken").unwrap();

        let value = migrate_legacy_key(&backend, SETS_KEY, LEGACY_SETS_KEY).unwrap();
        assert_eq!(value, None);
        assert_eq!(backend.get_item(SETS_KEY).unwrap(), None);
        assert_eq!(backend.get_item(LEGACY_SETS_KEY).unwrap().as_deref(), Some("[{broken"));
    }

    #[test]
    fn test_null_legacy_pointer_migrates_nothing() {
        let backend = MemoryBackend::new();
        backend.set_item(LEGACY_ACTIVE_SET_KEY, "null").unwrap();

        let value = migrate_legacy_key(&backend, ACTIVE_SET_KEY, LEGACY_ACTIVE_SET_KEY).unwrap();
        assert_eq!(value, None);
        assert_eq!(backend.get_item(ACTIVE_SET_KEY).unwrap(), None);
    }
}
