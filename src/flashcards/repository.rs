//! In-memory flashcard sets mirrored write-through to a `KvStore`
//!
//! Persisted layout:
//! ```text
//! flashcard-ai-sets        # JSON array of sets, newest first
//! flashcard-ai-active-set  # JSON string id, or null
//! ```

use std::sync::Arc;

use serde::ser::{Serialize, SerializeSeq, Serializer};
use serde_json::Value;
use thiserror::Error;
use tokio::sync::watch;

use super::models::*;
use crate::kv::{KvStore, ACTIVE_SET_KEY, SETS_KEY};

#[derive(Error, Debug, PartialEq, Eq)]
pub enum FlashcardError {
    #[error("Set name must not be empty")]
    InvalidSetName,
}

pub type Result<T> = std::result::Result<T, FlashcardError>;

/// The collection of flashcard sets and the active-set pointer.
///
/// Every mutation updates memory first, then writes both records to the store.
/// Lookups on unknown ids are no-ops.
pub struct FlashcardRepository {
    store: KvStore,
    sets: Vec<FlashcardSet>,
    /// Stored records that don't decode as a set; written back untouched
    unreadable: Vec<Value>,
    active_set_id: Option<String>,
    updates: watch::Sender<Arc<RepositorySnapshot>>,
}

impl FlashcardRepository {
    /// Read persisted state once and build the repository
    pub fn load(store: KvStore) -> Self {
        let (sets, unreadable) = decode_sets(store.read(SETS_KEY));
        let mut active_set_id: Option<String> = store.load(ACTIVE_SET_KEY, None);

        if let Some(id) = &active_set_id {
            if !sets.iter().any(|s| &s.id == id) {
                log::debug!("Stored active set {} no longer exists, clearing", id);
                active_set_id = None;
                store.write(ACTIVE_SET_KEY, &active_set_id);
            }
        }

        log::info!("Loaded {} flashcard sets", sets.len());

        let snapshot = Arc::new(RepositorySnapshot {
            sets: sets.clone(),
            active: active_set_id.clone().into(),
        });
        let (updates, _) = watch::channel(snapshot);

        Self {
            store,
            sets,
            unreadable,
            active_set_id,
            updates,
        }
    }

    // ==================== Reads ====================

    /// All sets, newest first
    pub fn sets(&self) -> &[FlashcardSet] {
        &self.sets
    }

    pub fn get_set(&self, set_id: &str) -> Option<&FlashcardSet> {
        self.sets.iter().find(|s| s.id == set_id)
    }

    pub fn active(&self) -> ActiveSet {
        match &self.active_set_id {
            Some(id) if self.get_set(id).is_some() => ActiveSet::Active(id.clone()),
            _ => ActiveSet::None,
        }
    }

    pub fn active_set(&self) -> Option<&FlashcardSet> {
        self.active_set_id.as_deref().and_then(|id| self.get_set(id))
    }

    pub fn snapshot(&self) -> Arc<RepositorySnapshot> {
        self.updates.borrow().clone()
    }

    /// Receive a fresh snapshot after every effective mutation
    pub fn subscribe(&self) -> watch::Receiver<Arc<RepositorySnapshot>> {
        self.updates.subscribe()
    }

    // ==================== Set Operations ====================

    /// Create a set from generated cards and make it active
    pub fn create_set(&mut self, name: &str, cards: Vec<NewFlashcard>) -> Result<String> {
        if name.trim().is_empty() {
            return Err(FlashcardError::InvalidSetName);
        }

        let set = FlashcardSet::new(name.to_string(), cards);
        let id = set.id.clone();
        log::info!("Created set {} ({}) with {} cards", set.name, id, set.flashcards.len());

        self.sets.insert(0, set);
        self.active_set_id = Some(id.clone());
        self.commit();

        Ok(id)
    }

    /// Delete a set and all its cards
    pub fn delete_set(&mut self, set_id: &str) {
        let before = self.sets.len();
        self.sets.retain(|s| s.id != set_id);
        if self.sets.len() == before {
            log::debug!("delete_set: set {} not found", set_id);
            return;
        }

        if self.active_set_id.as_deref() == Some(set_id) {
            self.active_set_id = None;
        }
        log::info!("Deleted set {}", set_id);
        self.commit();
    }

    /// Point at a set, or at nothing. Unknown ids point at nothing.
    pub fn set_active(&mut self, set_id: Option<&str>) {
        let next = match set_id {
            Some(id) if self.get_set(id).is_none() => {
                log::debug!("set_active: set {} not found, clearing active set", id);
                None
            }
            other => other.map(str::to_string),
        };

        if next != self.active_set_id {
            self.active_set_id = next;
            self.commit();
        }
    }

    // ==================== Card Operations ====================

    /// Append a card to a set, returning its id
    pub fn add_card(&mut self, set_id: &str, card: NewFlashcard) -> Option<String> {
        let Some(set) = self.set_mut(set_id) else {
            log::debug!("add_card: set {} not found", set_id);
            return None;
        };

        let card = Flashcard::from(card);
        let id = card.id.clone();
        set.flashcards.push(card);
        self.commit();

        Some(id)
    }

    /// Replace both sides of a card
    pub fn update_card(&mut self, set_id: &str, card_id: &str, front: &str, back: &str) {
        let Some(card) = self
            .set_mut(set_id)
            .and_then(|s| s.flashcards.iter_mut().find(|c| c.id == card_id))
        else {
            log::debug!("update_card: card {} not found in set {}", card_id, set_id);
            return;
        };

        if card.front == front && card.back == back {
            return;
        }

        card.front = front.to_string();
        card.back = back.to_string();
        self.commit();
    }

    pub fn delete_card(&mut self, set_id: &str, card_id: &str) {
        let Some(set) = self.set_mut(set_id) else {
            log::debug!("delete_card: set {} not found", set_id);
            return;
        };

        let before = set.flashcards.len();
        set.flashcards.retain(|c| c.id != card_id);
        if set.flashcards.len() == before {
            log::debug!("delete_card: card {} not found in set {}", card_id, set_id);
            return;
        }
        self.commit();
    }

    fn set_mut(&mut self, set_id: &str) -> Option<&mut FlashcardSet> {
        self.sets.iter_mut().find(|s| s.id == set_id)
    }

    /// Mirror memory to storage, then notify subscribers
    fn commit(&mut self) {
        let record = SetsRecord {
            sets: &self.sets,
            unreadable: &self.unreadable,
        };
        self.store.write(SETS_KEY, &record);
        self.store.write(ACTIVE_SET_KEY, &self.active_set_id);

        self.updates.send_replace(Arc::new(RepositorySnapshot {
            sets: self.sets.clone(),
            active: self.active(),
        }));
    }
}

/// Decode the stored collection one record at a time.
///
/// Records that fail to decode are kept aside so a later write doesn't drop
/// them. A non-array value is kept as a single record.
fn decode_sets(stored: Option<Value>) -> (Vec<FlashcardSet>, Vec<Value>) {
    let records = match stored {
        None | Some(Value::Null) => return (Vec::new(), Vec::new()),
        Some(Value::Array(records)) => records,
        Some(other) => {
            log::warn!("Stored flashcard sets are not a list, keeping the value aside");
            return (Vec::new(), vec![other]);
        }
    };

    let mut sets = Vec::with_capacity(records.len());
    let mut unreadable = Vec::new();
    for record in records {
        match serde_json::from_value::<FlashcardSet>(record.clone()) {
            Ok(set) => sets.push(set),
            Err(e) => {
                log::warn!("Skipping unreadable flashcard set record: {}", e);
                unreadable.push(record);
            }
        }
    }
    (sets, unreadable)
}

/// The persisted collection: readable sets followed by the records kept aside
struct SetsRecord<'a> {
    sets: &'a [FlashcardSet],
    unreadable: &'a [Value],
}

impl Serialize for SetsRecord<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.sets.len() + self.unreadable.len()))?;
        for set in self.sets {
            seq.serialize_element(set)?;
        }
        for record in self.unreadable {
            seq.serialize_element(record)?;
        }
        seq.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kv::{KvBackend, MemoryBackend, LEGACY_ACTIVE_SET_KEY, LEGACY_SETS_KEY};

    fn cards(pairs: &[(&str, &str)]) -> Vec<NewFlashcard> {
        pairs.iter().map(|(f, b)| NewFlashcard::new(*f, *b)).collect()
    }

    fn create_test_repository() -> (FlashcardRepository, Arc<MemoryBackend>) {
        let backend = Arc::new(MemoryBackend::new());
        let repo = FlashcardRepository::load(KvStore::new(backend.clone()));
        (repo, backend)
    }

    #[test]
    fn test_create_set_preserves_order_and_activates() {
        let (mut repo, _backend) = create_test_repository();
        let older = repo.create_set("Older", cards(&[("x", "y")])).unwrap();
        let id = repo
            .create_set("Planets", cards(&[("Mercury", "1st"), ("Venus", "2nd"), ("Earth", "3rd")]))
            .unwrap();

        assert_eq!(repo.sets()[0].id, id);
        assert_eq!(repo.sets()[1].id, older);
        assert_eq!(repo.active(), ActiveSet::Active(id.clone()));

        let fronts: Vec<&str> = repo.get_set(&id).unwrap().flashcards.iter().map(|c| c.front.as_str()).collect();
        assert_eq!(fronts, vec!["Mercury", "Venus", "Earth"]);
    }

    #[test]
    fn test_create_set_rejects_blank_name() {
        let (mut repo, _backend) = create_test_repository();
        assert_eq!(repo.create_set("  ", Vec::new()), Err(FlashcardError::InvalidSetName));
        assert!(repo.sets().is_empty());
    }

    #[test]
    fn test_empty_set_is_valid() {
        let (mut repo, _backend) = create_test_repository();
        let id = repo.create_set("Empty", Vec::new()).unwrap();
        assert!(repo.get_set(&id).unwrap().is_empty());
    }

    #[test]
    fn test_delete_active_set_clears_pointer() {
        let (mut repo, _backend) = create_test_repository();
        let id = repo.create_set("Active", cards(&[("q", "a")])).unwrap();

        repo.delete_set(&id);
        assert_eq!(repo.active(), ActiveSet::None);
        assert!(repo.active_set().is_none());
    }

    #[test]
    fn test_delete_other_set_keeps_pointer() {
        let (mut repo, _backend) = create_test_repository();
        let other = repo.create_set("Other", Vec::new()).unwrap();
        let active = repo.create_set("Active", Vec::new()).unwrap();

        repo.delete_set(&other);
        assert_eq!(repo.active(), ActiveSet::Active(active));
        assert_eq!(repo.sets().len(), 1);
    }

    #[test]
    fn test_delete_unknown_set_is_noop() {
        let (mut repo, _backend) = create_test_repository();
        let id = repo.create_set("Keep", Vec::new()).unwrap();
        let rx = repo.subscribe();

        repo.delete_set("missing");
        assert_eq!(repo.sets().len(), 1);
        assert_eq!(repo.active(), ActiveSet::Active(id));
        assert!(!rx.has_changed().unwrap());
    }

    #[test]
    fn test_update_card_with_same_values_is_silent() {
        let (mut repo, _backend) = create_test_repository();
        let id = repo.create_set("Same", cards(&[("front", "back")])).unwrap();
        let card_id = repo.get_set(&id).unwrap().flashcards[0].id.clone();
        let before = repo.get_set(&id).unwrap().clone();
        let rx = repo.subscribe();

        repo.update_card(&id, &card_id, "front", "back");
        assert_eq!(repo.get_set(&id).unwrap(), &before);
        assert!(!rx.has_changed().unwrap());
    }

    #[test]
    fn test_update_card_replaces_both_sides() {
        let (mut repo, _backend) = create_test_repository();
        let id = repo.create_set("Edit", cards(&[("old q", "old a")])).unwrap();
        let card_id = repo.get_set(&id).unwrap().flashcards[0].id.clone();
        let mut rx = repo.subscribe();

        repo.update_card(&id, &card_id, "new q", "new a");
        let card = repo.get_set(&id).unwrap().card(&card_id).unwrap();
        assert_eq!((card.front.as_str(), card.back.as_str()), ("new q", "new a"));

        assert!(rx.has_changed().unwrap());
        let snapshot = rx.borrow_and_update().clone();
        assert_eq!(snapshot.get_set(&id).unwrap().flashcards[0].front, "new q");
    }

    #[test]
    fn test_missing_ids_are_noops() {
        let (mut repo, _backend) = create_test_repository();
        let id = repo.create_set("Stable", cards(&[("q", "a")])).unwrap();
        let before = repo.get_set(&id).unwrap().clone();
        let rx = repo.subscribe();

        repo.delete_card(&id, "no-such-card");
        repo.delete_card("no-such-set", "no-such-card");
        repo.update_card(&id, "no-such-card", "f", "b");
        assert_eq!(repo.add_card("no-such-set", NewFlashcard::new("f", "b")), None);

        assert_eq!(repo.get_set(&id).unwrap(), &before);
        assert_eq!(repo.active(), ActiveSet::Active(id));
        assert!(!rx.has_changed().unwrap());
    }

    #[test]
    fn test_set_active_none_and_back() {
        let (mut repo, _backend) = create_test_repository();
        let id = repo.create_set("Toggle", Vec::new()).unwrap();

        repo.set_active(None);
        assert_eq!(repo.active(), ActiveSet::None);

        repo.set_active(Some(&id));
        assert_eq!(repo.active_set().unwrap().name, "Toggle");
    }

    #[test]
    fn test_set_active_unknown_clears_pointer() {
        let (mut repo, backend) = create_test_repository();
        repo.create_set("A", Vec::new()).unwrap();
        let rx = repo.subscribe();

        repo.set_active(Some("bogus"));
        assert_eq!(repo.active(), ActiveSet::None);
        assert!(repo.active_set().is_none());
        assert!(rx.has_changed().unwrap());
        assert_eq!(backend.get_item(ACTIVE_SET_KEY).unwrap().as_deref(), Some("null"));
    }

    #[test]
    fn test_set_active_unknown_without_active_is_silent() {
        let (mut repo, _backend) = create_test_repository();
        let rx = repo.subscribe();
        repo.set_active(Some("bogus"));
        assert_eq!(repo.active(), ActiveSet::None);
        assert!(!rx.has_changed().unwrap());
    }

    #[test]
    fn test_delete_set_survives_reload() {
        let (mut repo, backend) = create_test_repository();
        let keep = repo.create_set("Keep", Vec::new()).unwrap();
        let gone = repo.create_set("Gone", Vec::new()).unwrap();
        repo.delete_set(&gone);

        let reloaded = FlashcardRepository::load(KvStore::new(backend));
        assert_eq!(reloaded.sets().len(), 1);
        assert_eq!(reloaded.sets()[0].id, keep);
        assert_eq!(reloaded.active(), ActiveSet::None);
    }

    #[test]
    fn test_card_edits_survive_reload() {
        let (mut repo, backend) = create_test_repository();
        let id = repo.create_set("Deck", cards(&[("q1", "a1"), ("q2", "a2")])).unwrap();
        let first = repo.get_set(&id).unwrap().flashcards[0].id.clone();
        let second = repo.get_set(&id).unwrap().flashcards[1].id.clone();

        repo.update_card(&id, &first, "Q1", "A1");
        repo.delete_card(&id, &second);

        let reloaded = FlashcardRepository::load(KvStore::new(backend));
        let set = reloaded.get_set(&id).unwrap();
        assert_eq!(set.flashcards.len(), 1);
        assert_eq!(set.flashcards[0].id, first);
        assert_eq!(set.flashcards[0].front, "Q1");
        assert_eq!(set.flashcards[0].back, "A1");
    }

    #[test]
    fn test_clearing_active_survives_reload() {
        let (mut repo, backend) = create_test_repository();
        repo.create_set("Deck", Vec::new()).unwrap();
        repo.set_active(None);

        let reloaded = FlashcardRepository::load(KvStore::new(backend));
        assert_eq!(reloaded.sets().len(), 1);
        assert_eq!(reloaded.active(), ActiveSet::None);
    }

    #[test]
    fn test_legacy_set_without_timestamp_is_kept() {
        let backend = Arc::new(MemoryBackend::new());
        backend
            .set_item(
                LEGACY_SETS_KEY,
                r#"[{"id":"a","name":"Old","flashcards":[{"id":"c","front":"Q","back":"A"}]}]"#,
            )
            .unwrap();

        let mut repo = FlashcardRepository::load(KvStore::new(backend.clone()));
        assert_eq!(repo.sets().len(), 1);
        assert_eq!(repo.get_set("a").unwrap().flashcards[0].back, "A");

        repo.create_set("New", Vec::new()).unwrap();
        let reloaded = FlashcardRepository::load(KvStore::new(backend));
        let names: Vec<&str> = reloaded.sets().iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["New", "Old"]);
    }

    #[test]
    fn test_unreadable_records_are_written_back() {
        let backend = Arc::new(MemoryBackend::new());
        backend
            .set_item(SETS_KEY, r#"[{"id":"a","name":"Fine"},42,{"id":"b","flashcards":"oops"}]"#)
            .unwrap();

        let mut repo = FlashcardRepository::load(KvStore::new(backend.clone()));
        assert_eq!(repo.sets().len(), 1);
        repo.create_set("New", Vec::new()).unwrap();

        let raw = backend.get_item(SETS_KEY).unwrap().unwrap();
        let stored: Vec<Value> = serde_json::from_str(&raw).unwrap();
        assert_eq!(stored.len(), 4);
        assert_eq!(stored[0]["name"], "New");
        assert_eq!(stored[1]["id"], "a");
        assert_eq!(stored[2], Value::from(42));
        assert_eq!(stored[3]["flashcards"], "oops");
    }

    #[test]
    fn test_write_through_survives_reload() {
        let (mut repo, backend) = create_test_repository();
        let id = repo.create_set("Persisted", cards(&[("q1", "a1")])).unwrap();
        repo.add_card(&id, NewFlashcard::new("q2", "a2")).unwrap();

        let reloaded = FlashcardRepository::load(KvStore::new(backend));
        assert_eq!(reloaded.sets().len(), 1);
        assert_eq!(reloaded.get_set(&id).unwrap().flashcards.len(), 2);
        assert_eq!(reloaded.active(), ActiveSet::Active(id));
    }

    #[test]
    fn test_stale_pointer_resolves_to_none_on_load() {
        let backend = Arc::new(MemoryBackend::new());
        backend.set_item(SETS_KEY, "[]").unwrap();
        backend.set_item(ACTIVE_SET_KEY, "\"gone\"").unwrap();

        let repo = FlashcardRepository::load(KvStore::new(backend.clone()));
        assert_eq!(repo.active(), ActiveSet::None);
        assert_eq!(backend.get_item(ACTIVE_SET_KEY).unwrap().as_deref(), Some("null"));
    }

    #[test]
    fn test_corrupt_storage_loads_empty() {
        let backend = Arc::new(MemoryBackend::new());
        backend.set_item(SETS_KEY, "not json").unwrap();
        backend.set_item(ACTIVE_SET_KEY, "42").unwrap();

        let repo = FlashcardRepository::load(KvStore::new(backend));
        assert!(repo.sets().is_empty());
        assert_eq!(repo.active(), ActiveSet::None);
    }

    #[test]
    fn test_unavailable_storage_still_works_in_memory() {
        let mut repo = FlashcardRepository::load(KvStore::unavailable());
        let id = repo.create_set("Ephemeral", cards(&[("q", "a")])).unwrap();
        assert_eq!(repo.get_set(&id).unwrap().flashcards.len(), 1);
    }

    #[test]
    fn test_loads_palace_era_data() {
        let backend = Arc::new(MemoryBackend::new());
        backend
            .set_item(
                LEGACY_SETS_KEY,
                r#"[{"id":"a","name":"Palace","flashcards":[{"id":"c","front":"Q","back":"A"}],"createdAt":"2024-01-01T00:00:00.000Z"}]"#,
            )
            .unwrap();
        backend.set_item(LEGACY_ACTIVE_SET_KEY, "\"a\"").unwrap();

        let repo = FlashcardRepository::load(KvStore::new(backend.clone()));
        assert_eq!(repo.active_set().unwrap().name, "Palace");
        assert_eq!(backend.get_item(LEGACY_SETS_KEY).unwrap(), None);
        assert_eq!(backend.get_item(LEGACY_ACTIVE_SET_KEY).unwrap(), None);
    }

    #[test]
    fn test_rome_scenario() {
        let (mut repo, _backend) = create_test_repository();

        let id = repo
            .create_set("Rome", cards(&[("Who founded Rome?", "Romulus")]))
            .unwrap();
        assert_eq!(repo.sets().len(), 1);
        assert_eq!(repo.sets()[0].name, "Rome");
        assert_eq!(repo.sets()[0].flashcards.len(), 1);
        assert_eq!(repo.active(), ActiveSet::Active(id.clone()));

        repo.add_card(&id, NewFlashcard::new("Capital?", "Rome")).unwrap();
        let fronts: Vec<&str> = repo.get_set(&id).unwrap().flashcards.iter().map(|c| c.front.as_str()).collect();
        assert_eq!(fronts, vec!["Who founded Rome?", "Capital?"]);

        repo.delete_set(&id);
        assert!(repo.sets().is_empty());
        assert_eq!(repo.active(), ActiveSet::None);
    }
}
