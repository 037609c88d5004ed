//! Data models for flashcard sets

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Generate a fresh opaque id for a set or card
pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// A flashcard with question (front) and answer (back).
///
/// The back may carry lightweight Markdown, typically `**bold**` around the
/// most important term.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Flashcard {
    #[serde(default = "new_id")]
    pub id: String,
    #[serde(default)]
    pub front: String,
    #[serde(default)]
    pub back: String,
}

impl Flashcard {
    pub fn new(front: String, back: String) -> Self {
        Self {
            id: new_id(),
            front,
            back,
        }
    }
}

/// Card content without an id, as produced by generation or manual entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewFlashcard {
    pub front: String,
    pub back: String,
}

impl NewFlashcard {
    pub fn new(front: impl Into<String>, back: impl Into<String>) -> Self {
        Self {
            front: front.into(),
            back: back.into(),
        }
    }
}

impl From<NewFlashcard> for Flashcard {
    fn from(card: NewFlashcard) -> Self {
        Flashcard::new(card.front, card.back)
    }
}

/// A named, ordered collection of flashcards
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlashcardSet {
    #[serde(default = "new_id")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub flashcards: Vec<Flashcard>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

impl FlashcardSet {
    pub fn new(name: String, cards: Vec<NewFlashcard>) -> Self {
        Self {
            id: new_id(),
            name,
            flashcards: cards.into_iter().map(Flashcard::from).collect(),
            created_at: Utc::now(),
        }
    }

    pub fn card(&self, card_id: &str) -> Option<&Flashcard> {
        self.flashcards.iter().find(|c| c.id == card_id)
    }

    pub fn is_empty(&self) -> bool {
        self.flashcards.is_empty()
    }
}

/// Which set is open for study, if any
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ActiveSet {
    Active(String),
    #[default]
    None,
}

impl ActiveSet {
    pub fn id(&self) -> Option<&str> {
        match self {
            ActiveSet::Active(id) => Some(id.as_str()),
            ActiveSet::None => None,
        }
    }

    pub fn is_active(&self, set_id: &str) -> bool {
        matches!(self, ActiveSet::Active(id) if id == set_id)
    }
}

impl From<Option<String>> for ActiveSet {
    fn from(id: Option<String>) -> Self {
        match id {
            Some(id) => ActiveSet::Active(id),
            None => ActiveSet::None,
        }
    }
}

/// Immutable view of the repository handed to subscribers
#[derive(Debug, Clone, Default)]
pub struct RepositorySnapshot {
    /// Newest first
    pub sets: Vec<FlashcardSet>,
    pub active: ActiveSet,
}

impl RepositorySnapshot {
    pub fn get_set(&self, set_id: &str) -> Option<&FlashcardSet> {
        self.sets.iter().find(|s| s.id == set_id)
    }

    pub fn active_set(&self) -> Option<&FlashcardSet> {
        match &self.active {
            ActiveSet::Active(id) => self.get_set(id),
            ActiveSet::None => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_json_layout() {
        let set = FlashcardSet::new(
            "Rome".to_string(),
            vec![NewFlashcard::new("Who founded Rome?", "**Romulus**")],
        );
        let json = serde_json::to_value(&set).unwrap();

        assert!(json.get("createdAt").is_some());
        assert_eq!(json["flashcards"][0]["front"], "Who founded Rome?");
        assert_eq!(json["flashcards"][0]["back"], "**Romulus**");
    }

    #[test]
    fn test_decode_browser_era_set() {
        let raw = r#"{
            "id": "a",
            "name": "Old palace",
            "flashcards": [{"id": "c1", "front": "Q", "back": "A"}],
            "createdAt": "2024-03-05T10:20:30.123Z"
        }"#;
        let set: FlashcardSet = serde_json::from_str(raw).unwrap();
        assert_eq!(set.id, "a");
        assert_eq!(set.flashcards.len(), 1);
        assert_eq!(set.card("c1").unwrap().back, "A");
    }

    #[test]
    fn test_decode_set_with_missing_fields() {
        let raw = r#"{"id": "a", "name": "Old", "flashcards": [{"id": "c", "front": "Q"}, {"back": "A"}]}"#;
        let set: FlashcardSet = serde_json::from_str(raw).unwrap();
        assert_eq!(set.name, "Old");
        assert_eq!(set.card("c").unwrap().back, "");
        assert_eq!(set.flashcards[1].back, "A");
        assert!(!set.flashcards[1].id.is_empty());
    }

    #[test]
    fn test_fresh_ids_are_distinct() {
        let set = FlashcardSet::new(
            "Pairs".to_string(),
            vec![NewFlashcard::new("a", "b"), NewFlashcard::new("a", "b")],
        );
        assert_ne!(set.flashcards[0].id, set.flashcards[1].id);
        assert_ne!(set.id, set.flashcards[0].id);
    }
}
