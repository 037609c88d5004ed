//! Study session state for one flashcard set
//!
//! The viewer keeps its own working order of card ids, so shuffling never
//! touches the repository. Whenever the set's cards change upstream the working
//! order is reset to repository order.

use rand::Rng;

use super::models::{Flashcard, FlashcardSet};
use super::repository::FlashcardRepository;

/// Text being edited for the current card
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardDraft {
    pub card_id: String,
    pub front: String,
    pub back: String,
}

#[derive(Debug, Clone)]
pub struct StudyViewer {
    set_id: String,
    /// Cards as last synchronized from the repository
    cards: Vec<Flashcard>,
    display_order: Vec<String>,
    current_index: usize,
    editing: bool,
    draft: Option<CardDraft>,
}

impl StudyViewer {
    pub fn new(set: &FlashcardSet) -> Self {
        Self {
            set_id: set.id.clone(),
            cards: set.flashcards.clone(),
            display_order: set.flashcards.iter().map(|c| c.id.clone()).collect(),
            current_index: 0,
            editing: false,
            draft: None,
        }
    }

    pub fn set_id(&self) -> &str {
        &self.set_id
    }

    pub fn display_order(&self) -> &[String] {
        &self.display_order
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn len(&self) -> usize {
        self.display_order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.display_order.is_empty()
    }

    pub fn is_editing(&self) -> bool {
        self.editing
    }

    pub fn draft(&self) -> Option<&CardDraft> {
        self.draft.as_ref()
    }

    pub fn current_card(&self) -> Option<&Flashcard> {
        let id = self.display_order.get(self.current_index)?;
        self.cards.iter().find(|c| &c.id == id)
    }

    /// "3 / 10", or "0 / 0" for an empty set
    pub fn position_label(&self) -> String {
        if self.is_empty() {
            "0 / 0".to_string()
        } else {
            format!("{} / {}", self.current_index + 1, self.len())
        }
    }

    pub fn can_prev(&self) -> bool {
        !self.editing && self.current_index > 0
    }

    pub fn can_next(&self) -> bool {
        !self.editing && self.current_index + 1 < self.len()
    }

    pub fn can_shuffle(&self) -> bool {
        self.len() >= 2
    }

    // ==================== Load / refresh ====================

    /// Resynchronize with the set's current cards. Unchanged cards are a no-op.
    pub fn refresh(&mut self, set: Option<&FlashcardSet>) {
        let cards: &[Flashcard] = set.map(|s| s.flashcards.as_slice()).unwrap_or(&[]);
        if cards == self.cards.as_slice() {
            return;
        }

        self.cards = cards.to_vec();
        self.display_order = self.cards.iter().map(|c| c.id.clone()).collect();
        if self.current_index >= self.display_order.len() {
            self.current_index = self.display_order.len().saturating_sub(1);
        }
        self.editing = false;
        self.draft = None;
    }

    /// Refresh straight from the repository
    pub fn sync(&mut self, repo: &FlashcardRepository) {
        let set = repo.get_set(&self.set_id);
        self.refresh(set);
    }

    // ==================== Navigation ====================

    pub fn next(&mut self) -> bool {
        if !self.can_next() {
            return false;
        }
        self.current_index += 1;
        true
    }

    pub fn prev(&mut self) -> bool {
        if !self.can_prev() {
            return false;
        }
        self.current_index -= 1;
        true
    }

    /// Shuffle the working order with the thread-local RNG
    pub fn shuffle(&mut self) -> bool {
        self.shuffle_with(&mut rand::thread_rng())
    }

    /// Fisher–Yates over the working order; needs at least two cards
    pub fn shuffle_with<R: Rng + ?Sized>(&mut self, rng: &mut R) -> bool {
        if !self.can_shuffle() {
            return false;
        }

        for i in (1..self.display_order.len()).rev() {
            let j = rng.gen_range(0..=i);
            self.display_order.swap(i, j);
        }
        self.current_index = 0;
        self.editing = false;
        self.draft = None;
        true
    }

    // ==================== Editing ====================

    /// Enter edit mode, or save and leave it
    pub fn toggle_edit(&mut self, repo: &mut FlashcardRepository) {
        if self.editing {
            self.finish_edit(repo);
            return;
        }

        let Some(card) = self.current_card() else {
            return;
        };
        self.draft = Some(CardDraft {
            card_id: card.id.clone(),
            front: card.front.clone(),
            back: card.back.clone(),
        });
        self.editing = true;
    }

    pub fn set_draft_front(&mut self, text: impl Into<String>) {
        if let Some(draft) = self.draft.as_mut() {
            draft.front = text.into();
        }
    }

    pub fn set_draft_back(&mut self, text: impl Into<String>) {
        if let Some(draft) = self.draft.as_mut() {
            draft.back = text.into();
        }
    }

    /// Commit changed sides of the draft, then leave edit mode.
    ///
    /// Returns whether anything was written.
    pub fn finish_edit(&mut self, repo: &mut FlashcardRepository) -> bool {
        let draft = self.draft.take();
        self.editing = false;

        let Some(draft) = draft else {
            return false;
        };
        let Some(original) = self.cards.iter().find(|c| c.id == draft.card_id) else {
            return false;
        };

        let front = draft.front.trim();
        let back = draft.back.trim();
        if front == original.front && back == original.back {
            return false;
        }

        let (front, back) = (front.to_string(), back.to_string());
        repo.update_card(&self.set_id, &draft.card_id, &front, &back);
        self.sync(repo);
        true
    }

    /// Leave edit mode without writing anything
    pub fn cancel_edit(&mut self) {
        self.editing = false;
        self.draft = None;
    }

    /// Delete the card under the cursor
    pub fn delete_current(&mut self, repo: &mut FlashcardRepository) {
        let Some(card_id) = self.current_card().map(|c| c.id.clone()) else {
            return;
        };
        self.editing = false;
        self.draft = None;

        repo.delete_card(&self.set_id, &card_id);
        self.sync(repo);
    }
}
