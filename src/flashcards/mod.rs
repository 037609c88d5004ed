//! Flashcard sets and study sessions
//!
//! This module provides:
//! - Set and card models with the persisted JSON layout
//! - The write-through repository and its active-set pointer
//! - The study viewer (navigation, shuffle, in-place editing)

pub mod models;
pub mod repository;
pub mod viewer;

pub use models::*;
pub use repository::{FlashcardError, FlashcardRepository};
pub use viewer::{CardDraft, StudyViewer};
