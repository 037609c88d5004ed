use std::sync::Arc;

use anyhow::Result;
use ratatui::prelude::Rect;
use tokio::sync::watch;

use flashcard_ai_lib::flashcards::{RepositorySnapshot, StudyViewer};

use crate::app::App;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Sets,
    Study,
}

/// Side of the draft receiving keystrokes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditField {
    Front,
    Back,
}

pub struct TuiState {
    pub app: App,
    pub mode: Mode,

    // Set list state
    pub set_selected: usize,
    /// First visible row of the set list, as last drawn
    pub set_list_offset: usize,
    pub sets_area: Option<Rect>,

    // Study state
    pub viewer: Option<StudyViewer>,
    pub flipped: bool,
    pub edit_field: EditField,

    updates: watch::Receiver<Arc<RepositorySnapshot>>,

    pub flash_message: Option<String>,
    pub show_help: bool,
    pub quit: bool,
}

impl TuiState {
    pub fn new(app: App, set: Option<&str>) -> Result<Self> {
        if let Some(reference) = set {
            let id = app.find_set(reference)?.id.clone();
            let mut app = app;
            app.repo.set_active(Some(&id));
            return Ok(Self::open(app));
        }
        Ok(Self::open(app))
    }

    fn open(app: App) -> Self {
        let updates = app.repo.subscribe();
        let mut state = Self {
            app,
            mode: Mode::Sets,
            set_selected: 0,
            set_list_offset: 0,
            sets_area: None,
            viewer: None,
            flipped: false,
            edit_field: EditField::Front,
            updates,
            flash_message: None,
            show_help: false,
            quit: false,
        };

        if let Some(active) = state.app.repo.active_set() {
            let id = active.id.clone();
            state.set_selected = state.app.repo.sets().iter().position(|s| s.id == id).unwrap_or(0);
            state.viewer = Some(StudyViewer::new(active));
            state.mode = Mode::Study;
        }
        state
    }

    /// Apply repository changes published since the last frame
    pub fn pull_updates(&mut self) {
        if !self.updates.has_changed().unwrap_or(false) {
            return;
        }
        let snapshot = self.updates.borrow_and_update().clone();

        let mut set_gone = false;
        if let Some(viewer) = self.viewer.as_mut() {
            match snapshot.get_set(viewer.set_id()) {
                Some(set) => viewer.refresh(Some(set)),
                None => set_gone = true,
            }
        }
        if set_gone {
            self.viewer = None;
            self.mode = Mode::Sets;
        }

        self.set_selected = self.set_selected.min(snapshot.sets.len().saturating_sub(1));
    }

    // ==================== Set list ====================

    pub fn select_down(&mut self) {
        if self.set_selected + 1 < self.app.repo.sets().len() {
            self.set_selected += 1;
        }
    }

    pub fn select_up(&mut self) {
        self.set_selected = self.set_selected.saturating_sub(1);
    }

    /// Index of the set drawn at terminal row `row`, if any
    pub fn set_index_at(&self, row: u16) -> Option<usize> {
        let area = self.sets_area?;
        // Inside the borders
        if row <= area.y || row + 1 >= area.y + area.height {
            return None;
        }
        let index = self.set_list_offset + (row - area.y - 1) as usize;
        (index < self.app.repo.sets().len()).then_some(index)
    }

    /// Make the highlighted set active and start studying it
    pub fn open_selected_set(&mut self) {
        let Some(set) = self.app.repo.sets().get(self.set_selected) else {
            return;
        };
        let id = set.id.clone();
        self.viewer = Some(StudyViewer::new(set));
        self.app.repo.set_active(Some(&id));
        self.flipped = false;
        self.mode = Mode::Study;
    }

    pub fn delete_selected_set(&mut self) {
        let Some(set) = self.app.repo.sets().get(self.set_selected) else {
            return;
        };
        let (id, name) = (set.id.clone(), set.name.clone());
        self.app.repo.delete_set(&id);
        if self.viewer.as_ref().is_some_and(|v| v.set_id() == id) {
            self.viewer = None;
        }
        self.set_selected = self.set_selected.min(self.app.repo.sets().len().saturating_sub(1));
        self.flash_message = Some(format!("Deleted set {}", name));
    }

    pub fn study_title(&self) -> String {
        self.viewer
            .as_ref()
            .and_then(|v| self.app.repo.get_set(v.set_id()))
            .map(|s| s.name.clone())
            .unwrap_or_default()
    }

    // ==================== Study ====================

    pub fn next_card(&mut self) {
        if let Some(viewer) = self.viewer.as_mut() {
            if viewer.next() {
                self.flipped = false;
            }
        }
    }

    pub fn prev_card(&mut self) {
        if let Some(viewer) = self.viewer.as_mut() {
            if viewer.prev() {
                self.flipped = false;
            }
        }
    }

    pub fn shuffle(&mut self) {
        let Some(viewer) = self.viewer.as_mut() else {
            return;
        };
        if viewer.shuffle() {
            self.flipped = false;
            self.flash_message = Some("Shuffled".to_string());
        }
    }

    pub fn flip(&mut self) {
        if self.viewer.as_ref().is_some_and(|v| v.current_card().is_some()) {
            self.flipped = !self.flipped;
        }
    }

    pub fn is_editing(&self) -> bool {
        self.viewer.as_ref().is_some_and(|v| v.is_editing())
    }

    /// Start editing, or save the draft when already editing
    pub fn toggle_edit(&mut self) {
        let Some(viewer) = self.viewer.as_mut() else {
            return;
        };
        if viewer.is_editing() {
            if viewer.finish_edit(&mut self.app.repo) {
                self.flash_message = Some("Card saved".to_string());
            }
            return;
        }
        viewer.toggle_edit(&mut self.app.repo);
        self.edit_field = if self.flipped { EditField::Back } else { EditField::Front };
    }

    pub fn cancel_edit(&mut self) {
        if let Some(viewer) = self.viewer.as_mut() {
            viewer.cancel_edit();
        }
    }

    pub fn switch_edit_field(&mut self) {
        self.edit_field = match self.edit_field {
            EditField::Front => EditField::Back,
            EditField::Back => EditField::Front,
        };
    }

    pub fn edit_draft(&mut self, edit: impl FnOnce(&mut String)) {
        let Some(viewer) = self.viewer.as_mut() else {
            return;
        };
        let Some(draft) = viewer.draft() else {
            return;
        };

        match self.edit_field {
            EditField::Front => {
                let mut text = draft.front.clone();
                edit(&mut text);
                viewer.set_draft_front(text);
            }
            EditField::Back => {
                let mut text = draft.back.clone();
                edit(&mut text);
                viewer.set_draft_back(text);
            }
        }
    }

    pub fn delete_current_card(&mut self) {
        let Some(viewer) = self.viewer.as_mut() else {
            return;
        };
        if viewer.current_card().is_none() {
            return;
        }
        viewer.delete_current(&mut self.app.repo);
        self.flipped = false;
        self.flash_message = Some("Card deleted".to_string());
    }
}
