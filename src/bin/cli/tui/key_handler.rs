use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};

use super::app_state::{Mode, TuiState};

pub fn handle_key(state: &mut TuiState, key: KeyEvent) {
    // Clear flash message on any keypress
    state.flash_message = None;

    if state.show_help {
        state.show_help = false;
        return;
    }

    if state.is_editing() {
        handle_edit_key(state, key);
        return;
    }

    match state.mode {
        Mode::Sets => handle_sets_key(state, key),
        Mode::Study => handle_study_key(state, key),
    }
}

fn handle_sets_key(state: &mut TuiState, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => state.quit = true,
        KeyCode::Char('j') | KeyCode::Down => state.select_down(),
        KeyCode::Char('k') | KeyCode::Up => state.select_up(),
        KeyCode::Char('l') | KeyCode::Right | KeyCode::Enter => state.open_selected_set(),
        KeyCode::Char('x') => state.delete_selected_set(),
        KeyCode::Tab => {
            if state.viewer.is_some() {
                state.mode = Mode::Study;
            }
        }
        KeyCode::Char('?') => state.show_help = true,
        _ => {}
    }
}

fn handle_study_key(state: &mut TuiState, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => state.quit = true,
        KeyCode::Char('h') | KeyCode::Left => state.prev_card(),
        KeyCode::Char('l') | KeyCode::Right => state.next_card(),
        KeyCode::Char(' ') | KeyCode::Enter => state.flip(),
        KeyCode::Char('s') => state.shuffle(),
        KeyCode::Char('e') => state.toggle_edit(),
        KeyCode::Char('d') => state.delete_current_card(),
        KeyCode::Esc | KeyCode::Tab => state.mode = Mode::Sets,
        KeyCode::Char('?') => state.show_help = true,
        _ => {}
    }
}

fn handle_edit_key(state: &mut TuiState, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => state.cancel_edit(),
        KeyCode::Enter => state.toggle_edit(),
        KeyCode::Char('s') if key.modifiers.contains(KeyModifiers::CONTROL) => state.toggle_edit(),
        KeyCode::Tab | KeyCode::BackTab => state.switch_edit_field(),
        KeyCode::Backspace => state.edit_draft(|text| {
            text.pop();
        }),
        KeyCode::Char(c) => state.edit_draft(|text| text.push(c)),
        _ => {}
    }
}

pub fn handle_mouse(state: &mut TuiState, mouse: MouseEvent) {
    if state.is_editing() {
        return;
    }

    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => {
            let Some(area) = state.sets_area else {
                return;
            };
            let (col, row) = (mouse.column, mouse.row);
            if col < area.x || col >= area.x + area.width || row < area.y || row >= area.y + area.height {
                if state.viewer.is_some() {
                    state.mode = Mode::Study;
                }
                return;
            }

            state.mode = Mode::Sets;
            if let Some(clicked_idx) = state.set_index_at(row) {
                if state.set_selected == clicked_idx {
                    state.open_selected_set();
                } else {
                    state.set_selected = clicked_idx;
                }
            }
        }
        MouseEventKind::ScrollDown => match state.mode {
            Mode::Sets => state.select_down(),
            Mode::Study => state.next_card(),
        },
        MouseEventKind::ScrollUp => match state.mode {
            Mode::Sets => state.select_up(),
            Mode::Study => state.prev_card(),
        },
        _ => {}
    }
}
