use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

use super::app_state::{Mode, TuiState};

pub fn draw(f: &mut Frame, area: Rect, state: &TuiState) {
    // Show flash message if present
    if let Some(ref msg) = state.flash_message {
        let flash = Paragraph::new(format!(" {}", msg))
            .style(Style::default().bg(Color::Green).fg(Color::Black));
        f.render_widget(flash, area);
        return;
    }

    if state.is_editing() {
        let prompt = Paragraph::new(" Editing  Tab: switch side  Enter: save  Esc: cancel ")
            .style(Style::default().bg(Color::Blue).fg(Color::White));
        f.render_widget(prompt, area);
        return;
    }

    let hints = match state.mode {
        Mode::Sets => " j/k: navigate  Enter: study  x: delete set  Tab: card  ?: help  q: quit ",
        Mode::Study => " \u{2190}/\u{2192}: prev/next  Space: flip  s: shuffle  e: edit  d: delete  Esc: sets  q: quit ",
    };

    let status = Paragraph::new(hints)
        .style(Style::default().bg(Color::DarkGray).fg(Color::White));
    f.render_widget(status, area);
}
