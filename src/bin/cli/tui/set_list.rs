use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, List, ListItem, ListState};

use super::app_state::{Mode, TuiState};

pub fn draw(f: &mut Frame, area: Rect, state: &mut TuiState) {
    let is_active = state.mode == Mode::Sets;
    let active = state.app.repo.active();

    let block = Block::default()
        .title(" Flashcard Sets ")
        .borders(Borders::ALL)
        .border_style(if is_active {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default().fg(Color::DarkGray)
        });

    let items: Vec<ListItem> = state
        .app
        .repo
        .sets()
        .iter()
        .map(|set| {
            let (marker, style) = if active.is_active(&set.id) {
                ("\u{2022} ", Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
            } else {
                ("  ", Style::default().fg(Color::White))
            };
            let text = Line::from(vec![
                Span::styled(format!("{}{}", marker, set.name), style),
                Span::styled(format!(" ({})", set.flashcards.len()), Style::default().fg(Color::DarkGray)),
            ]);
            ListItem::new(text)
        })
        .collect();

    if items.is_empty() {
        let empty = ratatui::widgets::Paragraph::new(vec![
            Line::from(""),
            Line::from(Span::styled(
                "  No sets yet. Create one with",
                Style::default().fg(Color::DarkGray),
            )),
            Line::from(Span::styled(
                "  flashcard-cli generate <topic>",
                Style::default().fg(Color::DarkGray),
            )),
        ])
        .block(block);
        f.render_widget(empty, area);
        return;
    }

    let list = List::new(items)
        .block(block)
        .highlight_style(
            Style::default()
                .bg(if is_active { Color::DarkGray } else { Color::Black })
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    let mut list_state = ListState::default().with_offset(state.set_list_offset);
    list_state.select(Some(state.set_selected));

    f.render_stateful_widget(list, area, &mut list_state);
    state.set_list_offset = list_state.offset();
}
