use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};

use super::app_state::{EditField, Mode, TuiState};
use crate::render::terminal::parse_markup;

pub fn draw(f: &mut Frame, area: Rect, state: &TuiState) {
    let is_active = state.mode == Mode::Study;

    let Some(viewer) = state.viewer.as_ref() else {
        let block = bordered(" Study ".to_string(), false);
        let hint = Paragraph::new(vec![
            Line::from(""),
            Line::from(Span::styled(
                "  Select a set and press Enter to study it.",
                Style::default().fg(Color::DarkGray),
            )),
        ])
        .block(block);
        f.render_widget(hint, area);
        return;
    };

    let title = format!(" {}  {} ", state.study_title(), viewer.position_label());
    let block = bordered(title, is_active);

    if let Some(draft) = viewer.draft() {
        let field_style = |field: EditField| {
            if state.edit_field == field {
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::DarkGray)
            }
        };
        let cursor = |field: EditField| if state.edit_field == field { "\u{2588}" } else { "" };

        let text = vec![
            Line::from(Span::styled("Front", field_style(EditField::Front))),
            Line::from(format!("{}{}", draft.front, cursor(EditField::Front))),
            Line::from(""),
            Line::from(Span::styled("Back", field_style(EditField::Back))),
            Line::from(format!("{}{}", draft.back, cursor(EditField::Back))),
        ];
        let paragraph = Paragraph::new(text).block(block).wrap(Wrap { trim: false });
        f.render_widget(paragraph, area);
        return;
    }

    let Some(card) = viewer.current_card() else {
        let empty = Paragraph::new(vec![
            Line::from(""),
            Line::from(Span::styled("  No flashcards in this set.", Style::default().fg(Color::DarkGray))),
        ])
        .block(block);
        f.render_widget(empty, area);
        return;
    };

    let (label, body) = if state.flipped { ("Answer", &card.back) } else { ("Question", &card.front) };

    let mut text = vec![
        Line::from(Span::styled(label, Style::default().fg(Color::Magenta).add_modifier(Modifier::BOLD))),
        Line::from(""),
    ];
    text.extend(body.lines().map(markup_line));

    let paragraph = Paragraph::new(text)
        .block(block)
        .wrap(Wrap { trim: false });
    f.render_widget(paragraph, area);
}

fn bordered(title: String, is_active: bool) -> Block<'static> {
    Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(if is_active {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default().fg(Color::DarkGray)
        })
}

fn markup_line(line: &str) -> Line<'static> {
    let spans: Vec<Span> = parse_markup(line)
        .into_iter()
        .map(|seg| {
            let mut style = Style::default();
            if seg.bold {
                style = style.fg(Color::Yellow).add_modifier(Modifier::BOLD);
            }
            if seg.italic {
                style = style.add_modifier(Modifier::ITALIC);
            }
            Span::styled(seg.text, style)
        })
        .collect();
    Line::from(spans)
}
