use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use super::app_state::TuiState;
use super::{card_widget, set_list, status_bar};

const HELP: &[(&str, &str)] = &[
    ("j/k, \u{2191}/\u{2193}", "select set"),
    ("Enter", "study selected set"),
    ("x", "delete selected set"),
    ("\u{2190}/\u{2192}, h/l", "previous / next card"),
    ("Space", "flip card"),
    ("s", "shuffle cards"),
    ("e", "edit card, again to save"),
    ("d", "delete card"),
    ("Tab, Esc", "switch panel"),
    ("q", "quit"),
];

pub fn draw(f: &mut Frame, state: &mut TuiState) {
    let size = f.area();

    // Main layout: content area + status bar
    let outer = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(3),
            Constraint::Length(1),
        ])
        .split(size);

    let main_area = outer[0];
    let status_area = outer[1];

    // Horizontal split: sets (30%) | card (70%)
    let panels = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(30),
            Constraint::Percentage(70),
        ])
        .split(main_area);

    // Save area for mouse hit-testing
    state.sets_area = Some(panels[0]);

    set_list::draw(f, panels[0], state);
    card_widget::draw(f, panels[1], state);
    status_bar::draw(f, status_area, state);

    if state.show_help {
        draw_help(f, size);
    }
}

fn draw_help(f: &mut Frame, area: Rect) {
    let width = 48.min(area.width);
    let height = (HELP.len() as u16 + 2).min(area.height);
    let popup = Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    };

    let lines: Vec<Line> = HELP
        .iter()
        .map(|(keys, action)| {
            Line::from(vec![
                Span::styled(format!(" {:<16}", keys), Style::default().fg(Color::Cyan)),
                Span::raw(*action),
            ])
        })
        .collect();

    let help = Paragraph::new(lines).block(Block::default().title(" Keys ").borders(Borders::ALL));
    f.render_widget(Clear, popup);
    f.render_widget(help, popup);
}
