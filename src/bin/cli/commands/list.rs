use anyhow::Result;

use crate::app::App;
use crate::render::terminal::{paint, Color};
use crate::OutputFormat;

pub fn run(app: &App, format: &OutputFormat, use_color: bool) -> Result<()> {
    let sets = app.repo.sets();
    let active = app.repo.active();

    match format {
        OutputFormat::Json => {
            let output: Vec<_> = sets
                .iter()
                .map(|set| {
                    serde_json::json!({
                        "id": set.id,
                        "name": set.name,
                        "cardCount": set.flashcards.len(),
                        "createdAt": set.created_at.to_rfc3339(),
                        "isActive": active.is_active(&set.id),
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Plain => {
            if sets.is_empty() {
                println!("No flashcard sets yet. Create one with `flashcard-cli generate <topic>`.");
                return Ok(());
            }
            for set in sets {
                let marker = if active.is_active(&set.id) { "* " } else { "  " };
                let date = set.created_at.format("%Y-%m-%d").to_string();
                println!(
                    "{}{} ({} cards) {}",
                    marker,
                    set.name,
                    set.flashcards.len(),
                    paint(&date, Color::GRAY, use_color)
                );
            }
        }
    }

    Ok(())
}
