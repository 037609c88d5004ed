use anyhow::Result;

use crate::app::App;
use crate::render::terminal::{paint, render_markup, wrap_markup, Color};
use crate::OutputFormat;

pub fn run(app: &App, set: Option<&str>, format: &OutputFormat, use_color: bool) -> Result<()> {
    let set = app.resolve_set(set)?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(set)?);
        }
        OutputFormat::Plain => {
            println!("{}", paint(&set.name, Color::BOLD, use_color));
            println!(
                "{}",
                paint(&format!("{} cards, id {}", set.flashcards.len(), set.id), Color::GRAY, use_color)
            );
            println!();

            if set.is_empty() {
                println!("No flashcards in this set.");
                return Ok(());
            }

            for (i, card) in set.flashcards.iter().enumerate() {
                let number = format!("{:>3}.", i + 1);
                println!("{} {}", paint(&number, Color::CYAN, use_color), render_markup(&card.front, use_color));
                for line in wrap_markup(&card.back, "     ", 80, use_color) {
                    println!("{}", line);
                }
                println!();
            }
        }
    }

    Ok(())
}
