use anyhow::{bail, Context, Result};

use flashcard_ai_lib::gateways::generation::{MAX_FLASHCARDS, MIN_FLASHCARDS};
use flashcard_ai_lib::gateways::{generate_flashcards, GenerationRequest, TextLength};

use crate::app::App;
use crate::render::terminal::{paint, Color};
use crate::OutputFormat;

pub const MAX_NAME_CHARS: usize = 100;
pub const MAX_CONTENT_CHARS: usize = 400_000;

/// Input of the "new set" form
#[derive(Debug, Clone)]
pub struct GenerateForm {
    pub name: String,
    /// Source text; when present it is the topic and `name` only names the set
    pub content: Option<String>,
    pub count: u32,
    pub front: TextLength,
    pub back: TextLength,
}

impl GenerateForm {
    pub fn validate(&self) -> Result<()> {
        let name_len = self.name.trim().chars().count();
        if name_len == 0 {
            bail!("Set name must not be empty");
        }
        if name_len > MAX_NAME_CHARS {
            bail!("Set name must be at most {} characters", MAX_NAME_CHARS);
        }
        if let Some(content) = &self.content {
            if content.chars().count() > MAX_CONTENT_CHARS {
                bail!("Content must be at most {} characters", MAX_CONTENT_CHARS);
            }
        }
        if !(MIN_FLASHCARDS..=MAX_FLASHCARDS).contains(&self.count) {
            bail!(
                "Number of flashcards must be between {} and {}",
                MIN_FLASHCARDS,
                MAX_FLASHCARDS
            );
        }
        Ok(())
    }

    pub fn to_request(&self) -> GenerationRequest {
        let topic = match &self.content {
            Some(content) if !content.trim().is_empty() => content.clone(),
            _ => self.name.trim().to_string(),
        };
        GenerationRequest {
            topic,
            num_flashcards: self.count,
            front_text_length: self.front,
            back_text_length: self.back,
        }
    }
}

pub fn run(app: &mut App, form: GenerateForm, format: &OutputFormat, use_color: bool) -> Result<()> {
    form.validate()?;

    let request = form.to_request();
    let generator = app.generator()?;
    let runtime = tokio::runtime::Runtime::new().context("Failed to start async runtime")?;

    eprintln!("Generating {} flashcards...", request.num_flashcards);
    let cards = match runtime.block_on(generate_flashcards(&generator, &request)) {
        Ok(cards) => cards,
        Err(failure) => bail!("{}", failure),
    };

    let name = form.name.trim();
    let set_id = app.repo.create_set(name, cards)?;
    let card_count = app.repo.get_set(&set_id).map_or(0, |s| s.flashcards.len());

    match format {
        OutputFormat::Json => {
            let output = serde_json::json!({
                "id": set_id,
                "name": name,
                "cardCount": card_count,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Plain => {
            println!("{}", paint("Flashcard Set Created!", Color::GREEN, use_color));
            println!("Your new set \"{}\" is ready. ({} cards)", name, card_count);
        }
    }

    Ok(())
}
