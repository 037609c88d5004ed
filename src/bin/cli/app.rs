use std::path::Path;

use anyhow::{bail, Context, Result};

use flashcard_ai_lib::config::AppConfig;
use flashcard_ai_lib::flashcards::{Flashcard, FlashcardRepository, FlashcardSet};
use flashcard_ai_lib::gateways::{OpenAiGenerator, OpenAiSpeech};
use flashcard_ai_lib::kv::KvStore;
use flashcard_ai_lib::open_store;
use flashcard_ai_lib::settings::TtsSettings;

/// Shared application state for CLI commands
pub struct App {
    pub config: AppConfig,
    pub repo: FlashcardRepository,
    pub settings: TtsSettings,
}

impl App {
    pub fn new(config_path: Option<&Path>, ephemeral: bool) -> Result<Self> {
        let config = AppConfig::load(config_path).context("Failed to load config")?;

        let store = if ephemeral {
            KvStore::in_memory()
        } else {
            open_store(&config)
        };

        let repo = FlashcardRepository::load(store.clone());
        let settings = TtsSettings::load(store);

        Ok(Self {
            config,
            repo,
            settings,
        })
    }

    /// Find a set by id or name (case-insensitive prefix match)
    pub fn find_set(&self, name: &str) -> Result<&FlashcardSet> {
        let sets = self.repo.sets();

        if let Some(set) = sets.iter().find(|s| s.id == name) {
            return Ok(set);
        }

        let name_lower = name.to_lowercase();

        // Exact match first
        if let Some(set) = sets.iter().find(|s| s.name.to_lowercase() == name_lower) {
            return Ok(set);
        }

        // Prefix match on name or id
        let matches: Vec<&FlashcardSet> = sets
            .iter()
            .filter(|s| s.name.to_lowercase().starts_with(&name_lower) || s.id.starts_with(name))
            .collect();

        match matches.len() {
            0 => bail!(
                "No set matching '{}'. Available sets:\n{}",
                name,
                sets.iter().map(|s| format!("  - {}", s.name)).collect::<Vec<_>>().join("\n")
            ),
            1 => Ok(matches[0]),
            _ => bail!(
                "Ambiguous set name '{}'. Matches:\n{}",
                name,
                matches.iter().map(|s| format!("  - {}", s.name)).collect::<Vec<_>>().join("\n")
            ),
        }
    }

    /// The named set, or the active set when no name is given
    pub fn resolve_set(&self, name: Option<&str>) -> Result<&FlashcardSet> {
        match name {
            Some(name) => self.find_set(name),
            None => self
                .repo
                .active_set()
                .context("No active set. Pass a set name or run `flashcard-cli use <set>`"),
        }
    }

    pub fn generator(&self) -> Result<OpenAiGenerator> {
        OpenAiGenerator::new(self.config.ai.clone()).context("Failed to set up flashcard generator")
    }

    pub fn synthesizer(&self) -> Result<OpenAiSpeech> {
        OpenAiSpeech::new(&self.config).context("Failed to set up text-to-speech")
    }
}

/// Find a card by 1-based position or id prefix
pub fn find_card<'a>(set: &'a FlashcardSet, reference: &str) -> Result<&'a Flashcard> {
    if let Ok(position) = reference.parse::<usize>() {
        return match position.checked_sub(1).and_then(|i| set.flashcards.get(i)) {
            Some(card) => Ok(card),
            None => bail!(
                "Set '{}' has {} cards; no card number {}",
                set.name,
                set.flashcards.len(),
                position
            ),
        };
    }

    let matches: Vec<&Flashcard> = set
        .flashcards
        .iter()
        .filter(|c| c.id.starts_with(reference))
        .collect();

    match matches.len() {
        0 => bail!("No card with id '{}' in set '{}'", reference, set.name),
        1 => Ok(matches[0]),
        _ => bail!("Ambiguous card id '{}'", reference),
    }
}
