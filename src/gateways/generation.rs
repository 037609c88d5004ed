//! Flashcard generation from a topic or pasted content

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::openai::{ChatMessage, ChatRequest, OpenAiClient};
use super::{GatewayError, GatewayFailure, Result};
use crate::config::AiConfig;
use crate::flashcards::NewFlashcard;

pub const MIN_FLASHCARDS: u32 = 5;
pub const MAX_FLASHCARDS: u32 = 100;
pub const DEFAULT_FLASHCARDS: u32 = 10;

pub const EMPTY_RESULT_MESSAGE: &str =
    "The AI could not generate flashcards for this topic. Please try a different one.";
pub const UNEXPECTED_ERROR_MESSAGE: &str = "An unexpected error occurred. Please try again later.";

/// Desired length of one side of a card
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TextLength {
    #[default]
    Short,
    Medium,
    Long,
}

impl TextLength {
    pub fn as_str(&self) -> &'static str {
        match self {
            TextLength::Short => "short",
            TextLength::Medium => "medium",
            TextLength::Long => "long",
        }
    }
}

impl fmt::Display for TextLength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TextLength {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "short" => Ok(TextLength::Short),
            "medium" => Ok(TextLength::Medium),
            "long" => Ok(TextLength::Long),
            other => Err(format!("unknown text length '{}' (expected short, medium or long)", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRequest {
    /// Topic description or pasted source content
    pub topic: String,
    pub num_flashcards: u32,
    pub front_text_length: TextLength,
    pub back_text_length: TextLength,
}

impl GenerationRequest {
    pub fn new(topic: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            num_flashcards: DEFAULT_FLASHCARDS,
            front_text_length: TextLength::Short,
            back_text_length: TextLength::Medium,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.topic.trim().is_empty() {
            return Err(GatewayError::InvalidRequest("topic must not be empty".to_string()));
        }
        if !(MIN_FLASHCARDS..=MAX_FLASHCARDS).contains(&self.num_flashcards) {
            return Err(GatewayError::InvalidRequest(format!(
                "number of flashcards must be between {} and {}",
                MIN_FLASHCARDS, MAX_FLASHCARDS
            )));
        }
        Ok(())
    }
}

#[async_trait]
pub trait FlashcardGenerator: Send + Sync {
    /// Produce cards in presentation order
    async fn generate(&self, request: &GenerationRequest) -> Result<Vec<NewFlashcard>>;
}

/// Call the generator and reduce every failure to a user-facing message.
///
/// An empty card list counts as a failure.
pub async fn generate_flashcards(
    generator: &dyn FlashcardGenerator,
    request: &GenerationRequest,
) -> std::result::Result<Vec<NewFlashcard>, GatewayFailure> {
    if let Err(e) = request.validate() {
        return Err(GatewayFailure::new(e.to_string()));
    }

    match generator.generate(request).await {
        Ok(cards) if !cards.is_empty() => {
            log::info!("Generated {} flashcards", cards.len());
            Ok(cards)
        }
        Ok(_) | Err(GatewayError::EmptyResult) => {
            log::error!("Flashcard generation returned no cards");
            Err(GatewayFailure::new(EMPTY_RESULT_MESSAGE))
        }
        Err(e) => {
            log::error!("Error generating flashcards: {}", e);
            Err(GatewayFailure::new(UNEXPECTED_ERROR_MESSAGE))
        }
    }
}

/// Generator backed by an OpenAI-compatible chat completion endpoint
pub struct OpenAiGenerator {
    client: OpenAiClient,
    config: AiConfig,
}

impl OpenAiGenerator {
    pub fn new(config: AiConfig) -> Result<Self> {
        let client = OpenAiClient::new(
            &config.base_url,
            config.api_key.clone(),
            Duration::from_secs(config.timeout_secs),
        )?;
        Ok(Self { client, config })
    }
}

#[async_trait]
impl FlashcardGenerator for OpenAiGenerator {
    async fn generate(&self, request: &GenerationRequest) -> Result<Vec<NewFlashcard>> {
        let body = ChatRequest {
            model: self.config.model.clone(),
            messages: vec![
                ChatMessage::system("You are a flashcard generation expert. You reply with JSON only."),
                ChatMessage::user(build_prompt(request)),
            ],
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
            response_format: Some(serde_json::json!({ "type": "json_object" })),
        };

        let content = self.client.chat(&body).await?;
        parse_flashcards(&content)
    }
}

pub fn build_prompt(request: &GenerationRequest) -> String {
    format!(
        "Generate {count} flashcards on the topic of {topic}.\n\n\
         The front of each flashcard should be {front} in length and contain the question or concept.\n\
         The back of each flashcard should be {back} in length and contain the answer or notes.\n\n\
         Format the back with Markdown and bold the most important keyword or phrase of the answer \
         with double asterisks (e.g. **this is bold**).\n\n\
         Reply with a JSON object of the form:\n\
         {{\"flashcards\": [{{\"front\": \"What is the capital of France?\", \"back\": \"The capital of France is **Paris**.\"}}]}}",
        count = request.num_flashcards,
        topic = request.topic,
        front = request.front_text_length,
        back = request.back_text_length,
    )
}

#[derive(Deserialize)]
#[serde(untagged)]
enum CardsPayload {
    List(Vec<NewFlashcard>),
    Wrapped { flashcards: Vec<NewFlashcard> },
}

/// Decode a model reply into cards.
///
/// Accepts a bare array or `{"flashcards": [...]}`, optionally inside a
/// Markdown code fence. Cards with a blank front are dropped.
pub fn parse_flashcards(content: &str) -> Result<Vec<NewFlashcard>> {
    let json = strip_code_fence(content);
    let payload: CardsPayload = serde_json::from_str(json)?;

    let cards = match payload {
        CardsPayload::List(cards) => cards,
        CardsPayload::Wrapped { flashcards } => flashcards,
    };

    let cards: Vec<NewFlashcard> = cards
        .into_iter()
        .filter(|c| !c.front.trim().is_empty())
        .collect();

    if cards.is_empty() {
        return Err(GatewayError::EmptyResult);
    }
    Ok(cards)
}

fn strip_code_fence(content: &str) -> &str {
    let trimmed = content.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Skip an optional language tag on the opening fence
    let rest = rest.split_once('\n').map_or(rest, |(_, body)| body);
    rest.trim_end().strip_suffix("```").unwrap_or(rest).trim()
}
