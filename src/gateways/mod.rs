//! Request/response contracts for the two network-facing collaborators
//!
//! - `generation`: topic in, ordered flashcards out
//! - `tts`: text in, playable audio out
//!
//! Both are plain async calls with no cancellation and no shared queue. The
//! `generate_flashcards` and `text_to_speech` wrappers turn any error into a
//! `GatewayFailure` message fit for a notification.

pub mod generation;
pub mod openai;
pub mod tts;

use thiserror::Error;

pub use generation::{
    generate_flashcards, FlashcardGenerator, GenerationRequest, OpenAiGenerator, TextLength,
};
pub use openai::OpenAiClient;
pub use tts::{text_to_speech, AudioClip, OpenAiSpeech, SpeechRequest, SpeechSynthesizer, AI_VOICES};

#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Authentication failed")]
    AuthFailed,

    #[error("Server error: {status} - {message}")]
    Upstream { status: u16, message: String },

    #[error("No flashcards were generated")]
    EmptyResult,

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),
}

pub type Result<T> = std::result::Result<T, GatewayError>;

/// A failed gateway call as the user sees it
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct GatewayFailure {
    pub message: String,
}

impl GatewayFailure {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
