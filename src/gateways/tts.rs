//! Text-to-speech for reading cards aloud

use std::time::Duration;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};

use super::openai::{OpenAiClient, SpeechBody};
use super::{GatewayError, GatewayFailure, Result};
use crate::config::{AppConfig, TtsConfig};

/// Selectable AI voices
pub const AI_VOICES: &[&str] = &[
    "Algenib", "Achernar", "Enif", "Hadar", "Kraz", "Mirfak", "Sarin", "Wezen", "Deneb",
];

pub const DEFAULT_VOICE: &str = "Algenib";

pub const TTS_ERROR_MESSAGE: &str = "An unexpected error occurred during text-to-speech conversion.";

pub fn is_known_voice(voice: &str) -> bool {
    AI_VOICES.iter().any(|v| v.eq_ignore_ascii_case(voice))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpeechRequest {
    pub text: String,
    /// Named voice; provider default when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voice: Option<String>,
}

/// Synthesized audio
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioClip {
    pub mime_type: String,
    pub data: Vec<u8>,
}

impl AudioClip {
    /// `data:` URI suitable for an audio element source
    pub fn to_data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, STANDARD.encode(&self.data))
    }

    /// File extension matching the mime type
    pub fn extension(&self) -> &'static str {
        match self.mime_type.as_str() {
            "audio/mpeg" | "audio/mp3" => "mp3",
            "audio/wav" | "audio/x-wav" | "audio/wave" => "wav",
            "audio/ogg" | "audio/opus" => "ogg",
            "audio/aac" => "aac",
            "audio/flac" => "flac",
            _ => "bin",
        }
    }
}

#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    async fn synthesize(&self, request: &SpeechRequest) -> Result<AudioClip>;
}

/// Call the synthesizer and reduce every failure to a user-facing message
pub async fn text_to_speech(
    synthesizer: &dyn SpeechSynthesizer,
    request: &SpeechRequest,
) -> std::result::Result<AudioClip, GatewayFailure> {
    if request.text.trim().is_empty() {
        return Err(GatewayFailure::new("There is no text to read aloud."));
    }

    synthesizer.synthesize(request).await.map_err(|e| {
        log::error!("Error converting text to speech: {}", e);
        GatewayFailure::new(TTS_ERROR_MESSAGE)
    })
}

/// Synthesizer backed by an OpenAI-compatible `/audio/speech` endpoint
pub struct OpenAiSpeech {
    client: OpenAiClient,
    config: TtsConfig,
}

impl OpenAiSpeech {
    pub fn new(config: &AppConfig) -> Result<Self> {
        let client = OpenAiClient::new(
            config.tts_base_url(),
            config.tts_api_key().map(str::to_string),
            Duration::from_secs(config.ai.timeout_secs),
        )?;
        Ok(Self {
            client,
            config: config.tts.clone(),
        })
    }

    fn speech_body(&self, request: &SpeechRequest) -> SpeechBody {
        let voice = request.voice.as_deref().unwrap_or(DEFAULT_VOICE);
        SpeechBody {
            model: self.config.model.clone(),
            input: request.text.clone(),
            voice: self.config.provider_voice(voice).to_string(),
            response_format: self.config.response_format.clone(),
        }
    }
}

#[async_trait]
impl SpeechSynthesizer for OpenAiSpeech {
    async fn synthesize(&self, request: &SpeechRequest) -> Result<AudioClip> {
        let body = self.speech_body(request);

        let response = self.client.speech(&body).await?;
        if response.data.is_empty() {
            return Err(GatewayError::MalformedResponse("empty audio payload".to_string()));
        }

        let mime_type = response
            .content_type
            .filter(|ct| ct.starts_with("audio/"))
            .unwrap_or_else(|| mime_for_format(&self.config.response_format).to_string());

        Ok(AudioClip {
            mime_type,
            data: response.data,
        })
    }
}

fn mime_for_format(format: &str) -> &'static str {
    match format {
        "wav" => "audio/wav",
        "opus" => "audio/ogg",
        "aac" => "audio/aac",
        "flac" => "audio/flac",
        _ => "audio/mpeg",
    }
}
