//! Application configuration loading
//!
//! Loads `~/.config/flashcard-ai/config.toml` (or the path given with
//! `--config`). Every field has a default, so a missing file is not an error.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

/// Environment variable that overrides `ai.api_key`
pub const API_KEY_ENV: &str = "FLASHCARD_AI_API_KEY";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error reading {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Invalid config: {0}")]
    Toml(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    /// Flashcard generation provider
    #[serde(default)]
    pub ai: AiConfig,

    /// Text-to-speech provider
    #[serde(default)]
    pub tts: TtsConfig,

    #[serde(default)]
    pub storage: StorageConfig,
}

/// OpenAI-compatible chat completion settings
#[derive(Debug, Deserialize, Clone)]
pub struct AiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_temperature")]
    pub temperature: f64,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Whole-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_temperature() -> f64 {
    0.7
}

fn default_max_tokens() -> u32 {
    4096
}

fn default_timeout_secs() -> u64 {
    300
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            api_key: None,
            model: default_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct TtsConfig {
    /// Falls back to `ai.base_url`
    #[serde(default)]
    pub base_url: Option<String>,

    /// Falls back to `ai.api_key`
    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_tts_model")]
    pub model: String,

    /// mp3, wav, opus, aac or flac
    #[serde(default = "default_response_format")]
    pub response_format: String,

    /// Catalog voice to provider voice. Unmapped voices are sent unchanged,
    /// so `voices = {}` passes catalog names straight through.
    #[serde(default = "default_voice_map")]
    pub voices: BTreeMap<String, String>,
}

fn default_tts_model() -> String {
    "tts-1".to_string()
}

fn default_response_format() -> String {
    "mp3".to_string()
}

/// The catalog names are not OpenAI voices; pair each with one that is
fn default_voice_map() -> BTreeMap<String, String> {
    [
        ("Algenib", "alloy"),
        ("Achernar", "nova"),
        ("Enif", "shimmer"),
        ("Hadar", "onyx"),
        ("Kraz", "echo"),
        ("Mirfak", "fable"),
        ("Sarin", "coral"),
        ("Wezen", "ash"),
        ("Deneb", "sage"),
    ]
    .into_iter()
    .map(|(catalog, provider)| (catalog.to_string(), provider.to_string()))
    .collect()
}

impl Default for TtsConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            api_key: None,
            model: default_tts_model(),
            response_format: default_response_format(),
            voices: default_voice_map(),
        }
    }
}

impl TtsConfig {
    /// Voice name to send to the provider for a catalog voice
    pub fn provider_voice<'a>(&'a self, voice: &'a str) -> &'a str {
        self.voices
            .iter()
            .find(|(catalog, _)| catalog.eq_ignore_ascii_case(voice))
            .map_or(voice, |(_, provider)| provider.as_str())
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct StorageConfig {
    /// Overrides the platform data directory
    #[serde(default)]
    pub dir: Option<PathBuf>,
}

impl AppConfig {
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("flashcard-ai").join("config.toml"))
    }

    /// Load from `path`, or from the default location when `path` is `None`.
    ///
    /// An explicit path must exist; a missing default file yields defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let (path, required) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => match Self::default_path() {
                Some(p) => (p, false),
                None => return Ok(Self::default().apply_env()),
            },
        };

        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound && !required => {
                log::debug!("No config at {:?}, using defaults", path);
                return Ok(Self::default().apply_env());
            }
            Err(source) => return Err(ConfigError::Io { path, source }),
        };

        Ok(Self::from_toml_str(&content)?.apply_env())
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    fn apply_env(self) -> Self {
        self.with_api_key_override(std::env::var(API_KEY_ENV).ok())
    }

    fn with_api_key_override(mut self, key: Option<String>) -> Self {
        if let Some(key) = key.filter(|k| !k.trim().is_empty()) {
            self.ai.api_key = Some(key);
        }
        self
    }

    pub fn tts_base_url(&self) -> &str {
        self.tts.base_url.as_deref().unwrap_or(&self.ai.base_url)
    }

    pub fn tts_api_key(&self) -> Option<&str> {
        self.tts.api_key.as_deref().or(self.ai.api_key.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = AppConfig::from_toml_str("").unwrap();
        assert_eq!(config.ai.model, "gpt-4o-mini");
        assert_eq!(config.ai.max_tokens, 4096);
        assert_eq!(config.tts.model, "tts-1");
        assert!(config.storage.dir.is_none());
    }

    #[test]
    fn test_partial_config() {
        let config = AppConfig::from_toml_str(
            r#"
            [ai]
            base_url = "http://localhost:11434/v1"
            model = "llama3"

            [storage]
            dir = "/tmp/cards"
            "#,
        )
        .unwrap();

        assert_eq!(config.ai.model, "llama3");
        assert_eq!(config.ai.temperature, 0.7);
        assert_eq!(config.tts_base_url(), "http://localhost:11434/v1");
        assert_eq!(config.storage.dir, Some(PathBuf::from("/tmp/cards")));
    }

    #[test]
    fn test_tts_key_falls_back_to_ai_key() {
        let config = AppConfig::default().with_api_key_override(Some("sk-test".to_string()));
        assert_eq!(config.tts_api_key(), Some("sk-test"));

        let config = config.with_api_key_override(Some("   ".to_string()));
        assert_eq!(config.ai.api_key.as_deref(), Some("sk-test"));
    }

    #[test]
    fn test_catalog_voices_map_to_provider_voices() {
        let config = AppConfig::default();
        assert_eq!(config.tts.provider_voice("Algenib"), "alloy");
        assert_eq!(config.tts.provider_voice("enif"), "shimmer");
        assert_eq!(config.tts.provider_voice("verse"), "verse");
        for voice in crate::gateways::AI_VOICES {
            assert_ne!(config.tts.provider_voice(voice), *voice);
        }
    }

    #[test]
    fn test_voice_map_can_be_replaced() {
        let config = AppConfig::from_toml_str(
            r#"
            [tts]
            base_url = "http://localhost:8000/v1"
            voices = { Enif = "en-US-1" }
            "#,
        )
        .unwrap();
        assert_eq!(config.tts.provider_voice("Enif"), "en-US-1");
        assert_eq!(config.tts.provider_voice("Algenib"), "Algenib");

        let passthrough = AppConfig::from_toml_str("[tts]\nvoices = {}").unwrap();
        assert_eq!(passthrough.tts.provider_voice("Kraz"), "Kraz");
    }

    #[test]
    fn test_explicit_missing_path_is_an_error() {
        let temp = TempDir::new().unwrap();
        let result = AppConfig::load(Some(&temp.path().join("nope.toml")));
        assert!(matches!(result, Err(ConfigError::Io { .. })));
    }

    #[test]
    fn test_invalid_toml_is_an_error() {
        assert!(matches!(
            AppConfig::from_toml_str("[ai\nmodel ="),
            Err(ConfigError::Toml(_))
        ));
    }
}
