//! Persisted text-to-speech preferences

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::gateways::tts::{AI_VOICES, DEFAULT_VOICE};
use crate::kv::KvStore;

pub const VOICE_SOURCE_KEY: &str = "flashcard-ai-voice-source";
pub const VOICE_KEY: &str = "flashcard-ai-voice";

/// Where spoken audio comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum VoiceSource {
    /// The platform's own speech engine
    Browser,
    /// The text-to-speech gateway
    #[default]
    Ai,
}

impl fmt::Display for VoiceSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VoiceSource::Browser => f.write_str("browser"),
            VoiceSource::Ai => f.write_str("ai"),
        }
    }
}

impl FromStr for VoiceSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "browser" => Ok(VoiceSource::Browser),
            "ai" => Ok(VoiceSource::Ai),
            other => Err(format!("unknown voice source '{}' (expected browser or ai)", other)),
        }
    }
}

#[derive(Clone)]
pub struct TtsSettings {
    store: KvStore,
    voice_source: VoiceSource,
    ai_voice: String,
}

impl TtsSettings {
    pub fn load(store: KvStore) -> Self {
        let voice_source = store.load(VOICE_SOURCE_KEY, VoiceSource::default());
        let stored_voice: String = store.load(VOICE_KEY, DEFAULT_VOICE.to_string());
        let ai_voice = canonical_voice(&stored_voice).unwrap_or(DEFAULT_VOICE).to_string();

        Self {
            store,
            voice_source,
            ai_voice,
        }
    }

    pub fn voice_source(&self) -> VoiceSource {
        self.voice_source
    }

    pub fn ai_voice(&self) -> &str {
        &self.ai_voice
    }

    pub fn set_voice_source(&mut self, source: VoiceSource) {
        self.voice_source = source;
        self.store.write(VOICE_SOURCE_KEY, &source);
    }

    /// Select a catalog voice. Returns false for voices outside the catalog.
    pub fn set_ai_voice(&mut self, voice: &str) -> bool {
        let Some(voice) = canonical_voice(voice) else {
            return false;
        };
        self.ai_voice = voice.to_string();
        self.store.write(VOICE_KEY, &self.ai_voice);
        true
    }
}

fn canonical_voice(voice: &str) -> Option<&'static str> {
    AI_VOICES.iter().copied().find(|v| v.eq_ignore_ascii_case(voice))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kv::{KvBackend, MemoryBackend};
    use std::sync::Arc;

    #[test]
    fn test_defaults() {
        let settings = TtsSettings::load(KvStore::in_memory());
        assert_eq!(settings.voice_source(), VoiceSource::Ai);
        assert_eq!(settings.ai_voice(), "Algenib");
    }

    #[test]
    fn test_changes_persist() {
        let backend = Arc::new(MemoryBackend::new());
        let mut settings = TtsSettings::load(KvStore::new(backend.clone()));
        settings.set_voice_source(VoiceSource::Browser);
        assert!(settings.set_ai_voice("mirfak"));

        assert_eq!(backend.get_item(VOICE_SOURCE_KEY).unwrap().as_deref(), Some("\"browser\""));
        let reloaded = TtsSettings::load(KvStore::new(backend));
        assert_eq!(reloaded.voice_source(), VoiceSource::Browser);
        assert_eq!(reloaded.ai_voice(), "Mirfak");
    }

    #[test]
    fn test_unknown_voice_is_ignored() {
        let backend = Arc::new(MemoryBackend::new());
        backend.set_item(VOICE_KEY, "\"Nobody\"").unwrap();

        let mut settings = TtsSettings::load(KvStore::new(backend));
        assert_eq!(settings.ai_voice(), "Algenib");
        assert!(!settings.set_ai_voice("Nobody"));
    }
}
