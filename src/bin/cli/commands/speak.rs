use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

use flashcard_ai_lib::gateways::tts::is_known_voice;
use flashcard_ai_lib::gateways::{text_to_speech, SpeechRequest, AI_VOICES};
use flashcard_ai_lib::settings::VoiceSource;

use crate::app::App;
use crate::OutputFormat;

pub fn run_speak(app: &App, text: &str, voice: Option<&str>, output: &Path) -> Result<()> {
    if app.settings.voice_source() == VoiceSource::Browser {
        bail!("The browser voice is not available in the terminal. Run `flashcard-cli voice --source ai` to use the AI voice.");
    }

    let voice = voice.unwrap_or(app.settings.ai_voice());
    if !is_known_voice(voice) {
        bail!("Unknown voice '{}'. Available voices: {}", voice, AI_VOICES.join(", "));
    }

    let request = SpeechRequest {
        text: text.to_string(),
        voice: Some(voice.to_string()),
    };
    let synthesizer = app.synthesizer()?;
    let runtime = tokio::runtime::Runtime::new().context("Failed to start async runtime")?;

    let clip = match runtime.block_on(text_to_speech(&synthesizer, &request)) {
        Ok(clip) => clip,
        Err(failure) => bail!("{}", failure),
    };

    let path = with_extension(output, clip.extension());
    std::fs::write(&path, &clip.data).with_context(|| format!("Failed to write {}", path.display()))?;
    println!("Saved {} ({} bytes)", path.display(), clip.data.len());
    Ok(())
}

pub fn run_voice(
    app: &mut App,
    source: Option<VoiceSource>,
    voice: Option<&str>,
    format: &OutputFormat,
) -> Result<()> {
    if let Some(voice) = voice {
        if !app.settings.set_ai_voice(voice) {
            bail!("Unknown voice '{}'. Available voices: {}", voice, AI_VOICES.join(", "));
        }
    }
    if let Some(source) = source {
        app.settings.set_voice_source(source);
    }

    match format {
        OutputFormat::Json => {
            let output = serde_json::json!({
                "voiceSource": app.settings.voice_source(),
                "voice": app.settings.ai_voice(),
                "voices": AI_VOICES,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Plain => {
            println!("Voice source: {}", app.settings.voice_source());
            println!("AI voice: {}", app.settings.ai_voice());
            println!("Available voices: {}", AI_VOICES.join(", "));
        }
    }
    Ok(())
}

fn with_extension(path: &Path, extension: &str) -> PathBuf {
    if path.extension().is_some() {
        path.to_path_buf()
    } else {
        path.with_extension(extension)
    }
}
