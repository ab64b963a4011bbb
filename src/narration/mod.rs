//! Narration audio synthesis.
//!
//! Text is split into chunks no longer than the backend's per-request limit,
//! each chunk is synthesized in order and the MP3 payloads are concatenated
//! into one file. Without a usable backend a placeholder text file is written
//! in place of the audio and the artifact is labelled `success (mock)`.

pub mod backends;

use crate::config::SynthesisConfig;
use crate::error::Result;
use crate::models::{AudioArtifact, AudioStatus, Generated};
use crate::utils::truncate_chars;
use backends::{RemoteVoice, VoiceBackend};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info, instrument, warn};

/// Spoken Korean averages roughly this many characters per minute.
pub const CHARS_PER_MINUTE: usize = 150;

/// Narration voice; each maps to a fixed voice on every backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoiceStyle {
    Professional,
    Friendly,
    Energetic,
}

impl VoiceStyle {
    /// Unknown names use the professional voice.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_lowercase().as_str() {
            "professional" => VoiceStyle::Professional,
            "friendly" => VoiceStyle::Friendly,
            "energetic" => VoiceStyle::Energetic,
            other => {
                debug!(style = other, "Unknown voice style; using professional");
                VoiceStyle::Professional
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            VoiceStyle::Professional => "professional",
            VoiceStyle::Friendly => "friendly",
            VoiceStyle::Energetic => "energetic",
        }
    }

    pub fn elevenlabs_voice_id(&self) -> &'static str {
        match self {
            VoiceStyle::Professional => "21m00Tcm4TlvDq8ikWAM",
            VoiceStyle::Friendly => "AZnzlk1XvdvUeBnXmlld",
            VoiceStyle::Energetic => "TxGEqnHWrfWFTfGW9XjX",
        }
    }

    /// Google Cloud voice name and SSML gender.
    pub fn google_voice(&self) -> (&'static str, &'static str) {
        match self {
            VoiceStyle::Professional => ("ko-KR-Standard-A", "FEMALE"),
            VoiceStyle::Friendly => ("ko-KR-Standard-B", "FEMALE"),
            VoiceStyle::Energetic => ("ko-KR-Standard-C", "MALE"),
        }
    }

    pub fn azure_voice_name(&self) -> &'static str {
        match self {
            VoiceStyle::Professional => "ko-KR-SunHiNeural",
            VoiceStyle::Friendly => "ko-KR-InJoonNeural",
            VoiceStyle::Energetic => "ko-KR-BongJinNeural",
        }
    }
}

/// Split `text` into chunks of at most `max_chars` characters.
///
/// Sentences (ending in `". "`) are packed greedily; a sentence longer than
/// the limit is cut at character boundaries. The chunks are contiguous
/// slices, so joining them yields `text` again.
pub fn split_for_limit(text: &str, max_chars: usize) -> Vec<String> {
    let max = max_chars.max(1);
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for sentence in text.split_inclusive(". ") {
        let len = sentence.chars().count();
        if current_len + len > max && !current.is_empty() {
            chunks.push(std::mem::take(&mut current));
            current_len = 0;
        }
        if len <= max {
            current.push_str(sentence);
            current_len += len;
            continue;
        }
        for ch in sentence.chars() {
            if current_len == max {
                chunks.push(std::mem::take(&mut current));
                current_len = 0;
            }
            current.push(ch);
            current_len += 1;
        }
    }
    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

pub struct Synthesizer {
    remote: Option<RemoteVoice>,
    audio_dir: PathBuf,
    max_chars: usize,
    strict: bool,
}

impl Synthesizer {
    pub fn from_config(config: &SynthesisConfig, audio_dir: PathBuf, strict: bool) -> Result<Self> {
        Ok(Self {
            remote: RemoteVoice::from_config(config)?,
            audio_dir,
            max_chars: config.max_chars,
            strict,
        })
    }

    /// Synthesize `text` into `{audio_dir}/{output_name}`.
    #[instrument(level = "info", skip(self, text), fields(chars = text.chars().count()))]
    pub async fn synthesize(
        &self,
        text: &str,
        voice_style: &str,
        output_name: &str,
    ) -> Result<Generated<AudioArtifact>> {
        let style = VoiceStyle::from_name(voice_style);
        let chunks = split_for_limit(text, self.max_chars);
        fs::create_dir_all(&self.audio_dir).await?;
        let path = self.audio_dir.join(output_name);

        let Some(remote) = &self.remote else {
            let artifact = write_placeholder(&path, text, style, chunks.len()).await?;
            return Ok(Generated::StandIn(artifact));
        };
        if text.trim().is_empty() {
            warn!(backend = remote.name(), "Narration text is empty; writing placeholder audio");
            let artifact = write_placeholder(&path, text, style, 0).await?;
            return Ok(Generated::Fallback {
                value: artifact,
                reason: "narration text is empty".to_string(),
            });
        }

        match synthesize_chunks(remote, &chunks, style).await {
            Ok(audio) => {
                fs::write(&path, &audio).await?;
                info!(path = %path.display(), bytes = audio.len(), chunks = chunks.len(), "Wrote narration audio");
                Ok(Generated::Live(AudioArtifact {
                    path,
                    service: remote.name().to_string(),
                    voice_style: style.as_str().to_string(),
                    duration_estimate_minutes: text.chars().count() / CHARS_PER_MINUTE,
                    text_length: text.chars().count(),
                    chunks: chunks.len(),
                    status: AudioStatus::Success,
                }))
            }
            Err(e) if self.strict => Err(e),
            Err(e) => {
                warn!(backend = remote.name(), error = %e, "Synthesis failed; writing placeholder audio");
                let artifact = write_placeholder(&path, text, style, chunks.len()).await?;
                Ok(Generated::Fallback {
                    value: artifact,
                    reason: e.to_string(),
                })
            }
        }
    }
}

async fn synthesize_chunks(
    remote: &RemoteVoice,
    chunks: &[String],
    style: VoiceStyle,
) -> Result<Vec<u8>> {
    let mut audio = Vec::new();
    for (i, chunk) in chunks.iter().enumerate() {
        let bytes = remote.synthesize(chunk, style).await?;
        debug!(chunk = i + 1, of = chunks.len(), bytes = bytes.len(), "Synthesized chunk");
        audio.extend_from_slice(&bytes);
    }
    Ok(audio)
}

async fn write_placeholder(
    path: &Path,
    text: &str,
    style: VoiceStyle,
    chunks: usize,
) -> Result<AudioArtifact> {
    let length = text.chars().count();
    let minutes = length / CHARS_PER_MINUTE;
    let contents = format!(
        "[Mock Audio File]\nText: {}...\nDuration: {minutes} minutes",
        truncate_chars(text, 100)
    );
    fs::write(path, contents).await?;
    info!(path = %path.display(), "Wrote placeholder audio");
    Ok(AudioArtifact {
        path: path.to_path_buf(),
        service: "mock".to_string(),
        voice_style: style.as_str().to_string(),
        duration_estimate_minutes: minutes,
        text_length: length,
        chunks,
        status: AudioStatus::SuccessMock,
    })
}
