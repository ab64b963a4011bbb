//! Placeholder video assembly.
//!
//! No frames are rendered: the "video" is a small text file that names the
//! narration audio and the script length, standing in for a real encoder.

use crate::error::Result;
use crate::models::{AudioArtifact, Script, VideoArtifact};
use std::path::PathBuf;
use tokio::fs;
use tracing::{info, instrument};

pub struct PlaceholderAssembler {
    video_dir: PathBuf,
}

impl PlaceholderAssembler {
    pub fn new(video_dir: PathBuf) -> Self {
        Self { video_dir }
    }

    /// Write `{video_dir}/{output_name}`. Fails only on I/O errors.
    #[instrument(level = "info", skip(self, audio, script))]
    pub async fn assemble(
        &self,
        audio: &AudioArtifact,
        script: &Script,
        output_name: &str,
    ) -> Result<VideoArtifact> {
        fs::create_dir_all(&self.video_dir).await?;
        let path = self.video_dir.join(output_name);
        let contents = format!(
            "[Mock Video File]\nAudio: {}\nScript length: {}",
            audio.path.display(),
            script.narration.chars().count()
        );
        fs::write(&path, contents).await?;
        info!(path = %path.display(), "Wrote placeholder video");
        Ok(VideoArtifact { path })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AudioStatus;
    use chrono::Local;

    #[tokio::test]
    async fn test_assemble_names_audio_and_length() {
        let tmp = tempfile::tempdir().unwrap();
        let audio = AudioArtifact {
            path: tmp.path().join("audio/voice_1.mp3"),
            service: "mock".to_string(),
            voice_style: "professional".to_string(),
            duration_estimate_minutes: 0,
            text_length: 5,
            chunks: 1,
            status: AudioStatus::SuccessMock,
        };
        let script = Script {
            article_title: "제목".to_string(),
            narration: "안녕하세요".to_string(),
            estimated_duration: "8-10분".to_string(),
            generated_at: Local::now(),
        };

        let assembler = PlaceholderAssembler::new(tmp.path().join("videos"));
        let video = assembler.assemble(&audio, &script, "video_1.mp4").await.unwrap();
        assert_eq!(video.path, tmp.path().join("videos/video_1.mp4"));

        let written = std::fs::read_to_string(&video.path).unwrap();
        assert!(written.starts_with("[Mock Video File]"));
        assert!(written.contains("voice_1.mp3"));
        assert!(written.ends_with("Script length: 5"));
    }
}
