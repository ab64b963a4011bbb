//! Data models shared by every pipeline stage.
//!
//! This module defines the records that flow forward through the pipeline:
//! - [`Article`]: a normalized news item, scored by the relevance filter
//! - [`Script`], [`ThumbnailTitleSet`], [`VideoMetadata`]: generated content
//! - [`AudioArtifact`], [`VideoArtifact`]: files produced on disk
//! - [`PublishResult`]: the terminal record of an upload attempt
//! - [`RunRecord`], [`PipelineReport`]: per-article and aggregate run state
//!
//! [`Generated`] wraps the output of every degradable stage so callers can
//! tell live backend output apart from the offline stand-in.

use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// A news item normalized from any feed.
///
/// Created by the article source with a zero score; the relevance filter
/// assigns `relevance_score` exactly once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    /// Headline as published by the feed.
    pub title: String,
    /// Plain-text summary (HTML already stripped).
    pub description: String,
    /// Link to the original story.
    pub link: String,
    /// Publication time, when the feed carried a parseable one.
    pub published_at: Option<DateTime<Utc>>,
    /// The keyword whose search produced this item.
    pub keyword: String,
    /// Feed identifier (`google_news`, `naver`, `offline`).
    pub source: String,
    /// Keyword relevance, see [`crate::relevance`].
    pub relevance_score: f64,
    /// Scraped body text, when body scraping is enabled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

/// Narration script generated for one article.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Script {
    pub article_title: String,
    pub narration: String,
    pub estimated_duration: String,
    pub generated_at: DateTime<Local>,
}

/// Candidate thumbnail hooks, best first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ThumbnailTitleSet(pub Vec<String>);

impl ThumbnailTitleSet {
    /// The title used downstream, if the backend produced any.
    pub fn chosen(&self) -> Option<&str> {
        self.0.first().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Video title, description and tags parsed from the metadata response.
///
/// Every field is optional: a response missing a marker leaves the field
/// `None` and the orchestrator substitutes a fallback.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VideoMetadata {
    pub title: Option<String>,
    pub description: Option<String>,
    pub tags: Option<Vec<String>>,
}

/// Outcome label of a synthesis attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AudioStatus {
    #[serde(rename = "success")]
    Success,
    #[serde(rename = "success (mock)")]
    SuccessMock,
}

impl fmt::Display for AudioStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AudioStatus::Success => f.write_str("success"),
            AudioStatus::SuccessMock => f.write_str("success (mock)"),
        }
    }
}

/// Narration audio written to disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AudioArtifact {
    pub path: PathBuf,
    /// Synthesis service that produced the file (`mock` for placeholders).
    pub service: String,
    pub voice_style: String,
    /// Rough spoken length in minutes (150 characters per minute).
    pub duration_estimate_minutes: usize,
    pub text_length: usize,
    /// Number of synthesis requests the text was split into.
    pub chunks: usize,
    pub status: AudioStatus,
}

/// The assembled video file handed to the publisher.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoArtifact {
    pub path: PathBuf,
}

/// Visibility of an uploaded video.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrivacyStatus {
    Public,
    Private,
    Unlisted,
}

impl PrivacyStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PrivacyStatus::Public => "public",
            PrivacyStatus::Private => "private",
            PrivacyStatus::Unlisted => "unlisted",
        }
    }
}

impl fmt::Display for PrivacyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PublishStatus {
    #[serde(rename = "success")]
    Success,
    #[serde(rename = "success (mock)")]
    Mock,
    #[serde(rename = "error")]
    Error,
}

/// One recent upload of the authorized channel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChannelVideo {
    pub video_id: String,
    pub title: String,
    /// First 100 characters.
    pub description: String,
    pub published_at: Option<DateTime<Utc>>,
    pub url: String,
}

/// Terminal record of a publish attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublishResult {
    pub status: PublishStatus,
    pub video_id: Option<String>,
    pub video_url: Option<String>,
    pub title: Option<String>,
    pub privacy_status: Option<PrivacyStatus>,
    pub publish_at: Option<DateTime<Utc>>,
    pub error: Option<String>,
}

impl PublishResult {
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            status: PublishStatus::Error,
            video_id: None,
            video_url: None,
            title: None,
            privacy_status: None,
            publish_at: None,
            error: Some(error.into()),
        }
    }
}

/// Output of a degradable stage, tagged with where it came from.
///
/// - `Live`: produced by the configured backend
/// - `StandIn`: no backend configured, the offline stand-in answered
/// - `Fallback`: the backend failed and the stand-in answered instead
#[derive(Debug, Clone, PartialEq)]
pub enum Generated<T> {
    Live(T),
    StandIn(T),
    Fallback { value: T, reason: String },
}

impl<T> Generated<T> {
    pub fn value(&self) -> &T {
        match self {
            Generated::Live(v) | Generated::StandIn(v) => v,
            Generated::Fallback { value, .. } => value,
        }
    }

    pub fn into_value(self) -> T {
        match self {
            Generated::Live(v) | Generated::StandIn(v) => v,
            Generated::Fallback { value, .. } => value,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Generated<U> {
        match self {
            Generated::Live(v) => Generated::Live(f(v)),
            Generated::StandIn(v) => Generated::StandIn(f(v)),
            Generated::Fallback { value, reason } => Generated::Fallback {
                value: f(value),
                reason,
            },
        }
    }

    #[cfg(test)]
    pub fn is_fallback(&self) -> bool {
        matches!(self, Generated::Fallback { .. })
    }

    pub fn provenance(&self) -> Provenance {
        match self {
            Generated::Live(_) => Provenance::Live,
            Generated::StandIn(_) => Provenance::StandIn,
            Generated::Fallback { .. } => Provenance::Fallback,
        }
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            Generated::Fallback { reason, .. } => Some(reason),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
    Live,
    StandIn,
    Fallback,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Script,
    ThumbnailTitles,
    Metadata,
    Audio,
    Assemble,
    Publish,
}

/// Where one stage's output came from, kept on the run record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageProvenance {
    pub stage: Stage,
    pub provenance: Provenance,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Processing,
    Completed,
    Failed,
}

/// State of one article's trip through the pipeline.
///
/// Artifacts produced before a failure stay on the record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunRecord {
    pub article_title: String,
    pub status: RunStatus,
    pub started_at: DateTime<Local>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub script: Option<Script>,
    pub thumbnail_titles: ThumbnailTitleSet,
    pub thumbnail_title: Option<String>,
    pub metadata: Option<VideoMetadata>,
    pub audio: Option<AudioArtifact>,
    pub video: Option<VideoArtifact>,
    pub publish: Option<PublishResult>,
    pub provenance: Vec<StageProvenance>,
}

impl RunRecord {
    pub fn start(article: &Article) -> Self {
        Self {
            article_title: article.title.clone(),
            status: RunStatus::Processing,
            started_at: Local::now(),
            error: None,
            script: None,
            thumbnail_titles: ThumbnailTitleSet::default(),
            thumbnail_title: None,
            metadata: None,
            audio: None,
            video: None,
            publish: None,
            provenance: Vec::new(),
        }
    }

    /// Record where a stage's output came from and hand back the value.
    pub fn note<T>(&mut self, stage: Stage, generated: Generated<T>) -> T {
        self.provenance.push(StageProvenance {
            stage,
            provenance: generated.provenance(),
            reason: generated.reason().map(str::to_string),
        });
        generated.into_value()
    }
}

/// Aggregate of every run, persisted once per pipeline execution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineReport {
    pub timestamp: DateTime<Local>,
    pub total_videos: usize,
    pub completed: usize,
    pub failed: usize,
    pub results: Vec<RunRecord>,
}

impl PipelineReport {
    pub fn from_runs(results: Vec<RunRecord>) -> Self {
        let completed = results
            .iter()
            .filter(|r| r.status == RunStatus::Completed)
            .count();
        let failed = results
            .iter()
            .filter(|r| r.status == RunStatus::Failed)
            .count();
        Self {
            timestamp: Local::now(),
            total_videos: results.len(),
            completed,
            failed,
            results,
        }
    }
}

#[cfg(test)]
pub(crate) fn sample_article(title: &str) -> Article {
    Article {
        title: title.to_string(),
        description: "삼성전자가 차세대 반도체 생산을 위해 대규모 투자를 결정했습니다.".to_string(),
        link: "https://news.example.com/a/1".to_string(),
        published_at: None,
        keyword: "삼성".to_string(),
        source: "offline".to_string(),
        relevance_score: 0.0,
        content: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_audio_status_serializes_with_mock_label() {
        let json = serde_json::to_string(&AudioStatus::SuccessMock).unwrap();
        assert_eq!(json, "\"success (mock)\"");
        assert_eq!(AudioStatus::SuccessMock.to_string(), "success (mock)");
    }

    #[test]
    fn test_privacy_status_round_trip() {
        let status: PrivacyStatus = serde_json::from_str("\"private\"").unwrap();
        assert_eq!(status, PrivacyStatus::Private);
        assert_eq!(status.as_str(), "private");
    }

    #[test]
    fn test_generated_map_keeps_provenance() {
        let g = Generated::Fallback {
            value: 2,
            reason: "timeout".to_string(),
        };
        let mapped = g.map(|v| v * 10);
        assert!(mapped.is_fallback());
        assert_eq!(mapped.reason(), Some("timeout"));
        assert_eq!(*mapped.value(), 20);
    }

    #[test]
    fn test_run_record_note_tracks_stage() {
        let article = sample_article("삼성전자 투자 발표");
        let mut record = RunRecord::start(&article);
        let value = record.note(Stage::Script, Generated::StandIn("text".to_string()));
        assert_eq!(value, "text");
        assert_eq!(record.status, RunStatus::Processing);
        assert_eq!(record.provenance.len(), 1);
        assert_eq!(record.provenance[0].stage, Stage::Script);
        assert_eq!(record.provenance[0].provenance, Provenance::StandIn);
        assert_eq!(record.provenance[0].reason, None);
    }

    #[test]
    fn test_report_counts_terminal_states() {
        let article = sample_article("a");
        let mut done = RunRecord::start(&article);
        done.status = RunStatus::Completed;
        let mut failed = RunRecord::start(&article);
        failed.status = RunStatus::Failed;
        let report = PipelineReport::from_runs(vec![done, failed.clone(), failed]);
        assert_eq!(report.total_videos, 3);
        assert_eq!(report.completed, 1);
        assert_eq!(report.failed, 2);
    }

    #[test]
    fn test_thumbnail_set_chosen_is_first() {
        let set = ThumbnailTitleSet(vec!["첫째".to_string(), "둘째".to_string()]);
        assert_eq!(set.chosen(), Some("첫째"));
        assert!(ThumbnailTitleSet::default().chosen().is_none());
    }
}
