//! Typed pipeline configuration.
//!
//! Settings are read from a YAML file (every field has a default) and then
//! overridden by command-line flags. [`AppConfig::validate`] rejects values
//! the pipeline cannot run with; service names are parsed leniently so an
//! unknown name falls back to the offline stand-in instead of failing.
//!
//! ```yaml
//! keywords: [삼성, 쿠팡, 부동산]
//! sources: [google_news]
//! daily_video_quota: 3
//! generation:
//!   service: openai
//!   api_key: sk-...
//! synthesis:
//!   service: elevenlabs
//! publishing:
//!   auto_publish: false
//! ```

use crate::error::{Error, Result};
use crate::models::PrivacyStatus;
use crate::relevance::DedupPolicy;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{info, instrument, warn};

/// Resumable uploads must send chunks in multiples of 256 KiB.
pub const UPLOAD_CHUNK_GRANULARITY: usize = 256 * 1024;

/// Feed kinds the article source knows how to query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum FeedKind {
    GoogleNews,
    Naver,
    Offline,
}

impl From<String> for FeedKind {
    fn from(name: String) -> Self {
        match name.trim().to_lowercase().as_str() {
            "google_news" | "google" => FeedKind::GoogleNews,
            "naver" => FeedKind::Naver,
            "offline" | "mock" => FeedKind::Offline,
            other => {
                warn!(feed = other, "Unknown feed kind; using offline stand-in");
                FeedKind::Offline
            }
        }
    }
}

/// Text-generation backends, selected by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum TextService {
    OpenAi,
    Gemini,
    Anthropic,
    Offline,
}

impl From<String> for TextService {
    fn from(name: String) -> Self {
        match name.trim().to_lowercase().as_str() {
            "openai" => TextService::OpenAi,
            "gemini" => TextService::Gemini,
            "anthropic" => TextService::Anthropic,
            "" | "offline" | "mock" => TextService::Offline,
            other => {
                warn!(service = other, "Unknown generation service; using offline stand-in");
                TextService::Offline
            }
        }
    }
}

/// Voice-synthesis backends, selected by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum VoiceService {
    ElevenLabs,
    Google,
    Azure,
    Offline,
}

impl From<String> for VoiceService {
    fn from(name: String) -> Self {
        match name.trim().to_lowercase().as_str() {
            "elevenlabs" => VoiceService::ElevenLabs,
            "google" => VoiceService::Google,
            "azure" => VoiceService::Azure,
            "" | "offline" | "mock" => VoiceService::Offline,
            other => {
                warn!(service = other, "Unknown synthesis service; using offline stand-in");
                VoiceService::Offline
            }
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    pub language: String,
    pub region: String,
    pub timeout_secs: u64,
    pub naver_client_id: Option<String>,
    pub naver_client_secret: Option<String>,
    /// Overrides the public feed endpoints (used against local stubs).
    pub google_news_base_url: Option<String>,
    pub naver_base_url: Option<String>,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            language: "ko".to_string(),
            region: "KR".to_string(),
            timeout_secs: 10,
            naver_client_id: None,
            naver_client_secret: None,
            google_news_base_url: None,
            naver_base_url: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    pub service: TextService,
    pub api_key: Option<String>,
    pub model: Option<String>,
    pub base_url: Option<String>,
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout_secs: u64,
    pub thumbnail_count: usize,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            service: TextService::Offline,
            api_key: None,
            model: None,
            base_url: None,
            temperature: 0.7,
            max_tokens: 2000,
            timeout_secs: 60,
            thumbnail_count: 10,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SynthesisConfig {
    pub service: VoiceService,
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    /// Azure speech region.
    pub region: String,
    pub voice_style: String,
    /// Per-request text ceiling of the synthesis backend, in characters.
    pub max_chars: usize,
    pub timeout_secs: u64,
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            service: VoiceService::Offline,
            api_key: None,
            base_url: None,
            region: "koreacentral".to_string(),
            voice_style: "professional".to_string(),
            max_chars: 5000,
            timeout_secs: 120,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PublishingConfig {
    pub auto_publish: bool,
    /// OAuth client secrets; consumed by the out-of-band authorization flow.
    pub credentials_file: PathBuf,
    /// Access token persisted by the authorization flow.
    pub token_file: PathBuf,
    pub category_id: String,
    pub privacy_status: PrivacyStatus,
    pub publish_at: Option<DateTime<Utc>>,
    pub thumbnail_file: Option<PathBuf>,
    pub timeout_secs: u64,
    pub chunk_size_bytes: usize,
    pub upload_base_url: Option<String>,
    /// YouTube Data API base for video updates and channel listings.
    pub api_base_url: Option<String>,
}

impl Default for PublishingConfig {
    fn default() -> Self {
        Self {
            auto_publish: false,
            credentials_file: PathBuf::from("client_secrets.json"),
            token_file: PathBuf::from("youtube_token.json"),
            category_id: "25".to_string(),
            privacy_status: PrivacyStatus::Public,
            publish_at: None,
            thumbnail_file: None,
            timeout_secs: 300,
            chunk_size_bytes: 4 * UPLOAD_CHUNK_GRANULARITY,
            upload_base_url: None,
            api_base_url: None,
        }
    }
}

/// Top-level settings for one pipeline execution.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub keywords: Vec<String>,
    pub sources: Vec<FeedKind>,
    pub max_articles_per_keyword: usize,
    pub scrape_content: bool,
    pub min_relevance: f64,
    pub relevance_bonus: f64,
    pub dedup: DedupPolicy,
    /// Maximum number of videos produced per run.
    pub daily_video_quota: usize,
    pub output_dir: PathBuf,
    /// Turn backend failures into failed runs instead of stand-in output.
    pub strict_backends: bool,
    pub feed: FeedConfig,
    pub generation: GenerationConfig,
    pub synthesis: SynthesisConfig,
    pub publishing: PublishingConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            keywords: ["삼성", "현대", "쿠팡", "부동산", "손흥민", "AI"]
                .iter()
                .map(|k| k.to_string())
                .collect(),
            sources: vec![FeedKind::GoogleNews],
            max_articles_per_keyword: 10,
            scrape_content: false,
            min_relevance: 0.5,
            relevance_bonus: 0.5,
            dedup: DedupPolicy::Link,
            daily_video_quota: 3,
            output_dir: PathBuf::from("output"),
            strict_backends: false,
            feed: FeedConfig::default(),
            generation: GenerationConfig::default(),
            synthesis: SynthesisConfig::default(),
            publishing: PublishingConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load settings from `path`, or use defaults when no path is given.
    #[instrument(level = "info")]
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            info!("No config file given; using defaults");
            return Ok(Self::default());
        };
        let raw = std::fs::read_to_string(path)?;
        let config = Self::from_yaml(&raw)?;
        info!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    pub fn from_yaml(raw: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(raw)?)
    }

    /// Route every stage to its offline stand-in.
    pub fn force_offline(&mut self) {
        self.sources = vec![FeedKind::Offline];
        self.generation.service = TextService::Offline;
        self.synthesis.service = VoiceService::Offline;
    }

    pub fn validate(&self) -> Result<()> {
        if self.keywords.iter().all(|k| k.trim().is_empty()) {
            return Err(Error::Config("at least one keyword is required".into()));
        }
        if self.sources.is_empty() {
            return Err(Error::Config("at least one feed source is required".into()));
        }
        if self.min_relevance < 0.0 || self.relevance_bonus < 0.0 {
            return Err(Error::Config(
                "min_relevance and relevance_bonus must not be negative".into(),
            ));
        }
        if self.daily_video_quota == 0 {
            return Err(Error::Config("daily_video_quota must be at least 1".into()));
        }
        if self.generation.thumbnail_count == 0 {
            return Err(Error::Config("generation.thumbnail_count must be at least 1".into()));
        }
        if self.synthesis.max_chars == 0 {
            return Err(Error::Config("synthesis.max_chars must be at least 1".into()));
        }
        let chunk = self.publishing.chunk_size_bytes;
        if chunk == 0 || chunk % UPLOAD_CHUNK_GRANULARITY != 0 {
            return Err(Error::Config(format!(
                "publishing.chunk_size_bytes must be a positive multiple of {UPLOAD_CHUNK_GRANULARITY}"
            )));
        }
        if self.publishing.publish_at.is_some()
            && self.publishing.privacy_status != PrivacyStatus::Private
        {
            return Err(Error::ScheduleRequiresPrivate(
                self.publishing.privacy_status.to_string(),
            ));
        }
        Ok(())
    }
}
