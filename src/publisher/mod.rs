//! Video publishing.
//!
//! [`Publisher::publish`] validates and normalizes a [`PublishRequest`], then
//! either uploads it through [`youtube::YouTubeUploader`] or, when no access
//! token is available, simulates the upload and returns a `MOCK_…` id.
//! A failed upload is reported in the result (`status: error`), not as an
//! `Err`; only an invalid request is an error.
//!
//! The same account can also edit uploaded videos ([`Publisher::update_video`])
//! and list its recent uploads ([`Publisher::list_recent_uploads`]).

pub mod auth;
pub mod youtube;

use crate::config::PublishingConfig;
use crate::error::{Error, Result};
use crate::models::{ChannelVideo, PrivacyStatus, PublishResult, PublishStatus};
use crate::utils::truncate_chars;
use chrono::{DateTime, Local, Utc};
use std::path::PathBuf;
use tracing::{error, info, instrument, warn};
use youtube::{DEFAULT_API_BASE_URL, DEFAULT_UPLOAD_BASE_URL, YouTubeUploader};

pub const MAX_TITLE_CHARS: usize = 100;
pub const MAX_DESCRIPTION_CHARS: usize = 5000;
pub const MAX_TAGS_CHARS: usize = 500;

#[derive(Debug, Clone, PartialEq)]
pub struct PublishRequest {
    pub video: PathBuf,
    pub title: String,
    pub description: String,
    pub tags: Vec<String>,
    pub category_id: String,
    pub privacy_status: PrivacyStatus,
    pub thumbnail_file: Option<PathBuf>,
    pub publish_at: Option<DateTime<Utc>>,
}

impl PublishRequest {
    /// A scheduled publish only works on a private video.
    pub fn validate(&self) -> Result<()> {
        if self.publish_at.is_some() && self.privacy_status != PrivacyStatus::Private {
            return Err(Error::ScheduleRequiresPrivate(
                self.privacy_status.to_string(),
            ));
        }
        Ok(())
    }

    /// Silently cut title, description and tags to the platform limits.
    pub fn normalized(mut self) -> Self {
        self.title = truncate_chars(&self.title, MAX_TITLE_CHARS);
        self.description = truncate_chars(&self.description, MAX_DESCRIPTION_CHARS);
        self.tags = limit_tags(self.tags, MAX_TAGS_CHARS);
        self
    }
}

/// Fields to replace on an uploaded video; `None` keeps the current value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VideoUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub tags: Option<Vec<String>>,
}

impl VideoUpdate {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none() && self.tags.is_none()
    }
}

/// Keep leading tags while the comma-joined tag text fits in `max_chars`.
pub fn limit_tags(tags: Vec<String>, max_chars: usize) -> Vec<String> {
    let mut used = 0;
    tags.into_iter()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .take_while(|tag| {
            let separator = usize::from(used > 0);
            let next = used + separator + tag.chars().count();
            if next > max_chars {
                return false;
            }
            used = next;
            true
        })
        .collect()
}

pub struct Publisher {
    uploader: Option<YouTubeUploader>,
}

impl Publisher {
    pub async fn from_config(config: &PublishingConfig) -> Result<Self> {
        let Some(token) = auth::load_access_token(&config.token_file).await else {
            warn!(
                token_file = %config.token_file.display(),
                credentials_file = %config.credentials_file.display(),
                "No YouTube access token; uploads will be simulated. Authorize with the client secrets to create one"
            );
            return Ok(Self::with_uploader(None));
        };
        let uploader = YouTubeUploader::new(
            config
                .upload_base_url
                .as_deref()
                .unwrap_or(DEFAULT_UPLOAD_BASE_URL),
            token,
            config.chunk_size_bytes,
            config.timeout_secs,
        )?
        .with_api_base(config.api_base_url.as_deref().unwrap_or(DEFAULT_API_BASE_URL));
        Ok(Self::with_uploader(Some(uploader)))
    }

    pub fn with_uploader(uploader: Option<YouTubeUploader>) -> Self {
        Self { uploader }
    }

    /// Edit an uploaded video. Without an access token nothing is sent and
    /// the status is `Mock`.
    #[instrument(level = "info", skip(self, update))]
    pub async fn update_video(&self, video_id: &str, update: &VideoUpdate) -> Result<PublishStatus> {
        if update.is_empty() {
            return Err(Error::Config("nothing to update".into()));
        }
        let Some(uploader) = &self.uploader else {
            info!(%video_id, "Simulated video update");
            return Ok(PublishStatus::Mock);
        };
        uploader.update_video(video_id, update).await?;
        Ok(PublishStatus::Success)
    }

    /// Recent uploads of the authorized channel; empty without an access token.
    pub async fn list_recent_uploads(&self, max_results: usize) -> Result<Vec<ChannelVideo>> {
        match &self.uploader {
            Some(uploader) => uploader.list_my_videos(max_results).await,
            None => {
                warn!("No YouTube access token; no uploads to list");
                Ok(Vec::new())
            }
        }
    }

    #[instrument(level = "info", skip_all, fields(title = %request.title))]
    pub async fn publish(&self, request: PublishRequest) -> Result<PublishResult> {
        request.validate()?;
        let request = request.normalized();

        let Some(uploader) = &self.uploader else {
            return Ok(mock_publish(&request));
        };
        match uploader.upload(&request).await {
            Ok(video_id) => {
                let video_url = watch_url(&video_id);
                info!(%video_id, %video_url, "Published video");
                Ok(PublishResult {
                    status: PublishStatus::Success,
                    video_id: Some(video_id),
                    video_url: Some(video_url),
                    title: Some(request.title),
                    privacy_status: Some(request.privacy_status),
                    publish_at: request.publish_at,
                    error: None,
                })
            }
            Err(e) => {
                error!(error = %e, "Upload failed");
                Ok(PublishResult::failed(e.to_string()))
            }
        }
    }
}

pub(crate) fn watch_url(video_id: &str) -> String {
    format!("https://www.youtube.com/watch?v={video_id}")
}

fn mock_publish(request: &PublishRequest) -> PublishResult {
    let video_id = format!("MOCK_{}", Local::now().format("%Y%m%d%H%M%S"));
    let video_url = watch_url(&video_id);
    info!(%video_id, video = %request.video.display(), "Simulated upload");
    PublishResult {
        status: PublishStatus::Mock,
        video_id: Some(video_id),
        video_url: Some(video_url),
        title: Some(request.title.clone()),
        privacy_status: Some(request.privacy_status),
        publish_at: request.publish_at,
        error: None,
    }
}
