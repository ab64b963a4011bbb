//! YouTube Data API v3 resumable upload.
//!
//! 1. `POST {base}/videos?uploadType=resumable&part=snippet,status` with the
//!    video metadata opens a session; its URL comes back in `Location`.
//! 2. The file is `PUT` to the session URL in chunks, each labelled with
//!    `Content-Range`. `308` means "keep going" and its `Range` header says
//!    how many bytes the server has committed; `200`/`201` carries the video.
//! 3. An optional thumbnail is attached with `POST {base}/thumbnails/set`.
//!
//! Video edits and channel listings go through the Data API base
//! (`videos`, `channels`, `playlistItems`).

use crate::error::{Error, Result};
use crate::http::{self, ensure_success};
use crate::models::ChannelVideo;
use crate::publisher::{
    MAX_DESCRIPTION_CHARS, MAX_TITLE_CHARS, MAX_TAGS_CHARS, PublishRequest, VideoUpdate, limit_tags,
    watch_url,
};
use crate::utils::truncate_chars;
use chrono::{DateTime, Utc};
use reqwest::header::{CONTENT_RANGE, CONTENT_TYPE, LOCATION, RANGE};
use reqwest::{Client, StatusCode, redirect};
use serde::Deserialize;
use serde_json::json;
use std::path::Path;
use tokio::fs;
use tracing::{info, instrument, warn};
use url::Url;

pub const DEFAULT_UPLOAD_BASE_URL: &str = "https://www.googleapis.com/upload/youtube/v3";
pub const DEFAULT_API_BASE_URL: &str = "https://www.googleapis.com/youtube/v3";

/// Consecutive `308`s without progress before the upload is abandoned.
const MAX_STALLED_RESPONSES: usize = 3;

#[derive(Debug, Deserialize)]
struct UploadedVideo {
    id: String,
}

#[derive(Debug, Deserialize)]
struct ListResponse<T> {
    #[serde(default = "Vec::new")]
    items: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct VideoResource {
    snippet: serde_json::Value,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChannelResource {
    content_details: ChannelContentDetails,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChannelContentDetails {
    related_playlists: RelatedPlaylists,
}

#[derive(Debug, Deserialize)]
struct RelatedPlaylists {
    uploads: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PlaylistItem {
    snippet: PlaylistSnippet,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlaylistSnippet {
    #[serde(default)]
    title: String,
    #[serde(default)]
    description: String,
    published_at: Option<DateTime<Utc>>,
    resource_id: ResourceId,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResourceId {
    video_id: String,
}

pub struct YouTubeUploader {
    client: Client,
    base_url: String,
    api_base_url: String,
    access_token: String,
    chunk_size: usize,
}

impl YouTubeUploader {
    pub fn new(
        base_url: &str,
        access_token: String,
        chunk_size: usize,
        timeout_secs: u64,
    ) -> Result<Self> {
        // 308 is the protocol's "resume incomplete", not a redirect.
        let client = http::builder(timeout_secs)
            .redirect(redirect::Policy::none())
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            access_token,
            chunk_size: chunk_size.max(1),
        })
    }

    pub fn with_api_base(mut self, api_base_url: &str) -> Self {
        self.api_base_url = api_base_url.trim_end_matches('/').to_string();
        self
    }

    /// Upload the video and, when given, its thumbnail. Returns the video id.
    #[instrument(level = "info", skip_all, fields(video = %request.video.display()))]
    pub async fn upload(&self, request: &PublishRequest) -> Result<String> {
        let video = fs::read(&request.video).await?;
        let session = self.open_session(request, video.len()).await?;
        let video_id = self.send_chunks(session.as_str(), &video).await?;
        info!(%video_id, "Video upload finished");

        if let Some(thumbnail) = request.thumbnail_file.as_deref() {
            if thumbnail.exists() {
                if let Err(e) = self.set_thumbnail(&video_id, thumbnail).await {
                    warn!(error = %e, path = %thumbnail.display(), "Thumbnail upload failed");
                }
            } else {
                warn!(path = %thumbnail.display(), "Thumbnail file not found; skipping");
            }
        }
        Ok(video_id)
    }

    async fn open_session(&self, request: &PublishRequest, total: usize) -> Result<Url> {
        let mut status = json!({
            "privacyStatus": request.privacy_status.as_str(),
            "selfDeclaredMadeForKids": false,
        });
        if let Some(at) = request.publish_at {
            status["publishAt"] = json!(at.to_rfc3339_opts(chrono::SecondsFormat::Secs, true));
        }
        let metadata = json!({
            "snippet": {
                "title": request.title,
                "description": request.description,
                "tags": request.tags,
                "categoryId": request.category_id,
            },
            "status": status,
        });

        let response = self
            .client
            .post(format!("{}/videos", self.base_url))
            .query(&[("uploadType", "resumable"), ("part", "snippet,status")])
            .bearer_auth(&self.access_token)
            .header("X-Upload-Content-Length", total.to_string())
            .header("X-Upload-Content-Type", "video/*")
            .json(&metadata)
            .send()
            .await?;
        let response = ensure_success("youtube", response).await?;
        let location = response
            .headers()
            .get(LOCATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| Error::Upload("session response has no Location header".into()))?;
        Ok(Url::parse(location)?)
    }

    async fn send_chunks(&self, session: &str, video: &[u8]) -> Result<String> {
        let total = video.len();
        let mut offset = 0usize;
        let mut stalled = 0usize;

        loop {
            let end = (offset + self.chunk_size).min(total);
            let content_range = if offset < total {
                format!("bytes {}-{}/{}", offset, end - 1, total)
            } else {
                format!("bytes */{total}")
            };
            let response = self
                .client
                .put(session)
                .bearer_auth(&self.access_token)
                .header(CONTENT_RANGE, content_range)
                .body(video[offset..end].to_vec())
                .send()
                .await?;

            match response.status() {
                StatusCode::OK | StatusCode::CREATED => {
                    let uploaded: UploadedVideo = response.json().await?;
                    return Ok(uploaded.id);
                }
                StatusCode::PERMANENT_REDIRECT => {
                    let committed = committed_bytes(response.headers().get(RANGE));
                    if committed <= offset {
                        stalled += 1;
                        if stalled >= MAX_STALLED_RESPONSES {
                            return Err(Error::Upload(format!("upload stalled at byte {offset}")));
                        }
                    } else {
                        stalled = 0;
                    }
                    offset = committed.min(total);
                    let percent = (offset * 100).checked_div(total).unwrap_or(100);
                    info!(uploaded = offset, total, percent, "Upload progress");
                }
                _ => {
                    ensure_success("youtube", response).await?;
                    return Err(Error::Upload("unexpected upload response".into()));
                }
            }
        }
    }

    async fn set_thumbnail(&self, video_id: &str, path: &Path) -> Result<()> {
        let bytes = fs::read(path).await?;
        let content_type = match path.extension().and_then(|e| e.to_str()) {
            Some("png") => "image/png",
            _ => "image/jpeg",
        };
        let response = self
            .client
            .post(format!("{}/thumbnails/set", self.base_url))
            .query(&[("videoId", video_id)])
            .bearer_auth(&self.access_token)
            .header(CONTENT_TYPE, content_type)
            .body(bytes)
            .send()
            .await?;
        ensure_success("youtube thumbnails", response).await?;
        info!(%video_id, "Thumbnail set");
        Ok(())
    }

    /// Replace title, description and/or tags of an uploaded video, keeping
    /// the rest of its snippet as the API returned it.
    #[instrument(level = "info", skip(self, update))]
    pub async fn update_video(&self, video_id: &str, update: &VideoUpdate) -> Result<()> {
        let response = self
            .client
            .get(format!("{}/videos", self.api_base_url))
            .query(&[("part", "snippet"), ("id", video_id)])
            .bearer_auth(&self.access_token)
            .send()
            .await?;
        let found: ListResponse<VideoResource> =
            ensure_success("youtube videos", response).await?.json().await?;
        let mut snippet = found
            .items
            .into_iter()
            .next()
            .map(|v| v.snippet)
            .ok_or_else(|| Error::Upload(format!("video {video_id} not found")))?;

        if let Some(title) = &update.title {
            snippet["title"] = json!(truncate_chars(title, MAX_TITLE_CHARS));
        }
        if let Some(description) = &update.description {
            snippet["description"] = json!(truncate_chars(description, MAX_DESCRIPTION_CHARS));
        }
        if let Some(tags) = &update.tags {
            snippet["tags"] = json!(limit_tags(tags.clone(), MAX_TAGS_CHARS));
        }

        let response = self
            .client
            .put(format!("{}/videos", self.api_base_url))
            .query(&[("part", "snippet")])
            .bearer_auth(&self.access_token)
            .json(&json!({ "id": video_id, "snippet": snippet }))
            .send()
            .await?;
        ensure_success("youtube videos", response).await?;
        info!(%video_id, "Video details updated");
        Ok(())
    }

    /// Most recent uploads of the authorized channel, newest first.
    #[instrument(level = "info", skip(self))]
    pub async fn list_my_videos(&self, max_results: usize) -> Result<Vec<ChannelVideo>> {
        let response = self
            .client
            .get(format!("{}/channels", self.api_base_url))
            .query(&[("part", "contentDetails"), ("mine", "true")])
            .bearer_auth(&self.access_token)
            .send()
            .await?;
        let channels: ListResponse<ChannelResource> =
            ensure_success("youtube channels", response).await?.json().await?;
        let Some(playlist) = channels
            .items
            .into_iter()
            .next()
            .and_then(|c| c.content_details.related_playlists.uploads)
        else {
            warn!("Authorized account has no channel uploads playlist");
            return Ok(Vec::new());
        };

        let max_results = max_results.to_string();
        let response = self
            .client
            .get(format!("{}/playlistItems", self.api_base_url))
            .query(&[
                ("part", "snippet"),
                ("playlistId", playlist.as_str()),
                ("maxResults", max_results.as_str()),
            ])
            .bearer_auth(&self.access_token)
            .send()
            .await?;
        let items: ListResponse<PlaylistItem> =
            ensure_success("youtube playlistItems", response).await?.json().await?;
        let videos: Vec<ChannelVideo> = items
            .items
            .into_iter()
            .map(|item| {
                let snippet = item.snippet;
                ChannelVideo {
                    url: watch_url(&snippet.resource_id.video_id),
                    video_id: snippet.resource_id.video_id,
                    title: snippet.title,
                    description: truncate_chars(&snippet.description, 100),
                    published_at: snippet.published_at,
                }
            })
            .collect();
        info!(count = videos.len(), %playlist, "Listed channel uploads");
        Ok(videos)
    }
}

/// Bytes the server has committed, from a `Range: bytes=0-N` header.
fn committed_bytes(range: Option<&reqwest::header::HeaderValue>) -> usize {
    range
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().strip_prefix("bytes=0-"))
        .and_then(|last| last.parse::<usize>().ok())
        .map_or(0, |last| last + 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PrivacyStatus;
    use crate::test_support::{StubResponse, serve};
    use reqwest::header::HeaderValue;
    use std::path::PathBuf;

    fn request(video: PathBuf) -> PublishRequest {
        PublishRequest {
            video,
            title: "삼성전자 투자".to_string(),
            description: "설명".to_string(),
            tags: vec!["삼성".to_string(), "반도체".to_string()],
            category_id: "25".to_string(),
            privacy_status: PrivacyStatus::Private,
            thumbnail_file: None,
            publish_at: None,
        }
    }

    #[tokio::test]
    async fn test_update_video_merges_snippet() {
        let (base, requests) = serve(|_| {
            vec![
                StubResponse::json(
                    200,
                    json!({"items": [{"id": "vid9", "snippet": {
                        "title": "옛 제목",
                        "description": "옛 설명",
                        "categoryId": "25"
                    }}]}),
                ),
                StubResponse::json(200, json!({"id": "vid9"})),
            ]
        })
        .await;
        let uploader = YouTubeUploader::new(&base, "token".to_string(), 4, 5)
            .unwrap()
            .with_api_base(&base);
        let update = VideoUpdate {
            title: Some("새 제목".to_string()),
            description: None,
            tags: Some(vec!["뉴스".to_string()]),
        };
        uploader.update_video("vid9", &update).await.unwrap();

        let seen = requests.await.unwrap();
        assert!(seen[0].request_line().starts_with("GET /videos?part=snippet&id=vid9"));
        assert!(seen[1].request_line().starts_with("PUT /videos?part=snippet"));
        let body: serde_json::Value = serde_json::from_slice(&seen[1].body).unwrap();
        assert_eq!(body["id"], "vid9");
        assert_eq!(body["snippet"]["title"], "새 제목");
        assert_eq!(body["snippet"]["description"], "옛 설명");
        assert_eq!(body["snippet"]["categoryId"], "25");
        assert_eq!(body["snippet"]["tags"], json!(["뉴스"]));
    }

    #[tokio::test]
    async fn test_update_missing_video_is_an_error() {
        let (base, requests) = serve(|_| vec![StubResponse::json(200, json!({"items": []}))]).await;
        let uploader = YouTubeUploader::new(&base, "token".to_string(), 4, 5)
            .unwrap()
            .with_api_base(&base);
        let err = uploader
            .update_video("gone", &VideoUpdate::default())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Upload(_)));
        assert_eq!(requests.await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_list_my_videos_follows_uploads_playlist() {
        let long = "가".repeat(150);
        let (base, requests) = serve(|_| {
            vec![
                StubResponse::json(
                    200,
                    json!({"items": [{"contentDetails": {"relatedPlaylists": {"uploads": "UUabc"}}}]}),
                ),
                StubResponse::json(
                    200,
                    json!({"items": [{"snippet": {
                        "title": "최근 영상",
                        "description": long,
                        "publishedAt": "2026-10-19T07:00:00Z",
                        "resourceId": {"kind": "youtube#video", "videoId": "v1"}
                    }}]}),
                ),
            ]
        })
        .await;
        let uploader = YouTubeUploader::new(&base, "token".to_string(), 4, 5)
            .unwrap()
            .with_api_base(&base);
        let videos = uploader.list_my_videos(5).await.unwrap();

        assert_eq!(videos.len(), 1);
        assert_eq!(videos[0].video_id, "v1");
        assert_eq!(videos[0].url, "https://www.youtube.com/watch?v=v1");
        assert_eq!(videos[0].description.chars().count(), 100);
        assert!(videos[0].published_at.is_some());

        let seen = requests.await.unwrap();
        assert!(seen[0].request_line().starts_with("GET /channels?part=contentDetails&mine=true"));
        assert!(
            seen[1]
                .request_line()
                .starts_with("GET /playlistItems?part=snippet&playlistId=UUabc&maxResults=5")
        );
    }

    #[tokio::test]
    async fn test_list_without_channel_is_empty() {
        let (base, _requests) = serve(|_| vec![StubResponse::json(200, json!({"items": []}))]).await;
        let uploader = YouTubeUploader::new(&base, "token".to_string(), 4, 5)
            .unwrap()
            .with_api_base(&base);
        assert!(uploader.list_my_videos(10).await.unwrap().is_empty());
    }

    #[test]
    fn test_committed_bytes() {
        assert_eq!(committed_bytes(Some(&HeaderValue::from_static("bytes=0-3"))), 4);
        assert_eq!(committed_bytes(None), 0);
        assert_eq!(committed_bytes(Some(&HeaderValue::from_static("junk"))), 0);
    }

    #[tokio::test]
    async fn test_multi_chunk_upload() {
        let tmp = tempfile::tempdir().unwrap();
        let video = tmp.path().join("video.mp4");
        std::fs::write(&video, b"0123456789").unwrap();
        let thumbnail = tmp.path().join("thumb.png");
        std::fs::write(&thumbnail, b"png").unwrap();

        let (base, requests) = serve(|base| {
            vec![
                StubResponse::new(200, "").header("Location", &format!("{base}/session/1")),
                StubResponse::new(308, "").header("Range", "bytes=0-3"),
                StubResponse::new(308, "").header("Range", "bytes=0-7"),
                StubResponse::json(200, json!({ "id": "vid123", "kind": "youtube#video" })),
                StubResponse::new(500, "thumbnail backend down"),
            ]
        })
        .await;

        let uploader = YouTubeUploader::new(&base, "token".to_string(), 4, 5).unwrap();
        let mut req = request(video);
        req.thumbnail_file = Some(thumbnail);
        let id = uploader.upload(&req).await.unwrap();
        assert_eq!(id, "vid123");

        let seen = requests.await.unwrap();
        assert_eq!(seen.len(), 5);
        assert!(
            seen[0]
                .request_line()
                .starts_with("POST /videos?uploadType=resumable&part=snippet%2Cstatus")
        );
        assert_eq!(seen[0].header("x-upload-content-length").as_deref(), Some("10"));
        assert_eq!(seen[0].header("authorization").as_deref(), Some("Bearer token"));
        let metadata: serde_json::Value = serde_json::from_slice(&seen[0].body).unwrap();
        assert_eq!(metadata["snippet"]["title"], "삼성전자 투자");
        assert_eq!(metadata["status"]["privacyStatus"], "private");

        assert!(seen[1].request_line().starts_with("PUT /session/1"));
        assert_eq!(seen[1].header("content-range").as_deref(), Some("bytes 0-3/10"));
        assert_eq!(seen[1].body, b"0123");
        assert_eq!(seen[2].header("content-range").as_deref(), Some("bytes 4-7/10"));
        assert_eq!(seen[3].header("content-range").as_deref(), Some("bytes 8-9/10"));
        assert_eq!(seen[3].body, b"89");
        assert!(seen[4].request_line().starts_with("POST /thumbnails/set?videoId=vid123"));
    }

    #[tokio::test]
    async fn test_resumes_from_acknowledged_range() {
        let tmp = tempfile::tempdir().unwrap();
        let video = tmp.path().join("video.mp4");
        std::fs::write(&video, b"abcdef").unwrap();

        let (base, requests) = serve(|base| {
            vec![
                StubResponse::new(200, "").header("Location", &format!("{base}/session/2")),
                StubResponse::new(308, "").header("Range", "bytes=0-1"),
                StubResponse::json(201, json!({ "id": "vid456" })),
            ]
        })
        .await;

        let uploader = YouTubeUploader::new(&base, "token".to_string(), 4, 5).unwrap();
        assert_eq!(uploader.upload(&request(video)).await.unwrap(), "vid456");

        let seen = requests.await.unwrap();
        assert_eq!(seen[2].header("content-range").as_deref(), Some("bytes 2-5/6"));
        assert_eq!(seen[2].body, b"cdef");
    }

    #[tokio::test]
    async fn test_scheduled_upload_sends_publish_at() {
        let tmp = tempfile::tempdir().unwrap();
        let video = tmp.path().join("video.mp4");
        std::fs::write(&video, b"xy").unwrap();

        let (base, requests) = serve(|base| {
            vec![
                StubResponse::new(200, "").header("Location", &format!("{base}/session/3")),
                StubResponse::json(200, json!({ "id": "sched" })),
            ]
        })
        .await;

        let uploader = YouTubeUploader::new(&base, "token".to_string(), 4, 5).unwrap();
        let mut req = request(video);
        req.publish_at = Some("2026-10-20T09:00:00Z".parse().unwrap());
        uploader.upload(&req).await.unwrap();

        let seen = requests.await.unwrap();
        let metadata: serde_json::Value = serde_json::from_slice(&seen[0].body).unwrap();
        assert_eq!(metadata["status"]["publishAt"], "2026-10-20T09:00:00Z");
    }

    #[tokio::test]
    async fn test_session_rejection_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        let video = tmp.path().join("video.mp4");
        std::fs::write(&video, b"xy").unwrap();

        let (base, _requests) = serve(|_| vec![StubResponse::new(401, "invalid credentials")]).await;
        let uploader = YouTubeUploader::new(&base, "token".to_string(), 4, 5).unwrap();
        let err = uploader.upload(&request(video)).await.unwrap_err();
        assert!(matches!(err, Error::BackendStatus { status: 401, .. }));
    }
}
