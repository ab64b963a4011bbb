//! News feeds the pipeline collects candidate articles from.
//!
//! | Feed | Module | Method | Notes |
//! |------|--------|--------|-------|
//! | Google News | [`google_news`] | RSS search | No credentials needed |
//! | Naver | [`naver`] | Search API | Client id and secret required |
//! | Offline | [`offline`] | Canned data | Deterministic, for runs without network |
//!
//! [`ArticleSource::collect`] queries every configured feed for every keyword.
//! A failing feed is logged and skipped; collection itself never fails.

pub mod article_body;
pub mod google_news;
pub mod naver;
pub mod offline;

use crate::config::{AppConfig, FeedConfig, FeedKind};
use crate::error::Result;
use crate::http;
use crate::models::Article;
use futures::stream::{self, StreamExt};
use reqwest::Client;
use tracing::{info, instrument, warn};

pub struct ArticleSource {
    client: Client,
    kinds: Vec<FeedKind>,
    feed: FeedConfig,
    per_keyword: usize,
    scrape_content: bool,
}

impl ArticleSource {
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        Ok(Self {
            client: http::client(config.feed.timeout_secs)?,
            kinds: config.sources.clone(),
            feed: config.feed.clone(),
            per_keyword: config.max_articles_per_keyword,
            scrape_content: config.scrape_content,
        })
    }

    /// Collect up to `max_articles_per_keyword` items per keyword and feed.
    #[instrument(level = "info", skip_all, fields(keywords = keywords.len(), feeds = self.kinds.len()))]
    pub async fn collect(&self, keywords: &[String]) -> Vec<Article> {
        let mut collected = Vec::new();
        for keyword in keywords.iter().map(|k| k.trim()).filter(|k| !k.is_empty()) {
            for kind in &self.kinds {
                match self.fetch(*kind, keyword).await {
                    Ok(articles) => collected.extend(articles),
                    Err(e) => warn!(error = %e, feed = ?kind, %keyword, "Feed failed; skipping"),
                }
            }
        }

        if self.scrape_content {
            collected = self.attach_bodies(collected).await;
        }

        info!(count = collected.len(), "Collected articles");
        collected
    }

    async fn fetch(&self, kind: FeedKind, keyword: &str) -> Result<Vec<Article>> {
        match kind {
            FeedKind::GoogleNews => {
                let base = self
                    .feed
                    .google_news_base_url
                    .as_deref()
                    .unwrap_or(google_news::DEFAULT_BASE_URL);
                google_news::fetch(
                    &self.client,
                    base,
                    keyword,
                    &self.feed.language,
                    &self.feed.region,
                    self.per_keyword,
                )
                .await
            }
            FeedKind::Naver => {
                let (Some(client_id), Some(client_secret)) = (
                    self.feed.naver_client_id.as_deref(),
                    self.feed.naver_client_secret.as_deref(),
                ) else {
                    warn!("Naver feed configured without client credentials; skipping");
                    return Ok(Vec::new());
                };
                let base = self
                    .feed
                    .naver_base_url
                    .as_deref()
                    .unwrap_or(naver::DEFAULT_BASE_URL);
                let credentials = naver::Credentials {
                    client_id,
                    client_secret,
                };
                naver::fetch(&self.client, base, &credentials, keyword, self.per_keyword).await
            }
            FeedKind::Offline => Ok(offline::sample_articles(keyword, self.per_keyword)),
        }
    }

    /// Fetch each article's page one at a time and keep whatever body text it yields.
    async fn attach_bodies(&self, articles: Vec<Article>) -> Vec<Article> {
        stream::iter(articles)
            .then(|mut article| async move {
                if article.source != offline::SOURCE_ID {
                    match article_body::scrape_article_content(&self.client, &article.link).await {
                        Ok(body) => article.content = body,
                        Err(e) => warn!(error = %e, link = %article.link, "Body scrape failed"),
                    }
                }
                article
            })
            .collect()
            .await
    }
}
