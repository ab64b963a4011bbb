//! Google News RSS search feed.
//!
//! One request per keyword against the public search feed; no API key is
//! needed. Summaries in the feed are HTML fragments and are reduced to plain
//! text before they reach the rest of the pipeline.
//!
//! # URL Pattern
//!
//! `https://news.google.com/rss/search?q={keyword}&hl=ko&gl=KR&ceid=KR:ko`

use crate::error::Result;
use crate::http::ensure_success;
use crate::models::Article;
use crate::utils::html_to_text;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info, instrument};

pub const DEFAULT_BASE_URL: &str = "https://news.google.com";
pub const SOURCE_ID: &str = "google_news";

#[derive(Debug, Deserialize)]
struct Rss {
    channel: Channel,
}

#[derive(Debug, Deserialize)]
struct Channel {
    #[serde(rename = "item", default)]
    items: Vec<Item>,
}

#[derive(Debug, Deserialize)]
struct Item {
    #[serde(default)]
    title: String,
    #[serde(default)]
    link: String,
    #[serde(default)]
    description: String,
    #[serde(rename = "pubDate", default)]
    pub_date: Option<String>,
}

pub fn feed_url(base: &str, keyword: &str, language: &str, region: &str) -> String {
    format!(
        "{}/rss/search?q={}&hl={language}&gl={region}&ceid={region}:{language}",
        base.trim_end_matches('/'),
        urlencoding::encode(keyword)
    )
}

/// Fetch and parse the search feed for one keyword.
#[instrument(level = "info", skip(client, base), fields(%keyword))]
pub async fn fetch(
    client: &Client,
    base: &str,
    keyword: &str,
    language: &str,
    region: &str,
    limit: usize,
) -> Result<Vec<Article>> {
    let url = feed_url(base, keyword, language, region);
    debug!(%url, "Requesting Google News feed");
    let response = ensure_success(SOURCE_ID, client.get(&url).send().await?).await?;
    let xml = response.text().await?;
    let articles = parse_feed(&xml, keyword, limit)?;
    info!(count = articles.len(), "Parsed Google News items");
    Ok(articles)
}

/// Parse an RSS document into at most `limit` articles.
pub fn parse_feed(xml: &str, keyword: &str, limit: usize) -> Result<Vec<Article>> {
    let rss: Rss = quick_xml::de::from_str(xml)?;
    Ok(rss
        .channel
        .items
        .into_iter()
        .filter(|item| !item.title.trim().is_empty())
        .take(limit)
        .map(|item| Article {
            title: item.title.trim().to_string(),
            description: html_to_text(&item.description),
            link: item.link.trim().to_string(),
            published_at: item.pub_date.as_deref().and_then(parse_pub_date),
            keyword: keyword.to_string(),
            source: SOURCE_ID.to_string(),
            relevance_score: 0.0,
            content: None,
        })
        .collect())
}

/// RSS dates are RFC 2822 (`Mon, 19 Oct 2026 07:00:00 GMT`).
pub(crate) fn parse_pub_date(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc2822(raw.trim())
        .ok()
        .map(|d| d.with_timezone(&Utc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{StubResponse, serve};

    const FEED: &str = r##"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<rss version="2.0" xmlns:media="http://search.yahoo.com/mrss/">
  <channel>
    <generator>NFE/5.0</generator>
    <title>"삼성" - Google 뉴스</title>
    <link>https://news.google.com/search?q=%EC%82%BC%EC%84%B1</link>
    <language>ko</language>
    <item>
      <title>삼성전자, 반도체 50조 투자 발표 - 연합뉴스</title>
      <link>https://news.google.com/rss/articles/abc?oc=5</link>
      <guid isPermaLink="false">abc</guid>
      <pubDate>Mon, 19 Oct 2026 07:00:00 GMT</pubDate>
      <description>&lt;a href="https://example.com/1"&gt;삼성전자, 반도체 50조 투자 발표&lt;/a&gt;&amp;nbsp;&amp;nbsp;&lt;font color="#6f6f6f"&gt;연합뉴스&lt;/font&gt;</description>
      <source url="https://www.yna.co.kr">연합뉴스</source>
    </item>
    <item>
      <title>삼성 &amp; 현대, 공동 협력</title>
      <link>https://news.google.com/rss/articles/def?oc=5</link>
      <pubDate>not a date</pubDate>
      <description><![CDATA[<b>협력</b> 확대]]></description>
    </item>
    <item>
      <title>세 번째 기사</title>
      <link>https://news.google.com/rss/articles/ghi?oc=5</link>
    </item>
  </channel>
</rss>"##;

    #[test]
    fn test_feed_url_encodes_keyword() {
        let url = feed_url("https://news.google.com/", "삼성 전자", "ko", "KR");
        assert!(url.starts_with("https://news.google.com/rss/search?q=%EC%82%BC%EC%84%B1%20"));
        assert!(url.ends_with("&hl=ko&gl=KR&ceid=KR:ko"));
    }

    #[test]
    fn test_parse_feed_normalizes_items() {
        let articles = parse_feed(FEED, "삼성", 10).unwrap();
        assert_eq!(articles.len(), 3);

        let first = &articles[0];
        assert_eq!(first.title, "삼성전자, 반도체 50조 투자 발표 - 연합뉴스");
        assert_eq!(first.link, "https://news.google.com/rss/articles/abc?oc=5");
        assert_eq!(first.keyword, "삼성");
        assert_eq!(first.source, "google_news");
        assert!(first.description.contains("반도체 50조 투자 발표"));
        assert!(!first.description.contains('<'));
        assert!(first.published_at.is_some());

        assert_eq!(articles[1].title, "삼성 & 현대, 공동 협력");
        assert_eq!(articles[1].description, "협력 확대");
        assert!(articles[1].published_at.is_none());
        assert_eq!(articles[2].description, "");
    }

    #[test]
    fn test_parse_feed_respects_limit() {
        let articles = parse_feed(FEED, "삼성", 2).unwrap();
        assert_eq!(articles.len(), 2);
    }

    #[test]
    fn test_parse_feed_rejects_garbage() {
        assert!(parse_feed("<html><body>blocked</body></html>", "삼성", 10).is_err());
    }

    #[tokio::test]
    async fn test_fetch_against_stub() {
        let (base, requests) = serve(|_| vec![StubResponse::new(200, FEED)]).await;
        let client = crate::http::client(5).unwrap();
        let articles = fetch(&client, &base, "삼성", "ko", "KR", 10).await.unwrap();
        assert_eq!(articles.len(), 3);

        let seen = requests.await.unwrap();
        assert!(seen[0].request_line().starts_with("GET /rss/search?q=%EC%82%BC%EC%84%B1"));
    }

    #[tokio::test]
    async fn test_fetch_surfaces_http_errors() {
        let (base, _requests) = serve(|_| vec![StubResponse::new(503, "busy")]).await;
        let client = crate::http::client(5).unwrap();
        let err = fetch(&client, &base, "삼성", "ko", "KR", 10).await.unwrap_err();
        assert!(err.to_string().contains("503"));
    }
}
