//! Naver news search API.
//!
//! Requires an application client id and secret. Titles and descriptions
//! come back with `<b>` highlight markup and HTML entities, both removed here.

use crate::error::Result;
use crate::http::ensure_success;
use crate::models::Article;
use crate::sources::google_news::parse_pub_date;
use crate::utils::html_to_text;
use reqwest::Client;
use serde::Deserialize;
use tracing::{info, instrument};

pub const DEFAULT_BASE_URL: &str = "https://openapi.naver.com";
pub const SOURCE_ID: &str = "naver";

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    title: String,
    #[serde(default)]
    description: String,
    link: String,
    #[serde(rename = "pubDate", default)]
    pub_date: Option<String>,
}

pub struct Credentials<'a> {
    pub client_id: &'a str,
    pub client_secret: &'a str,
}

/// Search the news index for one keyword, most similar first.
#[instrument(level = "info", skip(client, base, credentials), fields(%keyword))]
pub async fn fetch(
    client: &Client,
    base: &str,
    credentials: &Credentials<'_>,
    keyword: &str,
    limit: usize,
) -> Result<Vec<Article>> {
    let url = format!("{}/v1/search/news.json", base.trim_end_matches('/'));
    let display = limit.to_string();
    let response = client
        .get(&url)
        .header("X-Naver-Client-Id", credentials.client_id)
        .header("X-Naver-Client-Secret", credentials.client_secret)
        .query(&[("query", keyword), ("display", display.as_str()), ("sort", "sim")])
        .send()
        .await?;
    let body = ensure_success(SOURCE_ID, response).await?.text().await?;
    let articles = parse_response(&body, keyword, limit)?;
    info!(count = articles.len(), "Parsed Naver news items");
    Ok(articles)
}

pub fn parse_response(body: &str, keyword: &str, limit: usize) -> Result<Vec<Article>> {
    let response: SearchResponse = serde_json::from_str(body)?;
    Ok(response
        .items
        .into_iter()
        .take(limit)
        .map(|item| Article {
            title: html_to_text(&item.title),
            description: html_to_text(&item.description),
            link: item.link,
            published_at: item.pub_date.as_deref().and_then(parse_pub_date),
            keyword: keyword.to_string(),
            source: SOURCE_ID.to_string(),
            relevance_score: 0.0,
            content: None,
        })
        .collect())
}
