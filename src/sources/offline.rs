//! Deterministic stand-in feed.
//!
//! Used when the pipeline runs offline (`--offline` or `sources: [offline]`):
//! every keyword yields the same small set of articles, so the rest of the
//! pipeline can be exercised without network access.

use crate::models::Article;
use chrono::Utc;

pub const SOURCE_ID: &str = "offline";

pub fn sample_articles(keyword: &str, limit: usize) -> Vec<Article> {
    let encoded = urlencoding::encode(keyword);
    let stories = [
        (
            format!("{keyword} 관련 주요 발표, 업계 이목 집중"),
            format!("{keyword} 관련 발표가 이어지며 시장의 관심이 커지고 있습니다."),
        ),
        (
            format!("전문가들이 본 {keyword} 이슈의 향후 전망"),
            format!("전문가들은 {keyword} 이슈가 당분간 이어질 것으로 내다봤습니다."),
        ),
    ];
    stories
        .into_iter()
        .enumerate()
        .take(limit)
        .map(|(i, (title, description))| Article {
            title,
            description,
            link: format!("https://news.example.com/offline/{encoded}/{}", i + 1),
            published_at: Some(Utc::now()),
            keyword: keyword.to_string(),
            source: SOURCE_ID.to_string(),
            relevance_score: 0.0,
            content: None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_articles_mention_keyword() {
        let articles = sample_articles("쿠팡", 10);
        assert_eq!(articles.len(), 2);
        assert!(articles.iter().all(|a| a.title.contains("쿠팡")));
        assert!(articles.iter().all(|a| a.source == "offline"));
        assert_ne!(articles[0].link, articles[1].link);
    }

    #[test]
    fn test_sample_articles_respect_limit() {
        assert_eq!(sample_articles("AI", 1).len(), 1);
        assert!(sample_articles("AI", 0).is_empty());
    }
}
