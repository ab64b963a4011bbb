//! Keyword relevance scoring and ranking.
//!
//! The score of an article is the number of configured keywords found in its
//! lowercased title plus a constant bonus. Articles below the threshold are
//! dropped (the threshold itself is inclusive), the rest are sorted by score,
//! highest first, with ties kept in input order.
//!
//! Duplicates reachable through several keywords or feeds are removed before
//! scoring, according to a [`DedupPolicy`].

use crate::models::Article;
use itertools::Itertools;
use serde::Deserialize;
use tracing::{debug, info, instrument};

/// How two articles are recognised as the same story.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DedupPolicy {
    /// Identical link.
    Link,
    /// Same title once lowercased and stripped of punctuation and spacing.
    Title,
    /// Keep every article.
    None,
}

impl DedupPolicy {
    fn key(&self, article: &Article) -> String {
        match self {
            DedupPolicy::Link => article.link.trim().to_string(),
            DedupPolicy::Title => normalized_title(&article.title),
            DedupPolicy::None => String::new(),
        }
    }
}

fn normalized_title(title: &str) -> String {
    title
        .to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric())
        .collect()
}

#[derive(Debug, Clone)]
pub struct RelevanceFilter {
    keywords: Vec<String>,
    bonus: f64,
    dedup: DedupPolicy,
}

impl RelevanceFilter {
    pub fn new(keywords: &[String], bonus: f64, dedup: DedupPolicy) -> Self {
        Self {
            keywords: keywords
                .iter()
                .map(|k| k.trim().to_lowercase())
                .filter(|k| !k.is_empty())
                .collect(),
            bonus,
            dedup,
        }
    }

    /// Keyword hits in the title plus the constant bonus.
    pub fn score(&self, title: &str) -> f64 {
        let title = title.to_lowercase();
        let hits = self
            .keywords
            .iter()
            .filter(|k| title.contains(k.as_str()))
            .count();
        hits as f64 + self.bonus
    }

    /// Remove duplicates according to the configured policy; first one wins.
    pub fn dedup(&self, articles: Vec<Article>) -> Vec<Article> {
        if self.dedup == DedupPolicy::None {
            return articles;
        }
        let before = articles.len();
        let unique: Vec<Article> = articles
            .into_iter()
            .unique_by(|a| self.dedup.key(a))
            .collect();
        debug!(before, after = unique.len(), policy = ?self.dedup, "Deduplicated articles");
        unique
    }

    /// Deduplicate, score, drop articles below `min_score` and rank the rest.
    #[instrument(level = "info", skip_all, fields(count = articles.len(), min_score = min_score))]
    pub fn filter(&self, articles: Vec<Article>, min_score: f64) -> Vec<Article> {
        let mut ranked: Vec<Article> = self
            .dedup(articles)
            .into_iter()
            .map(|mut article| {
                article.relevance_score = self.score(&article.title);
                article
            })
            .filter(|article| article.relevance_score >= min_score)
            .collect();

        // Vec::sort_by is stable, so equal scores keep feed order.
        ranked.sort_by(|a, b| b.relevance_score.total_cmp(&a.relevance_score));

        info!(kept = ranked.len(), "Ranked articles by relevance");
        ranked
    }
}
