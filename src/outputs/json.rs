//! JSON persistence of collected articles and run reports.
//!
//! ```text
//! output_dir/
//! ├── collected_news.json                  # {collected_at, total_count, articles}
//! └── workflow_results_20261019_070000.json
//! ```

use crate::error::Result;
use crate::models::{Article, PipelineReport};
use chrono::{DateTime, Local};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{error, info, instrument};

pub const COLLECTED_FILE: &str = "collected_news.json";

#[derive(Serialize)]
struct CollectedNews<'a> {
    collected_at: DateTime<Local>,
    total_count: usize,
    articles: &'a [Article],
}

/// Write the ranked articles to `{output_dir}/collected_news.json`.
#[instrument(level = "info", skip_all, fields(output_dir = %output_dir.display(), count = articles.len()))]
pub async fn write_collected_articles(output_dir: &Path, articles: &[Article]) -> Result<PathBuf> {
    let json = serde_json::to_string_pretty(&CollectedNews {
        collected_at: Local::now(),
        total_count: articles.len(),
        articles,
    })?;
    let path = output_dir.join(COLLECTED_FILE);
    write_file(output_dir, &path, json).await?;
    info!(path = %path.display(), "Wrote collected articles");
    Ok(path)
}

/// Write the aggregate report to `{output_dir}/{stem}.json`.
#[instrument(level = "info", skip_all, fields(output_dir = %output_dir.display(), %stem))]
pub async fn write_report(output_dir: &Path, report: &PipelineReport, stem: &str) -> Result<PathBuf> {
    let json = serde_json::to_string_pretty(report)?;
    let path = output_dir.join(format!("{stem}.json"));
    write_file(output_dir, &path, json).await?;
    info!(path = %path.display(), total = report.total_videos, "Wrote run report");
    Ok(path)
}

async fn write_file(dir: &Path, path: &Path, contents: String) -> Result<()> {
    if let Err(e) = fs::create_dir_all(dir).await {
        error!(dir = %dir.display(), error = %e, "Failed to create output dir");
        return Err(e.into());
    }
    fs::write(path, contents).await?;
    Ok(())
}
