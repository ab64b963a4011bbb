//! Human-readable Markdown digest of a run report.

use crate::error::{Error, Result};
use crate::models::{PipelineReport, Provenance, RunRecord, RunStatus};
use std::fmt::{self, Write};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{info, instrument};

/// Render the report as Markdown: a summary line, then one section per run.
pub fn render_report(report: &PipelineReport) -> std::result::Result<String, fmt::Error> {
    let mut md = String::new();
    writeln!(
        md,
        "# Pipeline run {}\n",
        report.timestamp.format("%Y-%m-%d %H:%M:%S")
    )?;
    writeln!(
        md,
        "{} videos: {} completed, {} failed\n",
        report.total_videos, report.completed, report.failed
    )?;
    if report.results.is_empty() {
        writeln!(md, "_No articles passed the relevance filter._")?;
    }
    for (i, run) in report.results.iter().enumerate() {
        render_run(&mut md, i + 1, run)?;
    }
    Ok(md)
}

fn render_run(md: &mut String, index: usize, run: &RunRecord) -> fmt::Result {
    let status = match run.status {
        RunStatus::Completed => "completed",
        RunStatus::Failed => "failed",
        RunStatus::Processing => "processing",
    };
    writeln!(md, "## {index}. {}\n", run.article_title)?;
    writeln!(md, "- Status: **{status}**")?;
    if let Some(error) = &run.error {
        writeln!(md, "- Error: `{error}`")?;
    }
    if let Some(title) = &run.thumbnail_title {
        writeln!(md, "- Thumbnail: {title}")?;
    }
    if let Some(title) = run.metadata.as_ref().and_then(|m| m.title.as_ref()) {
        writeln!(md, "- Video title: {title}")?;
    }
    if let Some(audio) = &run.audio {
        writeln!(
            md,
            "- Audio: `{}` ({}, {} chunk(s))",
            audio.path.display(),
            audio.status,
            audio.chunks
        )?;
    }
    if let Some(video) = &run.video {
        writeln!(md, "- Video: `{}`", video.path.display())?;
    }
    if let Some(publish) = &run.publish {
        match (&publish.video_url, &publish.error) {
            (Some(url), _) => writeln!(md, "- Published: <{url}>")?,
            (None, Some(error)) => writeln!(md, "- Publish error: `{error}`")?,
            (None, None) => {}
        }
    }
    let degraded: Vec<String> = run
        .provenance
        .iter()
        .filter(|p| p.provenance == Provenance::Fallback)
        .map(|p| format!("{:?}", p.stage).to_lowercase())
        .collect();
    if !degraded.is_empty() {
        writeln!(md, "- Fallback stages: {}", degraded.join(", "))?;
    }
    writeln!(md)
}

/// Write the digest next to the JSON report as `{output_dir}/{stem}.md`.
#[instrument(level = "info", skip_all, fields(output_dir = %output_dir.display(), %stem))]
pub async fn write_report_digest(
    output_dir: &Path,
    report: &PipelineReport,
    stem: &str,
) -> Result<PathBuf> {
    let md = render_report(report).map_err(|e| Error::Io(std::io::Error::other(e)))?;
    fs::create_dir_all(output_dir).await?;
    let path = output_dir.join(format!("{stem}.md"));
    fs::write(&path, md).await?;
    info!(path = %path.display(), "Wrote report digest");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        Generated, PublishResult, RunRecord, Stage, VideoMetadata, sample_article,
    };

    #[test]
    fn test_render_lists_runs_and_fallbacks() {
        let mut ok = RunRecord::start(&sample_article("삼성전자 투자 발표"));
        ok.status = RunStatus::Completed;
        ok.metadata = Some(VideoMetadata {
            title: Some("[속보] 반도체".to_string()),
            ..VideoMetadata::default()
        });
        ok.note(
            Stage::Script,
            Generated::Fallback {
                value: (),
                reason: "timeout".to_string(),
            },
        );
        ok.publish = Some(PublishResult::failed("quota"));

        let mut bad = RunRecord::start(&sample_article("날씨 예보"));
        bad.status = RunStatus::Failed;
        bad.error = Some("disk full".to_string());

        let md = render_report(&PipelineReport::from_runs(vec![ok, bad])).unwrap();
        assert!(md.contains("2 videos: 1 completed, 1 failed"));
        assert!(md.contains("## 1. 삼성전자 투자 발표"));
        assert!(md.contains("- Video title: [속보] 반도체"));
        assert!(md.contains("- Fallback stages: script"));
        assert!(md.contains("- Publish error: `quota`"));
        assert!(md.contains("- Error: `disk full`"));
    }

    #[test]
    fn test_render_empty_report() {
        let md = render_report(&PipelineReport::from_runs(Vec::new())).unwrap();
        assert!(md.contains("0 videos"));
        assert!(md.contains("No articles passed"));
    }
}
