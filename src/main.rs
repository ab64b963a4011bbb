//! # headline_studio
//!
//! Turns trending Korean news headlines into narrated placeholder videos and,
//! optionally, publishes them to YouTube.
//!
//! ## Usage
//!
//! ```sh
//! headline_studio --config config.yaml
//! headline_studio --offline --keywords 삼성,쿠팡
//! ```
//!
//! ## Architecture
//!
//! 1. **Collection**: query every configured feed for every keyword
//! 2. **Ranking**: deduplicate, score by keyword hits, keep the daily quota
//! 3. **Generation**: script, thumbnail titles and metadata per article
//! 4. **Narration**: chunked voice synthesis into one audio file
//! 5. **Assembly**: placeholder video artifact
//! 6. **Publishing**: resumable YouTube upload (when enabled)
//! 7. **Output**: JSON and Markdown run reports
//!
//! `--list-uploads` and `--update-video` run channel maintenance through the
//! publisher instead of the pipeline.
//!
//! Text generation and voice synthesis fall back to offline stand-ins when
//! their backend is missing or failing, unless `strict_backends` is set.

use clap::Parser;
use std::error::Error;
use tracing::{debug, error, info, instrument};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod assembly;
mod cli;
mod config;
mod error;
mod generation;
mod http;
mod models;
mod narration;
mod outputs;
mod pipeline;
mod publisher;
mod relevance;
mod sources;
#[cfg(test)]
mod test_support;
mod utils;

use cli::Cli;
use config::AppConfig;
use pipeline::Pipeline;
use publisher::Publisher;
use utils::ensure_writable_dir;

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("headline_studio starting up");

    // Parse CLI
    let args = Cli::parse();
    debug!(?args.config, ?args.output_dir, offline = args.offline, "Parsed CLI arguments");

    // ---- Load, override and validate config ----
    let mut config = AppConfig::load(args.config.as_deref())?;
    args.apply(&mut config);
    if let Err(e) = config.validate() {
        error!(error = %e, "Invalid configuration");
        return Err(e.into());
    }
    info!(
        keywords = ?config.keywords,
        sources = ?config.sources,
        quota = config.daily_video_quota,
        auto_publish = config.publishing.auto_publish,
        "Configuration ready"
    );

    // ---- Channel maintenance ----
    if args.list_uploads.is_some() || args.update_video.is_some() {
        let publisher = Publisher::from_config(&config.publishing).await?;
        if let Some(video_id) = &args.update_video {
            let status = publisher.update_video(video_id, &args.video_update()).await?;
            info!(%video_id, ?status, "Video update finished");
        }
        if let Some(max_results) = args.list_uploads {
            let videos = publisher.list_recent_uploads(max_results).await?;
            println!("{}", serde_json::to_string_pretty(&videos)?);
        }
        info!(elapsed = ?start_time.elapsed(), "Execution complete");
        return Ok(());
    }

    // Early check: ensure the output dir is writable
    if let Err(e) = ensure_writable_dir(&config.output_dir).await {
        error!(
            path = %config.output_dir.display(),
            error = %e,
            "Output directory is not writable (fix perms or choose a different path)"
        );
        return Err(e);
    }

    // ---- Run ----
    let pipeline = Pipeline::from_config(config).await?;
    let report = pipeline.run().await?;

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        total = report.total_videos,
        completed = report.completed,
        failed = report.failed,
        "Execution complete"
    );

    Ok(())
}
