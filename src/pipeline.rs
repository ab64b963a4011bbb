//! End-to-end orchestration.
//!
//! collect → rank → persist ranked articles → take the daily quota → for each
//! article: script → thumbnail titles → metadata → audio → video → (publish)
//! → persist the aggregate report.
//!
//! Articles are processed one at a time. A stage error fails that article's
//! run and the batch moves on; only failures to persist batch-level outputs
//! abort [`Pipeline::run`].

use crate::assembly::PlaceholderAssembler;
use crate::config::AppConfig;
use crate::error::Result;
use crate::generation::ContentGenerator;
use crate::models::{
    Article, Generated, PipelineReport, PublishResult, PublishStatus, RunRecord, RunStatus, Stage,
};
use crate::narration::Synthesizer;
use crate::outputs::{json, markdown};
use crate::publisher::{PublishRequest, Publisher};
use crate::relevance::RelevanceFilter;
use crate::sources::ArticleSource;
use crate::utils::timestamp_slug;
use tracing::{error, info, instrument, warn};

pub const AUDIO_DIR: &str = "audio";
pub const VIDEO_DIR: &str = "videos";

pub struct Pipeline {
    config: AppConfig,
    source: ArticleSource,
    relevance: RelevanceFilter,
    generator: ContentGenerator,
    synthesizer: Synthesizer,
    assembler: PlaceholderAssembler,
    /// Present only when auto-publish is enabled.
    publisher: Option<Publisher>,
}

impl Pipeline {
    pub async fn from_config(config: AppConfig) -> Result<Self> {
        let strict = config.strict_backends;
        let publisher = if config.publishing.auto_publish {
            Some(Publisher::from_config(&config.publishing).await?)
        } else {
            None
        };
        Ok(Self {
            source: ArticleSource::from_config(&config)?,
            relevance: RelevanceFilter::new(&config.keywords, config.relevance_bonus, config.dedup),
            generator: ContentGenerator::from_config(&config.generation, strict)?,
            synthesizer: Synthesizer::from_config(
                &config.synthesis,
                config.output_dir.join(AUDIO_DIR),
                strict,
            )?,
            assembler: PlaceholderAssembler::new(config.output_dir.join(VIDEO_DIR)),
            publisher,
            config,
        })
    }

    /// Run the whole batch and persist its report.
    #[instrument(level = "info", skip_all, fields(output_dir = %self.config.output_dir.display()))]
    pub async fn run(&self) -> Result<PipelineReport> {
        let collected = self.source.collect(&self.config.keywords).await;
        let ranked = self.relevance.filter(collected, self.config.min_relevance);
        json::write_collected_articles(&self.config.output_dir, &ranked).await?;

        let selected: Vec<Article> = ranked
            .into_iter()
            .take(self.config.daily_video_quota)
            .collect();
        if selected.is_empty() {
            warn!("No article passed the relevance filter");
        }
        info!(
            selected = selected.len(),
            quota = self.config.daily_video_quota,
            generator = self.generator.backend_name(),
            "Selected articles"
        );

        let ts = timestamp_slug();
        let mut runs = Vec::with_capacity(selected.len());
        for (i, article) in selected.iter().enumerate() {
            info!(run = i + 1, of = selected.len(), title = %article.title, "Processing article");
            runs.push(self.process_article(&ts, i + 1, article).await);
        }

        let report = PipelineReport::from_runs(runs);
        let stem = format!("workflow_results_{ts}");
        json::write_report(&self.config.output_dir, &report, &stem).await?;
        markdown::write_report_digest(&self.config.output_dir, &report, &stem).await?;
        info!(
            total = report.total_videos,
            completed = report.completed,
            failed = report.failed,
            "Pipeline finished"
        );
        Ok(report)
    }

    /// Take one article to a terminal state. Never fails; errors land on the record.
    pub async fn process_article(&self, ts: &str, index: usize, article: &Article) -> RunRecord {
        let mut record = RunRecord::start(article);
        match self.run_stages(&mut record, ts, index, article).await {
            Ok(()) => record.status = RunStatus::Completed,
            Err(e) => {
                error!(title = %article.title, error = %e, "Run failed");
                record.status = RunStatus::Failed;
                record.error = Some(e.to_string());
            }
        }
        record
    }

    async fn run_stages(
        &self,
        record: &mut RunRecord,
        ts: &str,
        index: usize,
        article: &Article,
    ) -> Result<()> {
        let script = self.generator.generate_script(article).await?;
        let script = record.note(Stage::Script, script);
        record.script = Some(script.clone());

        let titles = self
            .generator
            .generate_thumbnail_titles(article, self.config.generation.thumbnail_count)
            .await?;
        let titles = record.note(Stage::ThumbnailTitles, titles);
        if titles.is_empty() {
            warn!(title = %article.title, "No thumbnail titles could be parsed");
        }
        record.thumbnail_title = titles.chosen().map(str::to_string);
        record.thumbnail_titles = titles;

        let metadata = self.generator.generate_metadata(article, &script).await?;
        let metadata = record.note(Stage::Metadata, metadata);
        record.metadata = Some(metadata.clone());

        let audio = self
            .synthesizer
            .synthesize(
                &script.narration,
                &self.config.synthesis.voice_style,
                &format!("voice_{ts}_{index:02}.mp3"),
            )
            .await?;
        let audio = record.note(Stage::Audio, audio);
        record.audio = Some(audio.clone());

        let video = self
            .assembler
            .assemble(&audio, &script, &format!("video_{ts}_{index:02}.mp4"))
            .await?;
        let video = record.note(Stage::Assemble, Generated::StandIn(video));
        record.video = Some(video.clone());

        let Some(publisher) = &self.publisher else {
            return Ok(());
        };
        let publishing = &self.config.publishing;
        let request = PublishRequest {
            video: video.path,
            title: metadata.title.unwrap_or_else(|| article.title.clone()),
            description: metadata.description.unwrap_or_default(),
            tags: metadata.tags.unwrap_or_default(),
            category_id: publishing.category_id.clone(),
            privacy_status: publishing.privacy_status,
            thumbnail_file: publishing.thumbnail_file.clone(),
            publish_at: publishing.publish_at,
        };
        let result = publisher.publish(request).await?;
        let result = record.note(Stage::Publish, publish_provenance(result));
        record.publish = Some(result);
        Ok(())
    }
}

fn publish_provenance(result: PublishResult) -> Generated<PublishResult> {
    match result.status {
        PublishStatus::Success => Generated::Live(result),
        PublishStatus::Mock => Generated::StandIn(result),
        PublishStatus::Error => {
            let reason = result.error.clone().unwrap_or_default();
            warn!(%reason, "Publish failed; run still completes");
            Generated::Fallback {
                value: result,
                reason,
            }
        }
    }
}
