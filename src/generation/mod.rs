//! Script, thumbnail title and metadata generation.
//!
//! Every operation builds a Korean prompt from the article, sends it to the
//! configured [`RemoteBackend`] and parses the reply. Without a backend the
//! canned [`offline`] replies answer instead ([`Generated::StandIn`]). When the
//! backend fails, the canned reply is used as well but tagged
//! [`Generated::Fallback`] with the failure reason, unless strict mode turns
//! the failure into an error.

pub mod backends;
pub mod offline;
pub mod parse;
pub mod prompts;

use crate::config::GenerationConfig;
use crate::error::Result;
use crate::models::{Article, Generated, Script, ThumbnailTitleSet, VideoMetadata};
use backends::{RemoteBackend, TextBackend};
use chrono::Local;
use tracing::{info, instrument, warn};

pub const ESTIMATED_DURATION: &str = "8-10분";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PromptKind {
    Script,
    ThumbnailTitles,
    Metadata,
}

impl PromptKind {
    fn canned_reply(self) -> &'static str {
        match self {
            PromptKind::Script => offline::SCRIPT,
            PromptKind::ThumbnailTitles => offline::THUMBNAIL_TITLES,
            PromptKind::Metadata => offline::METADATA,
        }
    }
}

pub struct ContentGenerator {
    remote: Option<RemoteBackend>,
    strict: bool,
}

impl ContentGenerator {
    pub fn from_config(config: &GenerationConfig, strict: bool) -> Result<Self> {
        Ok(Self {
            remote: RemoteBackend::from_config(config)?,
            strict,
        })
    }

    pub fn backend_name(&self) -> &'static str {
        self.remote.as_ref().map_or("offline", |r| r.name())
    }

    async fn ask(&self, kind: PromptKind, prompt: &str) -> Result<Generated<String>> {
        let Some(remote) = &self.remote else {
            return Ok(Generated::StandIn(kind.canned_reply().to_string()));
        };
        match remote.complete(prompt).await {
            Ok(text) => Ok(Generated::Live(text)),
            Err(e) if self.strict => Err(e),
            Err(e) => {
                warn!(backend = remote.name(), ?kind, error = %e, "Generation failed; using offline stand-in");
                Ok(Generated::Fallback {
                    value: kind.canned_reply().to_string(),
                    reason: e.to_string(),
                })
            }
        }
    }

    /// Narration script for one article; the reply is used verbatim.
    #[instrument(level = "info", skip_all, fields(title = %article.title))]
    pub async fn generate_script(&self, article: &Article) -> Result<Generated<Script>> {
        let reply = self
            .ask(PromptKind::Script, &prompts::script_prompt(article))
            .await?;
        let script = reply.map(|narration| Script {
            article_title: article.title.clone(),
            narration,
            estimated_duration: ESTIMATED_DURATION.to_string(),
            generated_at: Local::now(),
        });
        info!(chars = script.value().narration.chars().count(), provenance = ?script.provenance(), "Generated script");
        Ok(script)
    }

    /// Up to `count` short thumbnail hooks.
    #[instrument(level = "info", skip_all, fields(title = %article.title, count = count))]
    pub async fn generate_thumbnail_titles(
        &self,
        article: &Article,
        count: usize,
    ) -> Result<Generated<ThumbnailTitleSet>> {
        let reply = self
            .ask(
                PromptKind::ThumbnailTitles,
                &prompts::thumbnail_prompt(article, count),
            )
            .await?;
        let titles = reply.map(|text| parse::parse_thumbnail_titles(&text, count));
        info!(parsed = titles.value().len(), "Generated thumbnail titles");
        Ok(titles)
    }

    /// Video title, description and tags derived from the article and script.
    #[instrument(level = "info", skip_all, fields(title = %article.title))]
    pub async fn generate_metadata(
        &self,
        article: &Article,
        script: &Script,
    ) -> Result<Generated<VideoMetadata>> {
        let reply = self
            .ask(
                PromptKind::Metadata,
                &prompts::metadata_prompt(article, &script.narration),
            )
            .await?;
        Ok(reply.map(|text| parse::parse_metadata(&text)))
    }
}
