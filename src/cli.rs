//! Command-line interface definitions for headline_studio.
//!
//! Every flag overrides the matching setting of the YAML config file. API keys
//! can also come from the environment.

use crate::config::AppConfig;
use crate::publisher::VideoUpdate;
use clap::Parser;
use std::path::PathBuf;

/// Turn trending news headlines into narrated videos.
///
/// # Examples
///
/// ```sh
/// # Defaults, everything offline
/// headline_studio --offline
///
/// # Own config, two keywords, publish when done
/// headline_studio -c config.yaml --keywords 삼성,쿠팡 --auto-publish
///
/// # Channel maintenance instead of a pipeline run
/// headline_studio --list-uploads 5
/// headline_studio --update-video dQw4w9WgXcQ --title "새 제목" --tags 뉴스,속보
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Optional path to config.yaml file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Directory for collected articles, artifacts and reports
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Comma-separated keywords to search for
    #[arg(short, long, value_delimiter = ',')]
    pub keywords: Option<Vec<String>>,

    /// Upload finished videos
    #[arg(long)]
    pub auto_publish: bool,

    /// Use the offline stand-ins for feeds, generation and synthesis
    #[arg(long)]
    pub offline: bool,

    /// API key for the text-generation service
    #[arg(long, env = "GENERATION_API_KEY", hide_env_values = true)]
    pub generation_api_key: Option<String>,

    /// API key for the voice-synthesis service
    #[arg(long, env = "SYNTHESIS_API_KEY", hide_env_values = true)]
    pub synthesis_api_key: Option<String>,

    /// Print the channel's most recent uploads (default 10) and exit
    #[arg(long, value_name = "N", num_args = 0..=1, default_missing_value = "10")]
    pub list_uploads: Option<usize>,

    /// Edit an uploaded video's details and exit
    #[arg(long, value_name = "VIDEO_ID")]
    pub update_video: Option<String>,

    /// New title for --update-video
    #[arg(long, requires = "update_video")]
    pub title: Option<String>,

    /// New description for --update-video
    #[arg(long, requires = "update_video")]
    pub description: Option<String>,

    /// New comma-separated tags for --update-video
    #[arg(long, requires = "update_video", value_delimiter = ',')]
    pub tags: Option<Vec<String>>,
}

impl Cli {
    /// Apply command-line overrides on top of the loaded config.
    pub fn apply(&self, config: &mut AppConfig) {
        if let Some(dir) = &self.output_dir {
            config.output_dir = dir.clone();
        }
        if let Some(keywords) = &self.keywords {
            config.keywords = keywords
                .iter()
                .map(|k| k.trim().to_string())
                .filter(|k| !k.is_empty())
                .collect();
        }
        if self.auto_publish {
            config.publishing.auto_publish = true;
        }
        if let Some(key) = &self.generation_api_key {
            config.generation.api_key = Some(key.clone());
        }
        if let Some(key) = &self.synthesis_api_key {
            config.synthesis.api_key = Some(key.clone());
        }
        if self.offline {
            config.force_offline();
        }
    }

    /// Replacement details collected from `--title`, `--description` and `--tags`.
    pub fn video_update(&self) -> VideoUpdate {
        VideoUpdate {
            title: self.title.clone(),
            description: self.description.clone(),
            tags: self.tags.clone(),
        }
    }
}
