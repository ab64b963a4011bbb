//! Persisted pipeline outputs.
//!
//! - [`json`]: ranked articles and the machine-readable run report
//! - [`markdown`]: a readable digest of the same report
//!
//! ```text
//! output_dir/
//! ├── collected_news.json
//! ├── workflow_results_20261019_070000.json
//! ├── workflow_results_20261019_070000.md
//! ├── audio/voice_20261019_070000_01.mp3
//! └── videos/video_20261019_070000_01.mp4
//! ```

pub mod json;
pub mod markdown;
