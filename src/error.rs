//! Crate-wide error type.
//!
//! Degradable stages (feeds, text generation, voice synthesis) usually turn
//! these errors into stand-in output before they reach the orchestrator; the
//! orchestrator records whatever does reach it on the failed run.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{backend} returned HTTP {status}: {body}")]
    BackendStatus {
        backend: String,
        status: u16,
        body: String,
    },

    #[error("{backend} response is missing {what}")]
    MalformedResponse { backend: String, what: String },

    #[error("Feed parse error: {0}")]
    Feed(#[from] quick_xml::DeError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config file error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("scheduled publishing requires privacy status \"private\", got \"{0}\"")]
    ScheduleRequiresPrivate(String),

    #[error("Upload error: {0}")]
    Upload(String),
}

pub type Result<T> = std::result::Result<T, Error>;
