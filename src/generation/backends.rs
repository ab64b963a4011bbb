//! Remote text-generation backends.
//!
//! Each backend turns a single user prompt into the model's reply text. The
//! three wire formats differ only in envelope, so they share
//! [`RemoteSettings`] and are dispatched through [`RemoteBackend`].

use crate::config::{GenerationConfig, TextService};
use crate::error::{Error, Result};
use crate::http::{self, ensure_success};
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, instrument, warn};

/// Trait for a service that completes a prompt.
pub trait TextBackend {
    fn name(&self) -> &'static str;

    async fn complete(&self, prompt: &str) -> Result<String>;
}

#[derive(Debug, Clone)]
pub struct RemoteSettings {
    pub base_url: String,
    pub api_key: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl RemoteSettings {
    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path)
    }
}

fn malformed(backend: &str, what: &str) -> Error {
    Error::MalformedResponse {
        backend: backend.to_string(),
        what: what.to_string(),
    }
}

// ---------- OpenAI ----------

pub struct OpenAi {
    client: Client,
    settings: RemoteSettings,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Deserialize)]
struct ChatMessage {
    content: Option<String>,
}

impl TextBackend for OpenAi {
    fn name(&self) -> &'static str {
        "openai"
    }

    async fn complete(&self, prompt: &str) -> Result<String> {
        let body = json!({
            "model": self.settings.model,
            "messages": [{ "role": "user", "content": prompt }],
            "temperature": self.settings.temperature,
            "max_tokens": self.settings.max_tokens,
        });
        let response = self
            .client
            .post(self.settings.endpoint("chat/completions"))
            .bearer_auth(&self.settings.api_key)
            .json(&body)
            .send()
            .await?;
        let parsed: ChatResponse = ensure_success(self.name(), response).await?.json().await?;
        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| malformed(self.name(), "choices[0].message.content"))
    }
}

// ---------- Gemini ----------

pub struct Gemini {
    client: Client,
    settings: RemoteSettings,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Deserialize)]
struct Part {
    text: Option<String>,
}

impl TextBackend for Gemini {
    fn name(&self) -> &'static str {
        "gemini"
    }

    async fn complete(&self, prompt: &str) -> Result<String> {
        let body = json!({
            "contents": [{ "parts": [{ "text": prompt }] }],
            "generationConfig": {
                "temperature": self.settings.temperature,
                "maxOutputTokens": self.settings.max_tokens,
            },
        });
        let url = self
            .settings
            .endpoint(&format!("models/{}:generateContent", self.settings.model));
        let response = self
            .client
            .post(url)
            .query(&[("key", self.settings.api_key.as_str())])
            .json(&body)
            .send()
            .await?;
        let parsed: GenerateContentResponse =
            ensure_success(self.name(), response).await?.json().await?;
        parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content.parts.into_iter().next())
            .and_then(|p| p.text)
            .ok_or_else(|| malformed(self.name(), "candidates[0].content.parts[0].text"))
    }
}

// ---------- Anthropic ----------

pub struct Anthropic {
    client: Client,
    settings: RemoteSettings,
}

#[derive(Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    text: Option<String>,
}

impl TextBackend for Anthropic {
    fn name(&self) -> &'static str {
        "anthropic"
    }

    async fn complete(&self, prompt: &str) -> Result<String> {
        let body = json!({
            "model": self.settings.model,
            "max_tokens": self.settings.max_tokens,
            "messages": [{ "role": "user", "content": prompt }],
        });
        let response = self
            .client
            .post(self.settings.endpoint("messages"))
            .header("x-api-key", &self.settings.api_key)
            .header("anthropic-version", "2023-06-01")
            .json(&body)
            .send()
            .await?;
        let parsed: MessagesResponse = ensure_success(self.name(), response).await?.json().await?;
        parsed
            .content
            .into_iter()
            .next()
            .and_then(|b| b.text)
            .ok_or_else(|| malformed(self.name(), "content[0].text"))
    }
}

/// The configured backend, chosen once at startup.
pub enum RemoteBackend {
    OpenAi(OpenAi),
    Gemini(Gemini),
    Anthropic(Anthropic),
}

impl RemoteBackend {
    /// Build the configured backend.
    ///
    /// Returns `None` for the offline service and for a remote service with no
    /// API key; both route every prompt to the stand-in.
    pub fn from_config(config: &GenerationConfig) -> Result<Option<Self>> {
        let (default_base, default_model) = match config.service {
            TextService::OpenAi => ("https://api.openai.com/v1", "gpt-4o"),
            TextService::Gemini => (
                "https://generativelanguage.googleapis.com/v1beta",
                "gemini-pro",
            ),
            TextService::Anthropic => ("https://api.anthropic.com/v1", "claude-3-5-sonnet-20241022"),
            TextService::Offline => return Ok(None),
        };
        let Some(api_key) = config.api_key.clone().filter(|k| !k.trim().is_empty()) else {
            warn!(service = ?config.service, "No generation API key; using offline stand-in");
            return Ok(None);
        };

        let settings = RemoteSettings {
            base_url: config
                .base_url
                .clone()
                .unwrap_or_else(|| default_base.to_string()),
            api_key,
            model: config
                .model
                .clone()
                .unwrap_or_else(|| default_model.to_string()),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        };
        let client = http::client(config.timeout_secs)?;
        debug!(service = ?config.service, model = %settings.model, "Configured generation backend");

        Ok(Some(match config.service {
            TextService::OpenAi => RemoteBackend::OpenAi(OpenAi { client, settings }),
            TextService::Gemini => RemoteBackend::Gemini(Gemini { client, settings }),
            TextService::Anthropic => RemoteBackend::Anthropic(Anthropic { client, settings }),
            TextService::Offline => return Ok(None),
        }))
    }
}

impl TextBackend for RemoteBackend {
    fn name(&self) -> &'static str {
        match self {
            RemoteBackend::OpenAi(b) => b.name(),
            RemoteBackend::Gemini(b) => b.name(),
            RemoteBackend::Anthropic(b) => b.name(),
        }
    }

    #[instrument(level = "info", skip_all, fields(backend = self.name(), prompt_chars = prompt.chars().count()))]
    async fn complete(&self, prompt: &str) -> Result<String> {
        match self {
            RemoteBackend::OpenAi(b) => b.complete(prompt).await,
            RemoteBackend::Gemini(b) => b.complete(prompt).await,
            RemoteBackend::Anthropic(b) => b.complete(prompt).await,
        }
    }
}
