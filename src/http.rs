//! Shared HTTP plumbing for the backend clients.

use crate::error::{Error, Result};
use crate::utils::truncate_for_log;
use reqwest::{Client, ClientBuilder, Response};
use std::time::Duration;

const USER_AGENT: &str = concat!("headline_studio/", env!("CARGO_PKG_VERSION"));

/// Builder with the crate's user agent and a per-request timeout.
pub fn builder(timeout_secs: u64) -> ClientBuilder {
    Client::builder()
        .user_agent(USER_AGENT)
        .timeout(Duration::from_secs(timeout_secs))
}

/// Build a client whose every request is bounded by `timeout_secs`.
pub fn client(timeout_secs: u64) -> Result<Client> {
    Ok(builder(timeout_secs).build()?)
}

/// Pass 2xx responses through; turn anything else into [`Error::BackendStatus`].
pub async fn ensure_success(backend: &str, response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(Error::BackendStatus {
        backend: backend.to_string(),
        status: status.as_u16(),
        body: truncate_for_log(&body, 300),
    })
}
