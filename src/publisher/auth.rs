//! Access token lookup.
//!
//! Authorization happens out of band: a separate OAuth flow stores the token
//! in `token_file`. `YOUTUBE_ACCESS_TOKEN` is consulted when the file is
//! missing or holds no usable token.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::path::Path;
use tracing::{debug, warn};

pub const TOKEN_ENV: &str = "YOUTUBE_ACCESS_TOKEN";

#[derive(Debug, Deserialize)]
struct StoredToken {
    access_token: String,
    #[serde(default)]
    expires_at: Option<DateTime<Utc>>,
}

pub async fn load_access_token(token_file: &Path) -> Option<String> {
    match tokio::fs::read_to_string(token_file).await {
        Ok(raw) => {
            if let Some(token) = usable_token(&raw, Utc::now()) {
                debug!(path = %token_file.display(), "Loaded access token");
                return Some(token);
            }
        }
        Err(e) => debug!(path = %token_file.display(), error = %e, "No token file"),
    }
    std::env::var(TOKEN_ENV).ok().filter(|t| !t.trim().is_empty())
}

/// The stored token, unless it is blank, expired or unreadable.
fn usable_token(raw: &str, now: DateTime<Utc>) -> Option<String> {
    let stored: StoredToken = match serde_json::from_str(raw) {
        Ok(stored) => stored,
        Err(e) => {
            warn!(error = %e, "Token file is not valid JSON");
            return None;
        }
    };
    if stored.access_token.trim().is_empty() {
        return None;
    }
    if stored.expires_at.is_some_and(|at| at <= now) {
        warn!(expires_at = ?stored.expires_at, "Stored access token has expired");
        return None;
    }
    Some(stored.access_token)
}
