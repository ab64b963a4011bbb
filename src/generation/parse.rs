//! Parsers for the line-oriented replies of the thumbnail and metadata prompts.

use crate::models::{ThumbnailTitleSet, VideoMetadata};
use once_cell::sync::Lazy;
use regex::Regex;

/// A numbered line: `1. title`, `2) title`, `3 - title`, `4 title`.
static NUMBERED_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\d{1,3}(?:\s*[.)\]:\-]+\s*|\s+)(?P<title>\S.*)$").unwrap()
});

const QUOTES: &[char] = &['"', '\'', '“', '”', '‘', '’', '*'];

/// Keep numbered lines, strip the numbering, stop after `count` titles.
pub fn parse_thumbnail_titles(text: &str, count: usize) -> ThumbnailTitleSet {
    ThumbnailTitleSet(
        text.lines()
            .filter_map(|line| {
                let caps = NUMBERED_LINE.captures(line.trim())?;
                let title = caps["title"].trim().trim_matches(QUOTES).trim();
                (!title.is_empty()).then(|| title.to_string())
            })
            .take(count)
            .collect(),
    )
}

/// Pick out the `VIDEO_TITLE:`, `DESCRIPTION:` and `TAGS:` lines.
///
/// Missing markers leave the field `None`; this never fails.
pub fn parse_metadata(text: &str) -> VideoMetadata {
    let mut metadata = VideoMetadata::default();
    for line in text.lines().map(str::trim) {
        if let Some(rest) = line.strip_prefix("VIDEO_TITLE:") {
            metadata.title = Some(rest.trim().to_string());
        } else if let Some(rest) = line.strip_prefix("DESCRIPTION:") {
            metadata.description = Some(rest.trim().to_string());
        } else if let Some(rest) = line.strip_prefix("TAGS:") {
            metadata.tags = Some(
                rest.split(',')
                    .map(str::trim)
                    .filter(|t| !t.is_empty())
                    .map(str::to_string)
                    .collect(),
            );
        }
    }
    metadata
}
