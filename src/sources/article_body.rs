//! Best-effort article body extraction.
//!
//! Korean news sites disagree on markup, so a handful of known containers is
//! tried in order before falling back to every `<p>` on the page.

use crate::error::Result;
use crate::http::ensure_success;
use crate::utils::{squash_whitespace, truncate_chars};
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, instrument};

const BODY_SELECTORS: &[&str] = &[
    "#articleBodyContents",
    "#dic_area",
    ".article_body",
    ".news_end",
    "article",
];

const HIDDEN_TAGS: &[&str] = &["script", "style", "iframe", "noscript"];

/// Scraped bodies are only context for the script prompt.
pub const MAX_BODY_CHARS: usize = 2000;

/// Download `url` and extract its body text.
#[instrument(level = "debug", skip(client), fields(%url))]
pub async fn scrape_article_content(client: &Client, url: &str) -> Result<Option<String>> {
    let response = ensure_success("article", client.get(url).send().await?).await?;
    let html = response.text().await?;
    let body = extract_body_text(&html);
    debug!(chars = body.as_ref().map_or(0, |b| b.chars().count()), "Extracted article body");
    Ok(body)
}

pub fn extract_body_text(html: &str) -> Option<String> {
    let document = Html::parse_document(html);

    for raw in BODY_SELECTORS {
        let Ok(selector) = Selector::parse(raw) else {
            continue;
        };
        if let Some(element) = document.select(&selector).next() {
            let text = squash_whitespace(&visible_text(element));
            if !text.is_empty() {
                return Some(truncate_chars(&text, MAX_BODY_CHARS));
            }
        }
    }

    let paragraphs = Selector::parse("p").ok()?;
    let text = squash_whitespace(
        &document
            .select(&paragraphs)
            .map(visible_text)
            .collect::<Vec<_>>()
            .join(" "),
    );
    (!text.is_empty()).then(|| truncate_chars(&text, MAX_BODY_CHARS))
}

fn visible_text(element: ElementRef) -> String {
    element
        .descendants()
        .filter_map(|node| {
            let text = node.value().as_text()?;
            let hidden = node.ancestors().any(|ancestor| {
                ancestor
                    .value()
                    .as_element()
                    .is_some_and(|e| HIDDEN_TAGS.contains(&e.name()))
            });
            (!hidden).then(|| text.to_string())
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefers_known_container() {
        let html = r#"<html><body>
            <p>메뉴</p>
            <div id="articleBodyContents">
              <script>var tracking = 1;</script>
              현대차가 새 전기차를 공개했다.
              <style>.x { color: red }</style>
              <span>판매는 내년부터.</span>
            </div>
        </body></html>"#;
        let body = extract_body_text(html).unwrap();
        assert_eq!(body, "현대차가 새 전기차를 공개했다. 판매는 내년부터.");
    }

    #[test]
    fn test_falls_back_to_paragraphs() {
        let html = "<html><body><p>첫 문단.</p><div>광고</div><p>둘째 문단.</p></body></html>";
        assert_eq!(extract_body_text(html).unwrap(), "첫 문단. 둘째 문단.");
    }

    #[test]
    fn test_empty_page_has_no_body() {
        assert!(extract_body_text("<html><body><div></div></body></html>").is_none());
    }

    #[test]
    fn test_body_is_truncated() {
        let html = format!("<article>{}</article>", "가".repeat(MAX_BODY_CHARS + 50));
        let body = extract_body_text(&html).unwrap();
        assert_eq!(body.chars().count(), MAX_BODY_CHARS);
    }
}
