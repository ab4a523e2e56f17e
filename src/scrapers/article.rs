//! Main-text extraction for a single article page.

use super::fetch_page;
use crate::error::ScrapeError;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, instrument};

static CONTENT_CLASS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)article|content|body|post").expect("content class regex"));

/// Fetch `url` and return its article text.
///
/// Fails on network and HTTP errors, and with [`ScrapeError::TooShort`] when
/// the extracted text has fewer than `min_chars` characters.
#[instrument(level = "info", skip(client))]
pub async fn fetch_article_text(
    client: &Client,
    url: &str,
    min_chars: usize,
) -> Result<String, ScrapeError> {
    let html = fetch_page(client, url).await?;
    let text = extract_text(&html);
    let chars = text.chars().count();
    if chars < min_chars {
        return Err(ScrapeError::TooShort { chars });
    }
    debug!(chars, "Extracted article text");
    Ok(text)
}

/// Paragraph text of the page's content container, or of every paragraph
/// on the page when no container is found. Paragraphs are trimmed, empties
/// dropped, and the rest joined with single spaces.
pub fn extract_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let p_selector = Selector::parse("p").unwrap();

    let paragraphs: Vec<String> = match content_container(&document) {
        Some(container) => container.select(&p_selector).map(paragraph_text).collect(),
        None => document.select(&p_selector).map(paragraph_text).collect(),
    };

    paragraphs
        .into_iter()
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// First structural element whose class marks it as the article body.
fn content_container(document: &Html) -> Option<ElementRef<'_>> {
    let structural = Selector::parse("div[class], article[class], section[class], main[class]").unwrap();
    document.select(&structural).find(|el| {
        el.value()
            .attr("class")
            .is_some_and(|class| CONTENT_CLASS.is_match(class))
    })
}

fn paragraph_text(p: ElementRef<'_>) -> String {
    p.text().collect::<String>().trim().to_string()
}
