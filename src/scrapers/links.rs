//! Candidate article links from a landing page.
//!
//! Landing pages link to far more than articles: tag pages, author bios,
//! image galleries, in-page anchors. An href is kept only if it passes every
//! rule in [`is_article_href`], and the anchor is kept only if its visible
//! text can serve as a title.

use crate::models::CandidateLink;
use crate::utils::collapse_whitespace;
use itertools::Itertools;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};
use tracing::debug;

const BINARY_EXTENSIONS: &[&str] = &[".pdf", ".jpg", ".png", ".gif"];

const NAVIGATION_MARKERS: &[&str] = &["/tag/", "/category/", "/author/", "#", "?"];

const SECTION_PREFIXES: &[&str] = &["/news/", "/article/", "/sport/"];

static DATE_SEGMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"/\d{4}/\d{2}/\d{2}/").expect("date segment regex"));

/// Whether `href` looks like a link to an individual article.
pub fn is_article_href(href: &str) -> bool {
    if !href.starts_with("http") {
        return false;
    }
    let lower = href.to_ascii_lowercase();
    if BINARY_EXTENSIONS.iter().any(|ext| lower.contains(ext)) {
        return false;
    }
    if NAVIGATION_MARKERS.iter().any(|m| href.contains(m)) {
        return false;
    }
    DATE_SEGMENT.is_match(href) || SECTION_PREFIXES.iter().any(|p| href.contains(p))
}

/// Extract candidate article links from landing-page markup, in document
/// order. Repeated hrefs keep their first occurrence.
pub fn extract_candidates(html: &str) -> Vec<CandidateLink> {
    let document = Html::parse_document(html);
    let anchor_selector = Selector::parse("a[href]").unwrap();

    let candidates: Vec<CandidateLink> = document
        .select(&anchor_selector)
        .filter_map(|a| {
            let href = a.value().attr("href")?.trim();
            if !is_article_href(href) {
                return None;
            }
            let text = collapse_whitespace(&a.text().collect::<String>());
            if text.is_empty() {
                debug!(%href, "Skipping link without visible text");
                return None;
            }
            Some(CandidateLink {
                href: href.to_string(),
                text,
            })
        })
        .unique_by(|c| c.href.clone())
        .collect();

    debug!(count = candidates.len(), "Extracted candidate links");
    candidates
}
