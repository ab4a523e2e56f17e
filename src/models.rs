//! Data models shared by the pipeline and the output writers.
//!
//! - [`Site`]: a configured landing page to scrape
//! - [`CandidateLink`]: an anchor that survived the article-shape filter
//! - [`Article`]: a classified and summarized article, alive for one run
//! - [`SiteStatus`] / [`SiteReport`]: per-site outcome used by the renderer
//! - [`Digest`]: everything the renderer needs

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

/// A configured root URL. Identity is the URL string itself.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Site(String);

impl Site {
    /// Wrap a root URL as read from the site list.
    pub fn new(url: impl Into<String>) -> Self {
        Site(url.into())
    }

    /// The URL exactly as configured; used for fetching and as identity.
    pub fn url(&self) -> &str {
        &self.0
    }

    /// Cosmetic name for tab labels: scheme and `www.` removed, outer
    /// slashes trimmed. `https://www.bbc.com/news/` becomes `bbc.com/news`.
    pub fn display_name(&self) -> String {
        let s = self.0.as_str();
        let s = s
            .strip_prefix("https://")
            .or_else(|| s.strip_prefix("http://"))
            .unwrap_or(s);
        let s = s.strip_prefix("www.").unwrap_or(s);
        s.trim_matches('/').to_string()
    }
}

impl fmt::Display for Site {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An `<a>` element whose href looks like an article and whose text can
/// serve as a display title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateLink {
    pub href: String,
    pub text: String,
}

/// A processed article. Exists only in memory for the current run.
#[derive(Debug, Clone, Serialize)]
pub struct Article {
    pub url: String,
    pub title: String,
    pub summary: String,
    /// Label returned by the classifier, trimmed but not validated against
    /// [`CATEGORIES`](crate::api::CATEGORIES).
    pub category: String,
    pub site: Site,
}

/// Outcome of scraping one site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "message", rename_all = "snake_case")]
pub enum SiteStatus {
    Success,
    NoArticles,
    NetworkError(String),
    ProcessingError(String),
}

impl SiteStatus {
    /// Whether the site should render as an error panel.
    pub fn is_error(&self) -> bool {
        matches!(
            self,
            SiteStatus::NetworkError(_) | SiteStatus::ProcessingError(_)
        )
    }
}

/// A site paired with what happened when it was scraped.
#[derive(Debug, Clone, Serialize)]
pub struct SiteReport {
    pub site: Site,
    #[serde(flatten)]
    pub status: SiteStatus,
}

/// The renderer input: ordered site reports plus every article of the run.
#[derive(Debug, Clone, Serialize)]
pub struct Digest {
    pub generated_at: DateTime<Utc>,
    pub sites: Vec<SiteReport>,
    pub articles: Vec<Article>,
}

impl Digest {
    /// Articles scraped from `site`, in discovery order.
    pub fn articles_for<'a>(&'a self, site: &'a Site) -> impl Iterator<Item = &'a Article> + 'a {
        self.articles.iter().filter(move |a| &a.site == site)
    }
}
