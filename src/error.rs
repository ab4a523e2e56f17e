//! Error types for scraping and text generation.
//!
//! Each failure is caught at the narrowest scope that can degrade gracefully:
//! a [`ScrapeError`] on an article skips that article, a [`ScrapeError`] on a
//! landing page becomes a [`SiteStatus`](crate::models::SiteStatus), and a
//! [`GenerationError`] is replaced by a placeholder string.

use thiserror::Error;

/// Failure while fetching or extracting a page.
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("network error: {0}")]
    Network(String),

    #[error("HTTP {status} from {url}")]
    Http { status: u16, url: String },

    #[error("failed to read response body: {0}")]
    Body(String),

    #[error("invalid URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("article text too short ({chars} chars)")]
    TooShort { chars: usize },

    #[error("ledger write failed: {0}")]
    Ledger(#[from] std::io::Error),
}

impl ScrapeError {
    /// Whether this error belongs to the network side of the taxonomy
    /// (transport failure or an error status from the server).
    pub fn is_network(&self) -> bool {
        matches!(self, ScrapeError::Network(_) | ScrapeError::Http { .. })
    }
}

impl From<reqwest::Error> for ScrapeError {
    fn from(err: reqwest::Error) -> Self {
        ScrapeError::Network(err.to_string())
    }
}

/// Failure of a single generative-text request.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("no API key configured (set GEMINI_API_KEY)")]
    MissingApiKey,

    #[error("network error: {0}")]
    Network(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("response contained no text")]
    EmptyResponse,
}

impl From<reqwest::Error> for GenerationError {
    fn from(err: reqwest::Error) -> Self {
        GenerationError::Network(err.to_string())
    }
}
