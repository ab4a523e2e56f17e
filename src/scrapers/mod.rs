//! Fetching and parsing of news pages.
//!
//! Scraping is two-phase, per site:
//!
//! 1. **Link extraction** ([`links`]): parse the landing page and keep the
//!    anchors that look like articles
//! 2. **Article fetching** ([`article`]): download each new article and pull
//!    its paragraph text
//!
//! Both phases share one [`reqwest::Client`] built by [`build_client`], which
//! sends a browser-like `User-Agent` and enforces the fetch timeout.

pub mod article;
pub mod links;

use crate::config::ScrapeConfig;
use crate::error::ScrapeError;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, instrument};

/// Build the HTTP client used for landing pages and articles.
pub fn build_client(config: &ScrapeConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.clone())
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()
}

/// GET `url` and return the body, failing on transport errors and on any
/// non-success status.
#[instrument(level = "debug", skip(client))]
pub async fn fetch_page(client: &Client, url: &str) -> Result<String, ScrapeError> {
    let resp = client.get(url).send().await?;
    let status = resp.status();
    if !status.is_success() {
        return Err(ScrapeError::Http {
            status: status.as_u16(),
            url: url.to_string(),
        });
    }
    let body = resp
        .text()
        .await
        .map_err(|e| ScrapeError::Body(e.to_string()))?;
    debug!(bytes = body.len(), "Fetched page");
    Ok(body)
}
