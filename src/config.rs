//! Optional YAML configuration for the scraper and the generative-text client.
//!
//! Every field has a default, so the file (and any section in it) may be
//! omitted. Secrets stay out of the file: the API key comes from the CLI or
//! `GEMINI_API_KEY`.
//!
//! ```yaml
//! generation:
//!   model: gemini-1.5-flash
//!   timeout_secs: 60
//! scrape:
//!   timeout_secs: 10
//!   min_article_chars: 100
//! ```

use serde::Deserialize;
use std::error::Error;
use std::path::Path;
use tracing::{info, instrument};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub generation: GenerationConfig,
    pub scrape: ScrapeConfig,
}

/// Settings for the Gemini `generateContent` endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GenerationConfig {
    /// Base URL up to and excluding `/models/...`.
    pub endpoint: String,
    pub model: String,
    /// Per-request timeout. `None` leaves the request unbounded.
    pub timeout_secs: Option<u64>,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        GenerationConfig {
            endpoint: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            model: "gemini-1.5-flash".to_string(),
            timeout_secs: Some(60),
        }
    }
}

/// Settings for landing-page and article fetches.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScrapeConfig {
    pub user_agent: String,
    pub timeout_secs: u64,
    /// Extracted text shorter than this is treated as a failed fetch.
    pub min_article_chars: usize,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        ScrapeConfig {
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                         (KHTML, like Gecko) Chrome/124.0 Safari/537.36"
                .to_string(),
            timeout_secs: 10,
            min_article_chars: 100,
        }
    }
}

/// Load the config at `path`, or the defaults when no path is given.
#[instrument(level = "info")]
pub async fn load_config(path: Option<&Path>) -> Result<AppConfig, Box<dyn Error>> {
    let Some(path) = path else {
        return Ok(AppConfig::default());
    };
    let raw = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| format!("failed to read config file {}: {e}", path.display()))?;
    let config = parse_config(&raw)
        .map_err(|e| format!("failed to parse config file {}: {e}", path.display()))?;
    info!(path = %path.display(), model = %config.generation.model, "Loaded configuration");
    Ok(config)
}

fn parse_config(raw: &str) -> Result<AppConfig, serde_yaml::Error> {
    // An empty file deserializes to unit, not to an empty mapping.
    if raw.trim().is_empty() {
        return Ok(AppConfig::default());
    }
    serde_yaml::from_str(raw)
}
