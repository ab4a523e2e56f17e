//! Generative-text API interaction: article classification and summaries.
//!
//! # Architecture
//!
//! - [`TextGenerator`]: core trait, one prompt in, trimmed text out
//! - [`GeminiClient`]: implementation over the Gemini `generateContent`
//!   REST endpoint
//! - [`classify`] / [`summarize`]: the two prompts sent per article
//!
//! Both prompt helpers are best-effort: any [`GenerationError`] is logged
//! and replaced by [`PLACEHOLDER`], so one failing call never drops an
//! article or aborts the run. There is no retry.

use crate::config::GenerationConfig;
use crate::error::GenerationError;
use crate::utils::{truncate_chars, truncate_for_log};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{Duration, Instant};
use tracing::{debug, instrument, warn};

/// Labels offered to the classifier.
pub const CATEGORIES: &[&str] = &[
    "News",
    "Sport",
    "Culture",
    "Technology",
    "Business",
    "Lifestyle",
    "Opinion",
    "Other",
];

/// Stand-in text for a failed generation call.
pub const PLACEHOLDER: &str = "Error generating content.";

/// Characters of article text sent with the classification prompt.
pub const CLASSIFY_INPUT_CHARS: usize = 2000;

/// Upper bound on summary length requested from the model.
pub const SUMMARY_MAX_WORDS: usize = 200;

/// Trait for text generation backends.
///
/// Implementors return the model's reply already trimmed of surrounding
/// whitespace.
pub trait TextGenerator {
    /// Send `prompt` to the model.
    ///
    /// # Returns
    ///
    /// The reply text, trimmed, or the [`GenerationError`] that stopped the
    /// request.
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError>;
}

/// Client for Gemini's `models/{model}:generateContent` endpoint.
pub struct GeminiClient {
    http: Client,
    endpoint: String,
    model: String,
    api_key: Option<String>,
}

impl fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiClient")
            .field("endpoint", &self.endpoint)
            .field("model", &self.model)
            .field("api_key", &self.api_key.as_deref().map(|_| "<redacted>"))
            .finish()
    }
}

impl GeminiClient {
    /// Build a client.
    ///
    /// # Arguments
    ///
    /// * `config` - Endpoint, model and request timeout
    /// * `api_key` - Gemini key; `None` is accepted and makes every call fail
    ///   with [`GenerationError::MissingApiKey`]
    ///
    /// # Returns
    ///
    /// The client, or the error from building the underlying HTTP client.
    pub fn new(config: &GenerationConfig, api_key: Option<String>) -> Result<Self, reqwest::Error> {
        let mut builder = Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        Ok(GeminiClient {
            http: builder.build()?,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key,
        })
    }

    /// Whether requests can be sent at all; checked once at startup to warn
    /// that every category and summary will be the placeholder.
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

impl GenerateResponse {
    /// Concatenated text parts of the first candidate.
    fn into_text(self) -> Option<String> {
        let content = self.candidates.into_iter().next()?.content?;
        let text: String = content.parts.into_iter().filter_map(|p| p.text).collect();
        Some(text)
    }
}

impl TextGenerator for GeminiClient {
    #[instrument(level = "info", skip_all, fields(model = %self.model))]
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        let api_key = self.api_key.as_deref().ok_or(GenerationError::MissingApiKey)?;
        let url = format!("{}/models/{}:generateContent", self.endpoint, self.model);
        let body = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
        };

        let t0 = Instant::now();
        let resp = self
            .http
            .post(&url)
            .header("x-goog-api-key", api_key)
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(GenerationError::Api {
                status: status.as_u16(),
                message: truncate_for_log(&message, 300),
            });
        }

        let parsed: GenerateResponse = resp.json().await?;
        let text = parsed
            .into_text()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .ok_or(GenerationError::EmptyResponse)?;

        debug!(
            elapsed_ms = t0.elapsed().as_millis() as u64,
            response_preview = %truncate_for_log(&text, 120),
            "Generation succeeded"
        );
        Ok(text)
    }
}

/// Prompt asking for exactly one label from [`CATEGORIES`].
pub fn classification_prompt(text: &str) -> String {
    format!(
        "Analyze the following article and classify it into one of these categories: {}. \
         Respond with only the single category name.\n\n{}",
        CATEGORIES.join(", "),
        truncate_chars(text, CLASSIFY_INPUT_CHARS)
    )
}

/// Prompt asking for a summary of at most [`SUMMARY_MAX_WORDS`] words.
pub fn summary_prompt(title: &str, text: &str) -> String {
    format!(
        "Summarize the following article titled \"{title}\" in no more than \
         {SUMMARY_MAX_WORDS} words.\n\n{text}"
    )
}

/// Category label for `text`. The reply is trimmed but deliberately not
/// checked against [`CATEGORIES`]; an unexpected label becomes its own
/// section in the digest.
pub async fn classify<G: TextGenerator>(generator: &G, text: &str) -> String {
    match generator.generate(&classification_prompt(text)).await {
        Ok(label) => label.trim().to_string(),
        Err(e) => {
            warn!(error = %e, "Classification failed; using placeholder");
            PLACEHOLDER.to_string()
        }
    }
}

/// Summary of `text`, trimmed but not length-checked.
pub async fn summarize<G: TextGenerator>(generator: &G, title: &str, text: &str) -> String {
    match generator.generate(&summary_prompt(title, text)).await {
        Ok(summary) => summary.trim().to_string(),
        Err(e) => {
            warn!(error = %e, "Summarization failed; using placeholder");
            PLACEHOLDER.to_string()
        }
    }
}
