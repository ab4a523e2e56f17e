//! # News Digest
//!
//! Scrapes a list of news sites, summarizes every article not seen on a
//! previous run through a generative-text API, and renders the results as a
//! static tabbed HTML page.
//!
//! ## Usage
//!
//! ```sh
//! GEMINI_API_KEY=... news_digest
//! ```
//!
//! ## Architecture
//!
//! The run is a single sequential pass:
//! 1. **Indexing**: fetch each site's landing page and extract article links
//! 2. **Dedupe**: drop links already present in the ledger
//! 3. **Fetching**: download each new article and extract its text
//! 4. **Processing**: classify and summarize, then record the URL
//! 5. **Output**: write `index.html` (and optionally a JSON copy)

use clap::Parser;
use std::error::Error;
use tracing::{debug, error, info, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod api;
mod cli;
mod config;
mod error;
mod ledger;
mod models;
mod outputs;
mod pipeline;
mod scrapers;
mod utils;

use api::GeminiClient;
use cli::Cli;
use ledger::Ledger;
use outputs::{html, json};
use pipeline::{Pipeline, read_sites};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("news_digest starting up");

    let args = Cli::parse();
    debug!(sites = %args.sites.display(), ledger = %args.ledger.display(), output = %args.output.display(), "Parsed CLI arguments");

    let config = config::load_config(args.config.as_deref()).await?;

    // An unreadable site list is the one input problem that ends the run.
    let sites = read_sites(&args.sites).await.map_err(|e| {
        error!(path = %args.sites.display(), error = %e, "Failed to read site list");
        e
    })?;
    info!(count = sites.len(), "Loaded sites");

    // A missing ledger is a first run; any other read error is fatal.
    let mut ledger = Ledger::load(&args.ledger).await?;
    if ledger.is_empty() {
        info!(path = %args.ledger.display(), "Ledger is empty; every candidate will be processed");
    }

    let http = scrapers::build_client(&config.scrape)?;
    let generator = GeminiClient::new(&config.generation, args.api_key.clone())?;
    if !generator.has_api_key() {
        warn!("GEMINI_API_KEY is not set; categories and summaries will be placeholders");
    }

    let digest = Pipeline::new(
        &http,
        &generator,
        &mut ledger,
        config.scrape.min_article_chars,
    )
    .run(&sites)
    .await;

    html::write_digest(&digest, &args.output).await?;

    if let Some(ref path) = args.json_output {
        if let Err(e) = json::write_digest_json(&digest, path).await {
            error!(path = %path.display(), error = %e, "Failed to write JSON digest");
        }
    }

    let failed_sites = digest.sites.iter().filter(|r| r.status.is_error()).count();
    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        articles = digest.articles.len(),
        failed_sites,
        "Execution complete"
    );

    Ok(())
}
