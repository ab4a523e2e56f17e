//! Command-line interface definitions.
//!
//! Every option has a default (or an environment fallback), so running the
//! binary with no arguments scrapes `sites.txt`, updates
//! `processed_urls.txt` and writes `index.html` in the working directory.

use clap::Parser;
use std::path::PathBuf;

/// Command-line arguments.
///
/// # Examples
///
/// ```sh
/// # Defaults, key from the environment
/// GEMINI_API_KEY=... news_digest
///
/// # Custom paths plus a JSON copy
/// news_digest --sites feeds.txt --output public/index.html --json-output public/digest.json
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Newline-delimited list of sites to scrape
    #[arg(short, long, default_value = "sites.txt")]
    pub sites: PathBuf,

    /// Ledger of already processed article URLs
    #[arg(short, long, default_value = "processed_urls.txt")]
    pub ledger: PathBuf,

    /// Where to write the HTML digest
    #[arg(short, long, default_value = "index.html")]
    pub output: PathBuf,

    /// Also write the digest as JSON to this path
    #[arg(short, long)]
    pub json_output: Option<PathBuf>,

    /// Optional path to a config.yaml file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Gemini API key
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,
}
