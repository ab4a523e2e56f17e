//! JSON copy of the digest for programmatic consumers.
//!
//! Written only when `--json-output` is given. The document mirrors
//! [`Digest`]: a generation timestamp, per-site status reports in
//! `sites.txt` order, and every article of the run.
//!
//! ```json
//! {
//!   "generated_at": "2024-05-01T09:30:00Z",
//!   "sites": [{ "site": "https://example.com/", "status": "success" }],
//!   "articles": [{ "url": "...", "title": "...", "category": "News", ... }]
//! }
//! ```

use crate::models::Digest;
use std::error::Error;
use std::path::Path;
use tokio::fs;
use tracing::{error, info, instrument};

#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub async fn write_digest_json(digest: &Digest, path: &Path) -> Result<(), Box<dyn Error>> {
    let json = serde_json::to_string_pretty(digest)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        if let Err(e) = fs::create_dir_all(parent).await {
            error!(dir = %parent.display(), error = %e, "Failed to create JSON dir");
            return Err(e.into());
        }
    }

    fs::write(path, json).await?;
    info!(articles = digest.articles.len(), "Wrote JSON digest");
    Ok(())
}
