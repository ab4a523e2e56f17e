//! Persisted set of article URLs that have already been processed.
//!
//! The ledger file is newline-delimited and append-only. Each URL is written
//! the moment its article is created, so an interrupted run leaves the file
//! consistent with the work that actually finished.

use std::collections::HashSet;
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, instrument, warn};

/// The set of processed article URLs, backed by an append-only file.
///
/// Loaded once at the start of a run and threaded through the pipeline by
/// mutable reference; [`Ledger::record`] writes through to disk before the
/// in-memory set is updated.
#[derive(Debug)]
pub struct Ledger {
    /// Location of the newline-delimited ledger file.
    path: PathBuf,
    /// Every URL read at load time or recorded since.
    seen: HashSet<String>,
    /// The file is non-empty and its last line has no terminating newline,
    /// so the next append must start a fresh line.
    needs_separator: bool,
}

impl Ledger {
    /// Read the ledger at `path`.
    ///
    /// # Arguments
    ///
    /// * `path` - The newline-delimited ledger file
    ///
    /// # Returns
    ///
    /// The loaded ledger. A missing file is a first run and yields an empty
    /// ledger; any other read error is returned.
    #[instrument(level = "info", skip_all, fields(path = %path.as_ref().display()))]
    pub async fn load(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let (seen, needs_separator) = match fs::read_to_string(&path).await {
            Ok(contents) => {
                let seen: HashSet<String> = contents
                    .lines()
                    .map(str::trim)
                    .filter(|l| !l.is_empty())
                    .map(String::from)
                    .collect();
                (seen, !contents.is_empty() && !contents.ends_with('\n'))
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                info!("No ledger yet; starting empty");
                (HashSet::new(), false)
            }
            Err(e) => return Err(e),
        };
        if needs_separator {
            warn!("Ledger does not end with a newline; next entry starts a new line");
        }
        info!(count = seen.len(), "Loaded processed URLs");
        Ok(Ledger {
            path,
            seen,
            needs_separator,
        })
    }

    /// Whether `id` has already been processed, in this run or an earlier one.
    pub fn contains(&self, id: &str) -> bool {
        self.seen.contains(id)
    }

    /// Append `id` to the ledger file and the in-memory set.
    ///
    /// The caller guarantees `id` is not yet present. If the file ended
    /// without a newline, a separator is written first so the previous entry
    /// is not glued onto this one.
    ///
    /// # Errors
    ///
    /// Returns the I/O error if the file cannot be opened or written; the
    /// in-memory set is left unchanged in that case.
    pub async fn record(&mut self, id: &str) -> io::Result<()> {
        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        let line = if self.needs_separator {
            format!("\n{id}\n")
        } else {
            format!("{id}\n")
        };
        file.write_all(line.as_bytes()).await?;
        file.flush().await?;
        self.needs_separator = false;
        self.seen.insert(id.to_string());
        debug!(%id, "Recorded processed URL");
        Ok(())
    }

    /// Number of distinct processed URLs.
    pub fn len(&self) -> usize {
        self.seen.len()
    }

    /// True on a first run, before anything has been recorded.
    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}
