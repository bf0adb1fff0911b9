//! Result aggregation and session export.
//!
//! Reduces the batch's outcome records to totals and persists the run's
//! link list under a title-derived key: a JSON file merged across runs and
//! a plain text file for the current run. The exporter runs after the
//! full-barrier wait, so it is the only writer of the session files.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::download::DownloadOutcome;

/// Export key used when a title sanitizes to nothing (or is absent).
const UNTITLED_KEY: &str = "untitled";

/// Errors while persisting the session export.
#[derive(Debug, Error)]
pub enum ExportError {
    /// An export file could not be written.
    #[error("failed to write export file {path}: {source}")]
    Io {
        /// The file that could not be written.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The merged export could not be encoded as JSON.
    #[error("failed to encode session export: {source}")]
    Encode {
        /// The underlying serialization error.
        #[source]
        source: serde_json::Error,
    },
}

impl ExportError {
    fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Run-spanning record of discovered links for one page title.
///
/// `image_links` is append-only across runs. `all_links` is kept for format
/// compatibility; nothing writes to it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionExport {
    /// Every image link recorded for this title, across runs, in order.
    pub image_links: Vec<String>,
    /// Reserved; always empty.
    pub all_links: Vec<String>,
}

/// Totals and artifact paths for the console summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    /// Bytes written across all outcomes.
    pub total_bytes: u64,
    /// Summed per-download wall-clock time.
    pub total_time: Duration,
    /// Outcomes with `success == true`.
    pub successful: usize,
    /// All outcomes, successful or not.
    pub total: usize,
    /// Path of the plain text link list.
    pub txt_path: PathBuf,
    /// Path of the merged JSON export.
    pub json_path: PathBuf,
}

/// Strips a page title down to word characters, dots, and hyphens.
///
/// An empty result falls back to `untitled`.
#[must_use]
pub fn sanitize_title(title: &str) -> String {
    let sanitized: String = title
        .chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, '_' | '.' | '-'))
        .collect();
    if sanitized.is_empty() {
        UNTITLED_KEY.to_string()
    } else {
        sanitized
    }
}

/// Reduces outcomes to totals and persists the merged session export.
///
/// Prior state for the same title is extended, never replaced: the current
/// run's URLs are appended to `image_links` without deduplication, so a
/// rerun accumulates duplicates by design. A missing or malformed prior
/// JSON file is treated as empty state, not an error.
///
/// # Errors
///
/// Returns [`ExportError`] only when the merged export cannot be written.
pub fn aggregate_and_export(
    outcomes: &[DownloadOutcome],
    image_urls: &[String],
    title: Option<&str>,
    dir: &Path,
) -> Result<RunSummary, ExportError> {
    let total_bytes: u64 = outcomes.iter().map(|o| o.bytes_written).sum();
    let total_time: Duration = outcomes.iter().map(|o| o.elapsed).sum();
    let successful = outcomes.iter().filter(|o| o.success).count();

    let key = sanitize_title(title.unwrap_or(""));
    let json_path = dir.join(format!("{key}_images.json"));
    let txt_path = dir.join(format!("{key}_images.txt"));

    let mut export = load_existing(&json_path);
    export.image_links.extend(image_urls.iter().cloned());

    let encoded =
        serde_json::to_string_pretty(&export).map_err(|source| ExportError::Encode { source })?;
    std::fs::write(&json_path, encoded).map_err(|e| ExportError::io(&json_path, e))?;
    std::fs::write(&txt_path, image_urls.join("\n")).map_err(|e| ExportError::io(&txt_path, e))?;

    debug!(
        json = %json_path.display(),
        txt = %txt_path.display(),
        links = image_urls.len(),
        "session export written"
    );

    Ok(RunSummary {
        total_bytes,
        total_time,
        successful,
        total: outcomes.len(),
        txt_path,
        json_path,
    })
}

/// Loads the prior export for a key, treating anything unreadable as empty.
fn load_existing(path: &Path) -> SessionExport {
    let Ok(contents) = std::fs::read_to_string(path) else {
        return SessionExport::default();
    };
    match serde_json::from_str(&contents) {
        Ok(export) => export,
        Err(error) => {
            warn!(
                path = %path.display(),
                error = %error,
                "existing export is not valid JSON, starting from empty state"
            );
            SessionExport::default()
        }
    }
}
