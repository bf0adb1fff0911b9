//! Fan-out orchestration: one page, all of its images at once.
//!
//! The page fetch is a blocking prerequisite; once the image URLs are
//! known, every one of them is launched as its own task against the shared
//! fetcher. The run is a full-barrier wait: it returns only after every
//! task has finished, with outcomes aligned positionally to the input URLs.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::Semaphore;
use tracing::{info, instrument, warn};

use super::fetcher::HttpFetcher;
use super::retry::RetryPolicy;
use super::task::{self, DownloadOutcome};
use crate::page::{self, PageDocument, PageError};

/// Error type for a whole page run.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// The target directory could not be created.
    #[error("failed to create target directory {path}: {source}")]
    Directory {
        /// The directory that could not be created.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The page itself could not be retrieved; nothing was downloaded.
    #[error(transparent)]
    Page(#[from] PageError),
}

/// Everything one page run produced.
///
/// `outcomes[i]` corresponds to `image_urls[i]` regardless of the order in
/// which tasks completed.
#[derive(Debug)]
pub struct PageRun {
    /// Per-image outcomes, aligned with `image_urls`.
    pub outcomes: Vec<DownloadOutcome>,
    /// Image URLs in document order, duplicates preserved.
    pub image_urls: Vec<String>,
    /// The page's title, when it has one.
    pub title: Option<String>,
}

/// Orchestrates the concurrent download of every image on a page.
#[derive(Debug, Clone)]
pub struct FetchEngine {
    fetcher: HttpFetcher,
    retry_policy: RetryPolicy,
    limiter: Option<Arc<Semaphore>>,
}

impl FetchEngine {
    /// Creates an engine sharing one fetcher across all tasks.
    ///
    /// A `concurrency` of `None` (or `Some(0)`) launches every discovered
    /// image at once — the default. A positive cap bounds the fan-out with
    /// a semaphore.
    #[must_use]
    pub fn new(
        fetcher: HttpFetcher,
        retry_policy: RetryPolicy,
        concurrency: Option<usize>,
    ) -> Self {
        let limiter = concurrency
            .filter(|cap| *cap > 0)
            .map(|cap| Arc::new(Semaphore::new(cap)));
        Self {
            fetcher,
            retry_policy,
            limiter,
        }
    }

    /// Runs the full pipeline for one page.
    ///
    /// Ensures `dir` exists, fetches the page (a non-200 status aborts the
    /// run before any image is touched), extracts the image URLs, fans out
    /// one task per URL, and waits for all of them.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError`] only for the run-fatal cases: directory
    /// creation failure or page retrieval failure. Per-image failures are
    /// zero outcomes, never errors.
    #[instrument(skip(self), fields(page = %page_url, dir = %dir.display()))]
    pub async fn run(&self, page_url: &str, dir: &Path) -> Result<PageRun, EngineError> {
        tokio::fs::create_dir_all(dir)
            .await
            .map_err(|e| EngineError::Directory {
                path: dir.to_path_buf(),
                source: e,
            })?;

        // Blocking prerequisite: no fan-out until the page is in hand.
        let PageDocument { title, image_urls } =
            page::fetch_page(&self.fetcher, page_url).await?;
        info!(images = image_urls.len(), "discovered image links");

        let mut handles = Vec::with_capacity(image_urls.len());
        for url in &image_urls {
            let fetcher = self.fetcher.clone();
            let policy = self.retry_policy.clone();
            let limiter = self.limiter.clone();
            let url = url.clone();
            let dir = dir.to_path_buf();
            handles.push(tokio::spawn(async move {
                let _permit = match limiter {
                    // The semaphore is never closed, so acquisition only
                    // fails if the runtime is shutting down.
                    Some(semaphore) => semaphore.acquire_owned().await.ok(),
                    None => None,
                };
                task::run(&fetcher, &policy, &url, &dir).await
            }));
        }

        // Await in spawn order so outcome i lines up with URL i even though
        // tasks finish out of order.
        let mut outcomes = Vec::with_capacity(handles.len());
        for handle in handles {
            match handle.await {
                Ok(outcome) => outcomes.push(outcome),
                Err(error) => {
                    warn!(error = %error, "download task panicked");
                    outcomes.push(DownloadOutcome::zero());
                }
            }
        }

        Ok(PageRun {
            outcomes,
            image_urls,
            title,
        })
    }
}
