//! One image's download lifecycle: fetch, gate, persist, time.

use std::path::Path;
use std::time::{Duration, Instant};

use tracing::{info, warn};

use super::error::FetchError;
use super::fetcher::HttpFetcher;
use super::filename;
use super::retry::RetryPolicy;

/// Per-image result record.
///
/// Every failure and skip collapses to [`DownloadOutcome::zero`], so one bad
/// resource never aborts the batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadOutcome {
    /// Whether an image file was written.
    pub success: bool,
    /// Size of the written file on disk, 0 on failure.
    pub bytes_written: u64,
    /// Wall-clock time from fetch start to write completion, 0 on failure.
    pub elapsed: Duration,
}

impl DownloadOutcome {
    /// The outcome for anything that produced no file.
    #[must_use]
    pub fn zero() -> Self {
        Self {
            success: false,
            bytes_written: 0,
            elapsed: Duration::ZERO,
        }
    }
}

/// Downloads one image into `dir`.
///
/// Infallible by contract: fetch failures, non-image responses, and write
/// failures are logged with the offending URL and collapse to a zero
/// outcome. Only the rate-limit path retries, inside the policy.
pub async fn run(
    fetcher: &HttpFetcher,
    policy: &RetryPolicy,
    url: &str,
    dir: &Path,
) -> DownloadOutcome {
    match try_run(fetcher, policy, url, dir).await {
        Ok(outcome) => outcome,
        Err(error) => {
            warn!(url = %url, error = %error, "image download failed");
            DownloadOutcome::zero()
        }
    }
}

async fn try_run(
    fetcher: &HttpFetcher,
    policy: &RetryPolicy,
    url: &str,
    dir: &Path,
) -> Result<DownloadOutcome, FetchError> {
    let started = Instant::now();

    let resource = policy.fetch_with_policy(fetcher, url).await?;

    // The gate runs after the body transfer, so a rejected resource has
    // already cost its bandwidth.
    if !resource.content_type.starts_with("image") {
        info!(url = %url, content_type = %resource.content_type, "skipped non-image");
        return Ok(DownloadOutcome::zero());
    }

    let path = filename::resolve(url, dir);
    tokio::fs::write(&path, &resource.body)
        .await
        .map_err(|e| FetchError::io(&path, e))?;

    let bytes_written = tokio::fs::metadata(&path)
        .await
        .map_err(|e| FetchError::io(&path, e))?
        .len();
    let elapsed = started.elapsed();

    info!(
        url = %url,
        path = %path.display(),
        bytes = bytes_written,
        elapsed_ms = elapsed.as_millis() as u64,
        "downloaded image"
    );

    Ok(DownloadOutcome {
        success: true,
        bytes_written,
        elapsed,
    })
}
