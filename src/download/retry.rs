//! Fixed-cooldown retry for rate-limited fetches.
//!
//! The policy here is deliberately lopsided: a rate-limit status is retried
//! forever at a fixed spacing, while every other failure class is never
//! retried. One slow-to-recover image must not fail, and one unreachable
//! image must not hold the batch hostage with pointless re-fetches.

use std::time::Duration;

use tracing::{debug, warn};

use super::error::FetchError;
use super::fetcher::{FetchedResource, HttpFetcher};

/// Status code servers use to turn away bulk clients.
pub const RATE_LIMIT_STATUS: u16 = 403;

/// Default cooldown before re-fetching a rate-limited URL (20 seconds).
pub const DEFAULT_COOLDOWN: Duration = Duration::from_secs(20);

/// What to do with the result of one fetch attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Hand the response to the caller, whatever its status.
    Accept,
    /// Wait out the cooldown and fetch the same URL again.
    RetryAfterCooldown,
    /// Give up immediately.
    Fail,
}

/// Classifies one fetch attempt.
///
/// | Attempt result              | Decision           |
/// |-----------------------------|--------------------|
/// | response with status 403    | RetryAfterCooldown |
/// | response, any other status  | Accept             |
/// | transport error             | Fail               |
///
/// Transport errors (timeout, DNS failure, connection reset) are never
/// retried; the caller converts them to a zero outcome.
#[must_use]
pub fn classify_attempt(attempt: &Result<FetchedResource, FetchError>) -> RetryDecision {
    match attempt {
        Ok(resource) if resource.status == RATE_LIMIT_STATUS => RetryDecision::RetryAfterCooldown,
        Ok(_) => RetryDecision::Accept,
        Err(_) => RetryDecision::Fail,
    }
}

/// Retry configuration for rate-limited fetches.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Delay between attempts after a rate-limit response.
    cooldown: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            cooldown: DEFAULT_COOLDOWN,
        }
    }
}

impl RetryPolicy {
    /// Creates a policy with a custom cooldown.
    #[must_use]
    pub fn new(cooldown: Duration) -> Self {
        Self { cooldown }
    }

    /// Returns the configured cooldown.
    #[must_use]
    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }

    /// Fetches `url`, waiting out rate-limit responses.
    ///
    /// A 403 response sleeps for the cooldown and fetches again, with no
    /// attempt cap; the loop ends on the first non-403 response or
    /// transport error. A retried fetch that eventually succeeds is
    /// indistinguishable from a first-attempt success to the caller.
    ///
    /// # Errors
    ///
    /// Returns the fetcher's [`FetchError`] unchanged; transport errors are
    /// never retried.
    pub async fn fetch_with_policy(
        &self,
        fetcher: &HttpFetcher,
        url: &str,
    ) -> Result<FetchedResource, FetchError> {
        loop {
            let attempt = fetcher.fetch(url).await;
            match classify_attempt(&attempt) {
                RetryDecision::Accept => {
                    debug!(url = %url, "attempt accepted");
                    return attempt;
                }
                RetryDecision::Fail => return attempt,
                RetryDecision::RetryAfterCooldown => {
                    warn!(
                        url = %url,
                        cooldown_secs = self.cooldown.as_secs_f64(),
                        "received rate-limit response, retrying after cooldown"
                    );
                    tokio::time::sleep(self.cooldown).await;
                }
            }
        }
    }
}
