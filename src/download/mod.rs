//! Concurrent image download pipeline.
//!
//! Layered leaf to root: [`fetcher`](HttpFetcher) issues single GETs,
//! [`retry`](RetryPolicy) waits out rate-limit responses, `filename`
//! resolves collision-safe paths, `task` runs one image's lifecycle, and
//! [`engine`](FetchEngine) fans out every image on a page and waits for
//! the full batch.

mod constants;
mod engine;
mod error;
mod fetcher;
pub mod filename;
mod retry;
mod task;

pub use engine::{EngineError, FetchEngine, PageRun};
pub use error::FetchError;
pub use fetcher::{FetchedResource, HttpFetcher};
pub use retry::{DEFAULT_COOLDOWN, RATE_LIMIT_STATUS, RetryDecision, RetryPolicy, classify_attempt};
pub use task::DownloadOutcome;
