//! HTTP fetcher: one GET per call, response handed back uninterpreted.
//!
//! The fetcher is created once and cloned into every download task so all
//! requests share a single connection pool. It attaches the fixed browser
//! header set, buffers the full body, and reports the status and
//! content-type as data. Retry decisions live in [`super::retry`]; nothing
//! here retries or classifies.

use std::time::Duration;

use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use tracing::{debug, instrument};
use url::Url;

use super::constants::{CONNECT_TIMEOUT_SECS, READ_TIMEOUT_SECS};
use super::error::FetchError;
use crate::user_agent;

/// One fetched resource: status, declared content type, and the full body.
#[derive(Debug, Clone)]
pub struct FetchedResource {
    /// HTTP status code, uninterpreted (a 404 is still a resource).
    pub status: u16,
    /// Value of the Content-Type header, empty when absent.
    pub content_type: String,
    /// Full response body.
    pub body: Vec<u8>,
}

/// HTTP client for page and image fetches.
///
/// Cheap to clone; clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpFetcher {
    /// Creates a fetcher with the default timeouts and browser headers.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client builder fails with the static
    /// configuration. This should never happen in practice.
    #[must_use]
    pub fn new() -> Self {
        Self::new_with_timeouts(CONNECT_TIMEOUT_SECS, READ_TIMEOUT_SECS)
    }

    /// Creates a fetcher with explicit timeout values.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client builder fails with the supplied
    /// configuration.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn new_with_timeouts(connect_timeout_secs: u64, read_timeout_secs: u64) -> Self {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(connect_timeout_secs))
            .timeout(Duration::from_secs(read_timeout_secs))
            .gzip(true)
            .cookie_store(true)
            .default_headers(user_agent::default_headers())
            .build()
            .expect("failed to build HTTP client with static configuration");
        Self { client }
    }

    /// Fetches one resource, buffering the full body.
    ///
    /// The status code is returned as-is; only transport failures (DNS,
    /// connect, timeout, body read) produce an error.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError`] if the URL is malformed or the request fails
    /// at the transport level.
    #[instrument(skip(self), fields(url = %url))]
    pub async fn fetch(&self, url: &str) -> Result<FetchedResource, FetchError> {
        Url::parse(url).map_err(|_| FetchError::invalid_url(url))?;

        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::timeout(url)
            } else {
                FetchError::network(url, e)
            }
        })?;

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();

        let body = response
            .bytes()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    FetchError::timeout(url)
                } else {
                    FetchError::network(url, e)
                }
            })?
            .to_vec();

        debug!(status, content_type = %content_type, bytes = body.len(), "fetched resource");

        Ok(FetchedResource {
            status,
            content_type,
            body,
        })
    }

    /// Fetches one resource as text, for page markup.
    ///
    /// # Errors
    ///
    /// Returns the same errors as [`fetch`](Self::fetch).
    #[instrument(skip(self), fields(url = %url))]
    pub async fn fetch_text(&self, url: &str) -> Result<(u16, String), FetchError> {
        let resource = self.fetch(url).await?;
        let text = String::from_utf8_lossy(&resource.body).into_owned();
        Ok((resource.status, text))
    }
}
