//! Fixed request identity for outbound HTTP traffic.
//!
//! Some sites turn away clients that do not look like a browser, so every
//! request (page and image alike) carries the same browser User-Agent and
//! Accept-Language pair.

use reqwest::header::{ACCEPT_LANGUAGE, HeaderMap, HeaderValue, USER_AGENT};

/// Browser User-Agent sent with every request.
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Accepted languages sent with every request.
pub const ACCEPT_LANGUAGE_VALUE: &str = "en-US,en;q=0.5";

/// Default header set shared by page and image requests.
#[must_use]
pub fn default_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, HeaderValue::from_static(BROWSER_USER_AGENT));
    headers.insert(
        ACCEPT_LANGUAGE,
        HeaderValue::from_static(ACCEPT_LANGUAGE_VALUE),
    );
    headers
}
