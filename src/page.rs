//! Page retrieval and image-link discovery.
//!
//! The page fetch is the run's blocking prerequisite: a page that does not
//! answer with a 200 aborts the whole run before any image task starts.
//! Extraction is a thin pass over the markup — the `src` attribute of every
//! `img`, resolved against the page URL, in document order.

use scraper::{Html, Selector};
use thiserror::Error;
use tracing::debug;
use url::Url;

use crate::download::{FetchError, HttpFetcher};

/// Errors that abort a page run before any download starts.
#[derive(Debug, Error)]
pub enum PageError {
    /// The page answered with a non-200 status.
    #[error("failed to retrieve page {url}: HTTP {status}")]
    Status {
        /// The page URL.
        url: String,
        /// The status code the page answered with.
        status: u16,
    },

    /// The page could not be fetched at all.
    #[error(transparent)]
    Fetch(#[from] FetchError),
}

/// Title and image links extracted from one page.
#[derive(Debug, Clone)]
pub struct PageDocument {
    /// Text of the `<title>` element, when present and non-empty.
    pub title: Option<String>,
    /// Absolute image URLs in document order, duplicates preserved.
    pub image_urls: Vec<String>,
}

/// Fetches `page_url` and extracts its title and image links.
///
/// # Errors
///
/// Returns [`PageError::Status`] for any non-200 answer and
/// [`PageError::Fetch`] for transport failures. Both are run-fatal.
pub async fn fetch_page(
    fetcher: &HttpFetcher,
    page_url: &str,
) -> Result<PageDocument, PageError> {
    let (status, body) = fetcher.fetch_text(page_url).await?;
    if status != 200 {
        return Err(PageError::Status {
            url: page_url.to_string(),
            status,
        });
    }
    Ok(parse_document(&body, page_url))
}

/// Extracts the `<title>` text and every `img` `src`, resolved against
/// `base_url`.
///
/// Duplicates are not collapsed: each occurrence of the same image URL
/// downloads independently.
#[must_use]
pub fn parse_document(html: &str, base_url: &str) -> PageDocument {
    let document = Html::parse_document(html);

    let title = document
        .select(&title_selector())
        .next()
        .map(|element| element.text().collect::<String>().trim().to_string())
        .filter(|text| !text.is_empty());

    let base = Url::parse(base_url).ok();
    let mut image_urls = Vec::new();
    for element in document.select(&image_selector()) {
        let Some(src) = element.value().attr("src") else {
            continue;
        };
        let resolved = match &base {
            Some(base) => base.join(src).map(String::from).ok(),
            None => Some(src.to_string()),
        };
        match resolved {
            Some(url) => image_urls.push(url),
            None => debug!(src = %src, "skipping unresolvable image src"),
        }
    }

    PageDocument { title, image_urls }
}

#[allow(clippy::expect_used)]
fn image_selector() -> Selector {
    Selector::parse("img[src]").expect("static selector is valid")
}

#[allow(clippy::expect_used)]
fn title_selector() -> Selector {
    Selector::parse("title").expect("static selector is valid")
}
