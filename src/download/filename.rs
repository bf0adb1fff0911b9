//! Filename and directory-name resolution for downloaded images.
//!
//! Names are derived from the URL and stripped to `[A-Za-z0-9-_.]`; a name
//! that sanitizes to nothing gets a random `default_<1..1000>` fallback.
//! Collision-resistant, not collision-free: two URLs with the same basename
//! (or two unlucky fallbacks) resolve to the same path and the later write
//! wins.

use std::path::{Path, PathBuf};

use rand::Rng;
use url::Url;

/// Keeps only characters safe on common filesystems.
pub(crate) fn sanitize_segment(value: &str) -> String {
    value
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
        .collect()
}

/// Random fallback name for URLs whose basename sanitizes to nothing.
pub(crate) fn fallback_name() -> String {
    let n = rand::thread_rng().gen_range(1..=1000);
    format!("default_{n}")
}

/// A name of only dots is a path component, not a filename.
fn is_usable(name: &str) -> bool {
    !name.is_empty() && !name.chars().all(|c| c == '.')
}

/// Maps an image URL to a file path inside `dir`.
///
/// The URL's last path segment is sanitized; whatever extension survives is
/// kept as-is, with no inference from the content type. An existing file at
/// the resolved path is overwritten.
#[must_use]
pub fn resolve(url: &str, dir: &Path) -> PathBuf {
    let basename = Url::parse(url)
        .ok()
        .and_then(|u| {
            u.path_segments()
                .and_then(|mut segments| segments.next_back().map(str::to_string))
        })
        .unwrap_or_default();

    let name = sanitize_segment(&basename);
    let name = if is_usable(&name) {
        name
    } else {
        fallback_name()
    };
    dir.join(name)
}

/// Derives a target directory name from the URL's host.
#[must_use]
pub fn directory_from_url(url: &str) -> String {
    let host = Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_string))
        .unwrap_or_default();

    let name = sanitize_segment(&host);
    if is_usable(&name) { name } else { fallback_name() }
}
