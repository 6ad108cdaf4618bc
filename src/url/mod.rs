//! URL handling module for TapMap
//!
//! This module provides URL normalization, domain identity, the crawlability
//! filter, and the public-address guard for scan targets.

mod domain;
mod normalize;

use url::Url;

// Re-export main functions
pub use domain::{ensure_public_target, DomainKey};
pub use normalize::normalize_url;

/// File extensions that are never worth a browser visit
///
/// Checked against the lowercased URL path. Links ending in one of these are
/// dropped at discovery time instead of being navigated and rejected as
/// non-HTML.
pub const SKIP_EXTENSIONS: &[&str] = &[
    ".pdf", ".jpg", ".jpeg", ".png", ".gif", ".svg", ".webp", ".mp4", ".mp3", ".wav", ".avi",
    ".mov", ".zip", ".tar", ".gz", ".rar", ".doc", ".docx", ".xls", ".xlsx", ".ppt", ".pptx",
    ".css", ".js", ".json", ".xml", ".ico",
];

/// Decides whether a discovered link belongs in the crawl frontier
///
/// A URL is crawlable when it parses, uses http or https, stays on the scan's
/// domain, and its path does not end in a skipped extension. Anything that
/// fails any of these checks is silently dropped by the caller.
///
/// # Arguments
///
/// * `url` - The candidate URL (normalized or not)
/// * `base` - The domain the scan is confined to
///
/// # Examples
///
/// ```
/// use tapmap::url::{is_crawlable, DomainKey};
///
/// let base = DomainKey::from_url("https://example.com").unwrap();
/// assert!(is_crawlable("https://example.com/about", &base));
/// assert!(!is_crawlable("https://other.com/about", &base));
/// assert!(!is_crawlable("https://example.com/report.pdf", &base));
/// ```
pub fn is_crawlable(url: &str, base: &DomainKey) -> bool {
    let parsed = match Url::parse(url) {
        Ok(parsed) => parsed,
        Err(_) => return false,
    };

    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        return false;
    }

    match DomainKey::from_parsed(&parsed) {
        Ok(key) if key == *base => {}
        _ => return false,
    }

    let path = parsed.path().to_lowercase();
    !SKIP_EXTENSIONS.iter().any(|ext| path.ends_with(ext))
}
