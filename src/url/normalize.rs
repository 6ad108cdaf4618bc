/// Normalizes a URL for frontier and visited-set identity
///
/// # Normalization Steps
///
/// 1. Remove the fragment (everything from `#` on)
/// 2. Remove trailing slashes, including on the root path
///
/// Query strings are kept: pages that differ only by query are crawled
/// separately. The result is a plain string because a root URL without its
/// trailing slash (`https://example.com`) is not representable by a parsed
/// URL type.
///
/// # Arguments
///
/// * `url` - The URL string to normalize
///
/// # Examples
///
/// ```
/// use tapmap::url::normalize_url;
///
/// assert_eq!(normalize_url("https://example.com/page/"), "https://example.com/page");
/// assert_eq!(normalize_url("https://example.com/#main"), "https://example.com");
/// assert_eq!(normalize_url("https://example.com/a?b=1"), "https://example.com/a?b=1");
/// ```
pub fn normalize_url(url: &str) -> String {
    let without_fragment = match url.split_once('#') {
        Some((before, _)) => before,
        None => url,
    };
    without_fragment.trim_end_matches('/').to_string()
}
