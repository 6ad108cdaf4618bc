use crate::config::types::ScanConfig;
use crate::ConfigError;
use url::Url;

/// Default number of pages to visit
pub const DEFAULT_MAX_PAGES: u32 = 200;

/// Hard ceiling for max_pages
pub const MAX_PAGES_LIMIT: u32 = 1000;

/// Default link depth from the seed
pub const DEFAULT_MAX_DEPTH: u32 = 5;

/// Hard ceiling for max_depth
pub const MAX_DEPTH_LIMIT: u32 = 20;

/// Default requests per second
pub const DEFAULT_RATE_LIMIT: f64 = 1.0;

/// Lowest allowed request rate; slower configs are raised to this
pub const RATE_LIMIT_FLOOR: f64 = 0.5;

/// Clamps all caps on a scan configuration to their allowed ranges
///
/// - `max_pages` is clamped to 1..=1000
/// - `max_depth` is clamped to 1..=20
/// - `rate_limit` is floored at 0.5 requests/second; non-finite values fall
///   back to the default
pub fn apply_limits(config: &mut ScanConfig) {
    config.max_pages = config.max_pages.clamp(1, MAX_PAGES_LIMIT);
    config.max_depth = config.max_depth.clamp(1, MAX_DEPTH_LIMIT);

    if !config.rate_limit.is_finite() {
        config.rate_limit = DEFAULT_RATE_LIMIT;
    }
    if config.rate_limit < RATE_LIMIT_FLOOR {
        config.rate_limit = RATE_LIMIT_FLOOR;
    }
}

/// Validates the seed URL of a scan configuration
///
/// The URL must parse and use the http or https scheme. Host-level safety
/// (loopback, private ranges) is the caller's concern; see
/// [`crate::url::ensure_public_target`].
pub fn validate_seed_url(config: &ScanConfig) -> Result<(), ConfigError> {
    let url = Url::parse(&config.url)
        .map_err(|e| ConfigError::InvalidUrl(format!("'{}': {}", config.url, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "'{}': only http and https schemes are supported",
            config.url
        )));
    }

    if url.host_str().is_none() {
        return Err(ConfigError::InvalidUrl(format!(
            "'{}': URL has no host",
            config.url
        )));
    }

    Ok(())
}
