//! Robots.txt handling module
//!
//! This module fetches and evaluates a site's robots.txt before a scan
//! starts. The policy is deliberately forgiving: a missing, unreachable, or
//! non-200 robots.txt never blocks a scan. Only a fetched file that
//! explicitly disallows the seed for our user agent does.

use robotstxt::DefaultMatcher;
use std::time::Duration;
use url::Url;

/// Outcome of the robots.txt gate for a scan
#[derive(Debug, Clone)]
pub struct RobotsResult {
    /// Whether a robots.txt file was successfully fetched (HTTP 200)
    pub found: bool,

    /// Whether the seed URL is allowed for our user agent
    pub allowed: bool,

    /// Raw robots.txt content when found
    pub raw_content: Option<String>,

    /// Disallow rule values, in file order, for reporting
    pub disallowed_paths: Vec<String>,
}

impl RobotsResult {
    /// Evaluates fetched robots.txt content against a seed URL
    ///
    /// # Arguments
    ///
    /// * `content` - The raw robots.txt file content
    /// * `user_agent` - Our full user agent string
    /// * `seed_url` - The URL the scan would start from
    pub fn from_content(content: &str, user_agent: &str, seed_url: &str) -> Self {
        let mut matcher = DefaultMatcher::default();
        let allowed = matcher.one_agent_allowed_by_robots(content, user_agent, seed_url);

        let disallowed_paths = content
            .lines()
            .filter_map(|line| {
                let trimmed = line.trim();
                let (key, value) = trimmed.split_once(':')?;
                if !key.trim().eq_ignore_ascii_case("disallow") {
                    return None;
                }
                let value = value.trim();
                if value.is_empty() {
                    None
                } else {
                    Some(value.to_string())
                }
            })
            .collect();

        Self {
            found: true,
            allowed,
            raw_content: Some(content.to_string()),
            disallowed_paths,
        }
    }

    /// The result used whenever no robots.txt could be obtained
    pub fn not_found() -> Self {
        Self {
            found: false,
            allowed: true,
            raw_content: None,
            disallowed_paths: Vec::new(),
        }
    }
}

/// Builds the HTTP client used for robots.txt fetches
///
/// # Arguments
///
/// * `user_agent` - The user agent string to identify as
/// * `timeout` - Total per-request timeout
pub fn build_http_client(
    user_agent: &str,
    timeout: Duration,
) -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .user_agent(user_agent)
        .timeout(timeout)
        .build()
}

/// Fetches and evaluates robots.txt for a seed URL
///
/// The file is fetched from `<origin>/robots.txt`, following redirects. Any
/// failure mode (network error, timeout, 404, other non-200 status,
/// undecodable body) yields a permissive result with `found = false`.
///
/// # Arguments
///
/// * `client` - HTTP client (carries the user agent and timeout)
/// * `seed_url` - The URL the scan starts from
/// * `user_agent` - Our user agent, matched against robots.txt groups
pub async fn check_robots(
    client: &reqwest::Client,
    seed_url: &str,
    user_agent: &str,
) -> RobotsResult {
    let robots_url = match Url::parse(seed_url).and_then(|base| base.join("/robots.txt")) {
        Ok(robots_url) => robots_url,
        Err(e) => {
            tracing::debug!("Could not derive robots.txt URL from {}: {}", seed_url, e);
            return RobotsResult::not_found();
        }
    };

    let response = match client.get(robots_url.clone()).send().await {
        Ok(response) => response,
        Err(e) => {
            tracing::debug!("robots.txt fetch failed for {}: {}", robots_url, e);
            return RobotsResult::not_found();
        }
    };

    let status = response.status();
    if status.as_u16() == 404 {
        tracing::debug!("No robots.txt at {} (404)", robots_url);
        return RobotsResult::not_found();
    }
    if !status.is_success() {
        tracing::debug!("robots.txt at {} returned {}, treating as absent", robots_url, status);
        return RobotsResult::not_found();
    }

    let content = match response.text().await {
        Ok(content) => content,
        Err(e) => {
            tracing::debug!("Could not read robots.txt body from {}: {}", robots_url, e);
            return RobotsResult::not_found();
        }
    };

    let result = RobotsResult::from_content(&content, user_agent, seed_url);
    tracing::debug!(
        "robots.txt fetched from {}: seed {}",
        robots_url,
        if result.allowed { "allowed" } else { "disallowed" }
    );
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    const UA: &str = "TapMap/1.0 (internal pharma audit tool)";

    #[test]
    fn test_permissive_when_absent() {
        let result = RobotsResult::not_found();
        assert!(!result.found);
        assert!(result.allowed);
        assert!(result.disallowed_paths.is_empty());
    }

    #[test]
    fn test_disallow_all_blocks_seed() {
        let content = "User-agent: *\nDisallow: /";
        let result = RobotsResult::from_content(content, UA, "https://example.com/");
        assert!(result.found);
        assert!(!result.allowed);
        assert_eq!(result.disallowed_paths, vec!["/"]);
    }

    #[test]
    fn test_disallow_elsewhere_allows_seed() {
        let content = "User-agent: *\nDisallow: /admin\nDisallow: /private";
        let result = RobotsResult::from_content(content, UA, "https://example.com/");
        assert!(result.allowed);
        assert_eq!(result.disallowed_paths, vec!["/admin", "/private"]);
    }

    #[test]
    fn test_seed_under_disallowed_path() {
        let content = "User-agent: *\nDisallow: /docs";
        let result = RobotsResult::from_content(content, UA, "https://example.com/docs/start");
        assert!(!result.allowed);
    }

    #[test]
    fn test_empty_disallow_lines_skipped() {
        let content = "User-agent: *\nDisallow:\nDisallow: /admin";
        let result = RobotsResult::from_content(content, UA, "https://example.com/");
        assert_eq!(result.disallowed_paths, vec!["/admin"]);
    }

    #[test]
    fn test_disallow_case_insensitive_key() {
        let content = "User-agent: *\nDISALLOW: /secret";
        let result = RobotsResult::from_content(content, UA, "https://example.com/");
        assert_eq!(result.disallowed_paths, vec!["/secret"]);
    }

    #[test]
    fn test_empty_content_allows() {
        let result = RobotsResult::from_content("", UA, "https://example.com/");
        assert!(result.found);
        assert!(result.allowed);
    }

    #[test]
    fn test_other_agent_group_does_not_block() {
        let content = "User-agent: OtherBot\nDisallow: /\n\nUser-agent: *\nAllow: /";
        let result = RobotsResult::from_content(content, UA, "https://example.com/");
        assert!(result.allowed);
    }
}
