use crate::config::validation;
use serde::Deserialize;
use std::time::Duration;

/// Per-scan configuration
///
/// Captures everything a single crawl needs: the seed URL, the crawl caps,
/// and the keyword-context setup. A crawl snapshots the effective (clamped)
/// values when it starts; changing a `ScanConfig` afterwards has no effect on
/// a running crawl.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Seed URL the crawl starts from
    pub url: String,

    /// Maximum number of pages to visit (clamped to 1..=1000)
    pub max_pages: u32,

    /// Maximum link depth from the seed (clamped to 1..=20)
    pub max_depth: u32,

    /// Requests per second (floored at 0.5)
    pub rate_limit: f64,

    /// Name of the keyword context ("Pharma" selects the built-in vocabulary)
    pub tag_name: String,

    /// Custom keyword list; when set, replaces the built-in vocabulary
    pub tag_keywords: Option<Vec<String>>,
}

impl ScanConfig {
    /// Creates a configuration with the default caps for the given seed URL
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            max_pages: validation::DEFAULT_MAX_PAGES,
            max_depth: validation::DEFAULT_MAX_DEPTH,
            rate_limit: validation::DEFAULT_RATE_LIMIT,
            tag_name: "Pharma".to_string(),
            tag_keywords: None,
        }
    }

    pub fn with_max_pages(mut self, max_pages: u32) -> Self {
        self.max_pages = max_pages;
        self
    }

    pub fn with_max_depth(mut self, max_depth: u32) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_rate_limit(mut self, rate_limit: f64) -> Self {
        self.rate_limit = rate_limit;
        self
    }

    pub fn with_tag(mut self, name: impl Into<String>, keywords: Option<Vec<String>>) -> Self {
        self.tag_name = name.into();
        self.tag_keywords = keywords;
        self
    }

    /// Returns a copy with all caps clamped to their allowed ranges
    ///
    /// This is what the crawl engine snapshots at start; see
    /// `validation::apply_limits` for the exact rules.
    pub fn effective(&self) -> Self {
        let mut config = self.clone();
        validation::apply_limits(&mut config);
        config
    }

    /// Seconds to sleep between page visits (1 / rate_limit)
    pub fn request_delay(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.rate_limit.max(validation::RATE_LIMIT_FLOOR))
    }
}

/// Ambient scanner settings
///
/// Loaded from an optional TOML file; every field has a default so an empty
/// file (or no file at all) is valid.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// User agent sent on robots.txt fetches and page navigations
    #[serde(rename = "user-agent", default = "default_user_agent")]
    pub user_agent: String,

    /// Wall-clock budget for a whole scan, in seconds
    #[serde(rename = "scan-timeout-seconds", default = "default_scan_timeout")]
    pub scan_timeout_seconds: u64,

    /// Per-page navigation timeout, in milliseconds
    #[serde(rename = "navigation-timeout-ms", default = "default_navigation_timeout")]
    pub navigation_timeout_ms: u64,

    /// Best-effort wait for network activity to settle, in milliseconds
    #[serde(rename = "network-idle-timeout-ms", default = "default_network_idle_timeout")]
    pub network_idle_timeout_ms: u64,

    /// Settle delay before probing for a consent banner, in milliseconds
    #[serde(rename = "consent-settle-ms", default = "default_consent_settle")]
    pub consent_settle_ms: u64,

    /// Settle delay after a dismissal click, in milliseconds
    #[serde(rename = "click-settle-ms", default = "default_click_settle")]
    pub click_settle_ms: u64,

    /// robots.txt fetch timeout, in seconds
    #[serde(rename = "robots-timeout-seconds", default = "default_robots_timeout")]
    pub robots_timeout_seconds: u64,

    /// Browser viewport width, in CSS pixels
    #[serde(rename = "viewport-width", default = "default_viewport_width")]
    pub viewport_width: u32,

    /// Browser viewport height, in CSS pixels
    #[serde(rename = "viewport-height", default = "default_viewport_height")]
    pub viewport_height: u32,

    /// Whether the browser runs headless
    #[serde(default = "default_headless")]
    pub headless: bool,

    /// Path to the SQLite database file
    #[serde(rename = "database-path", default = "default_database_path")]
    pub database_path: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            scan_timeout_seconds: default_scan_timeout(),
            navigation_timeout_ms: default_navigation_timeout(),
            network_idle_timeout_ms: default_network_idle_timeout(),
            consent_settle_ms: default_consent_settle(),
            click_settle_ms: default_click_settle(),
            robots_timeout_seconds: default_robots_timeout(),
            viewport_width: default_viewport_width(),
            viewport_height: default_viewport_height(),
            headless: default_headless(),
            database_path: default_database_path(),
        }
    }
}

impl Settings {
    pub fn scan_timeout(&self) -> Duration {
        Duration::from_secs(self.scan_timeout_seconds)
    }

    pub fn navigation_timeout(&self) -> Duration {
        Duration::from_millis(self.navigation_timeout_ms)
    }

    pub fn network_idle_timeout(&self) -> Duration {
        Duration::from_millis(self.network_idle_timeout_ms)
    }

    pub fn consent_settle(&self) -> Duration {
        Duration::from_millis(self.consent_settle_ms)
    }

    pub fn click_settle(&self) -> Duration {
        Duration::from_millis(self.click_settle_ms)
    }

    pub fn robots_timeout(&self) -> Duration {
        Duration::from_secs(self.robots_timeout_seconds)
    }
}

fn default_user_agent() -> String {
    "TapMap/1.0 (internal pharma audit tool)".to_string()
}

fn default_scan_timeout() -> u64 {
    900
}

fn default_navigation_timeout() -> u64 {
    30_000
}

fn default_network_idle_timeout() -> u64 {
    10_000
}

fn default_consent_settle() -> u64 {
    2_000
}

fn default_click_settle() -> u64 {
    1_000
}

fn default_robots_timeout() -> u64 {
    10
}

fn default_viewport_width() -> u32 {
    1280
}

fn default_viewport_height() -> u32 {
    800
}

fn default_headless() -> bool {
    true
}

fn default_database_path() -> String {
    "data/tapmap.db".to_string()
}
