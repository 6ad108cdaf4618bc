//! TapMap: a bounded interaction-surface scanner
//!
//! This crate implements a single-domain website scanner that renders pages in
//! a real browser, dismisses consent overlays, extracts interactive elements
//! with semantic metadata, and detects analytics tooling, while respecting
//! robots.txt, rate limits, and page/depth/time caps.

pub mod analytics;
pub mod browser;
pub mod config;
pub mod consent;
pub mod crawler;
pub mod export;
pub mod extract;
pub mod robots;
pub mod storage;
pub mod url;

use thiserror::Error;

/// Main error type for TapMap operations
#[derive(Debug, Error)]
pub enum TapMapError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Browser error: {0}")]
    Browser(#[from] browser::BrowserError),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("URL error: {0}")]
    UrlError(#[from] UrlError),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Unsafe scan target: {0}")]
    UnsafeTarget(String),

    #[error("CSV export error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read settings file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid scan URL: {0}")]
    InvalidUrl(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing host in URL")]
    MissingHost,
}

/// Result type alias for TapMap operations
pub type Result<T> = std::result::Result<T, TapMapError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::{ScanConfig, Settings};
pub use crawler::{run_crawl, CrawlEngine, CrawlProgress, PageResult, ScanOutcome, ScanStatus};
pub use extract::ElementResult;
pub use url::{is_crawlable, normalize_url, DomainKey};
