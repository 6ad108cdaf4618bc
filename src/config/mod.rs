//! Configuration module for TapMap
//!
//! This module holds the per-scan configuration (with its clamping rules) and
//! the ambient settings layer loaded from an optional TOML file.
//!
//! # Example
//!
//! ```
//! use tapmap::config::ScanConfig;
//!
//! let config = ScanConfig::new("https://example.com").with_max_pages(5000);
//! assert_eq!(config.effective().max_pages, 1000);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{ScanConfig, Settings};

// Re-export parser functions
pub use parser::load_settings;

// Re-export validation helpers
pub use validation::{
    validate_seed_url, DEFAULT_MAX_DEPTH, DEFAULT_MAX_PAGES, DEFAULT_RATE_LIMIT, MAX_DEPTH_LIMIT,
    MAX_PAGES_LIMIT, RATE_LIMIT_FLOOR,
};
