//! Crawl orchestration
//!
//! This module contains the scan loop and everything it owns:
//! - Breadth-first frontier with visited-set dedup
//! - Per-page visits through the browser substrate
//! - robots.txt gate, page/depth/rate/time caps
//! - Scan outcome assembly (pages, consent, analytics union)

mod engine;
mod frontier;
mod types;
mod visitor;

pub use engine::CrawlEngine;
pub use types::{
    generate_scan_id, CrawlProgress, PageResult, ScanOutcome, ScanQuality, ScanStatus,
};

use crate::browser::CdpLauncher;
use crate::config::{ScanConfig, Settings};
use crate::Result;

/// Runs a complete scan against a live Chromium
///
/// Convenience wrapper over [`CrawlEngine`]: builds the browser launcher
/// from `settings` and drives the crawl to its outcome. Callers that need
/// progress reporting or a different browser substrate construct the engine
/// directly.
pub async fn run_crawl(
    config: &ScanConfig,
    settings: &Settings,
    scan_id: &str,
) -> Result<ScanOutcome> {
    let launcher = CdpLauncher::new(settings);
    let mut engine = CrawlEngine::new(config.clone(), settings.clone())?;
    engine.run(scan_id, &launcher).await
}
