//! Browser substrate module
//!
//! The crawl pipeline talks to the browser exclusively through the narrow
//! traits in this module: open a tab, navigate it, evaluate a script in the
//! page, close it. Everything the scanner learns about a page (consent
//! banners, interactive elements, analytics globals, links) travels through
//! [`Tab::evaluate`] as JSON. The one production implementation drives
//! Chromium over CDP ([`cdp`]); tests substitute canned tabs.

pub mod cdp;

#[cfg(test)]
pub(crate) mod fake;

use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

pub use cdp::CdpLauncher;

/// Browser-layer errors
#[derive(Debug, Error)]
pub enum BrowserError {
    #[error("Failed to launch browser: {0}")]
    Launch(String),

    #[error("Failed to open tab: {0}")]
    OpenTab(String),

    #[error("Navigation failed for {url}: {message}")]
    Navigation { url: String, message: String },

    #[error("Script evaluation failed: {0}")]
    Evaluate(String),
}

/// What the browser observed for the main document of a navigation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationInfo {
    /// HTTP status of the final (post-redirect) document response
    pub status: u16,

    /// MIME type of the document response, when the browser reported one
    pub content_type: Option<String>,

    /// URL the navigation actually landed on
    pub final_url: String,
}

/// A single open page
#[async_trait]
pub trait Tab: Send {
    /// Navigates to `url`, waiting until the document has loaded
    ///
    /// Returns `Ok(None)` when no response arrived within the timeout (the
    /// server hung or the load never produced a document response).
    /// Navigation-level failures (DNS, connection refused) are errors.
    async fn goto(
        &self,
        url: &str,
        timeout: Duration,
    ) -> Result<Option<NavigationInfo>, BrowserError>;

    /// Best-effort wait for in-page network activity to settle
    ///
    /// Never fails; gives dynamic pages a bounded chance to finish rendering.
    async fn wait_for_idle(&self, timeout: Duration);

    /// Evaluates a script in the page and returns its JSON result
    ///
    /// Scripts are self-contained expressions (typically IIFEs) whose return
    /// value must be JSON-serializable. A script that returns nothing yields
    /// `Value::Null`.
    async fn evaluate(&self, script: &str) -> Result<Value, BrowserError>;

    /// Closes the tab, releasing its renderer
    ///
    /// Best-effort: failures are logged, never propagated.
    async fn close(&mut self);
}

/// A running browser, scoped to one crawl
#[async_trait]
pub trait Browser: Send {
    /// Opens a fresh tab
    async fn open_tab(&self) -> Result<Box<dyn Tab>, BrowserError>;

    /// Shuts the browser down
    ///
    /// Best-effort: failures are logged, never propagated. Called on every
    /// crawl exit path.
    async fn close(&mut self);
}

/// Launches browsers
///
/// The crawl engine receives a launcher and owns the launched browser for the
/// duration of the crawl. A launch failure is the one browser error that
/// aborts a crawl outright.
#[async_trait]
pub trait BrowserLauncher: Send + Sync {
    async fn launch(&self) -> Result<Box<dyn Browser>, BrowserError>;
}
