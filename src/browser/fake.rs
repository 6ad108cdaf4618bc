//! Canned browser substrate for tests
//!
//! A [`FakeSite`] maps URLs to scripted pages: each page carries the
//! navigation outcome to report and a table of script → JSON answers for
//! [`Tab::evaluate`]. Scripts the page has no answer for return `Null`,
//! which every consumer treats as "nothing there". Launch/open/close calls
//! are counted so tests can assert resource release.

use crate::browser::{Browser, BrowserError, BrowserLauncher, NavigationInfo, Tab};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Debug, Default, Clone)]
pub struct SubstrateStats {
    pub browsers_launched: u32,
    pub browsers_closed: u32,
    pub tabs_opened: u32,
    pub tabs_closed: u32,
}

#[derive(Clone)]
pub struct FakePage {
    nav: Option<NavigationInfo>,
    nav_error: Option<String>,
    delay: Duration,
    responses: HashMap<String, Value>,
}

impl FakePage {
    /// A page that loads as 200 text/html at its own URL
    pub fn html(url: &str) -> Self {
        Self {
            nav: Some(NavigationInfo {
                status: 200,
                content_type: Some("text/html; charset=utf-8".to_string()),
                final_url: url.to_string(),
            }),
            nav_error: None,
            delay: Duration::ZERO,
            responses: HashMap::new(),
        }
    }

    /// A page whose navigation produces no response at all
    pub fn no_response() -> Self {
        Self {
            nav: None,
            nav_error: None,
            delay: Duration::ZERO,
            responses: HashMap::new(),
        }
    }

    /// A page whose navigation errors (connection refused, DNS, ...)
    pub fn nav_error(message: &str) -> Self {
        Self {
            nav: None,
            nav_error: Some(message.to_string()),
            delay: Duration::ZERO,
            responses: HashMap::new(),
        }
    }

    pub fn with_status(mut self, status: u16) -> Self {
        if let Some(nav) = self.nav.as_mut() {
            nav.status = status;
        }
        self
    }

    pub fn with_content_type(mut self, content_type: Option<&str>) -> Self {
        if let Some(nav) = self.nav.as_mut() {
            nav.content_type = content_type.map(str::to_string);
        }
        self
    }

    pub fn with_final_url(mut self, final_url: &str) -> Self {
        if let Some(nav) = self.nav.as_mut() {
            nav.final_url = final_url.to_string();
        }
        self
    }

    /// Makes the navigation take this long before resolving
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Answers `script` with `value` when evaluated on this page
    pub fn with_eval(mut self, script: impl Into<String>, value: Value) -> Self {
        self.responses.insert(script.into(), value);
        self
    }
}

#[derive(Default)]
pub struct FakeSite {
    pages: HashMap<String, FakePage>,
}

impl FakeSite {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, url: &str, page: FakePage) -> Self {
        self.pages.insert(url.to_string(), page);
        self
    }
}

pub struct FakeLauncher {
    site: Arc<FakeSite>,
    fail_launch: bool,
    stats: Arc<Mutex<SubstrateStats>>,
}

impl FakeLauncher {
    pub fn new(site: FakeSite) -> Self {
        Self {
            site: Arc::new(site),
            fail_launch: false,
            stats: Arc::new(Mutex::new(SubstrateStats::default())),
        }
    }

    pub fn failing() -> Self {
        let mut launcher = Self::new(FakeSite::new());
        launcher.fail_launch = true;
        launcher
    }

    pub fn stats(&self) -> SubstrateStats {
        self.stats.lock().unwrap().clone()
    }
}

#[async_trait]
impl BrowserLauncher for FakeLauncher {
    async fn launch(&self) -> Result<Box<dyn Browser>, BrowserError> {
        if self.fail_launch {
            return Err(BrowserError::Launch("no chromium available".to_string()));
        }
        self.stats.lock().unwrap().browsers_launched += 1;
        Ok(Box::new(FakeBrowser {
            site: Arc::clone(&self.site),
            stats: Arc::clone(&self.stats),
        }))
    }
}

pub struct FakeBrowser {
    site: Arc<FakeSite>,
    stats: Arc<Mutex<SubstrateStats>>,
}

#[async_trait]
impl Browser for FakeBrowser {
    async fn open_tab(&self) -> Result<Box<dyn Tab>, BrowserError> {
        self.stats.lock().unwrap().tabs_opened += 1;
        Ok(Box::new(FakeTab {
            site: Arc::clone(&self.site),
            stats: Arc::clone(&self.stats),
            current: Mutex::new(None),
            closed: false,
        }))
    }

    async fn close(&mut self) {
        self.stats.lock().unwrap().browsers_closed += 1;
    }
}

pub struct FakeTab {
    site: Arc<FakeSite>,
    stats: Arc<Mutex<SubstrateStats>>,
    current: Mutex<Option<String>>,
    closed: bool,
}

#[async_trait]
impl Tab for FakeTab {
    async fn goto(
        &self,
        url: &str,
        timeout: Duration,
    ) -> Result<Option<NavigationInfo>, BrowserError> {
        let page = match self.site.pages.get(url) {
            Some(page) => page.clone(),
            None => {
                return Err(BrowserError::Navigation {
                    url: url.to_string(),
                    message: "net::ERR_CONNECTION_REFUSED".to_string(),
                })
            }
        };

        if page.delay > timeout {
            tokio::time::sleep(timeout).await;
            return Ok(None);
        }
        if !page.delay.is_zero() {
            tokio::time::sleep(page.delay).await;
        }

        if let Some(message) = page.nav_error {
            return Err(BrowserError::Navigation {
                url: url.to_string(),
                message,
            });
        }

        *self.current.lock().unwrap() = Some(url.to_string());
        Ok(page.nav)
    }

    async fn wait_for_idle(&self, _timeout: Duration) {}

    async fn evaluate(&self, script: &str) -> Result<Value, BrowserError> {
        let current = self.current.lock().unwrap().clone();
        let value = current
            .and_then(|url| self.site.pages.get(&url))
            .and_then(|page| page.responses.get(script))
            .cloned()
            .unwrap_or(Value::Null);
        Ok(value)
    }

    async fn close(&mut self) {
        if !self.closed {
            self.closed = true;
            self.stats.lock().unwrap().tabs_closed += 1;
        }
    }
}
