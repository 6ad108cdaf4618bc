//! Chromium implementation of the browser substrate
//!
//! Drives a headless (by default) Chromium over the DevTools protocol via
//! chromiumoxide. One launched browser maps to one crawl; tabs are opened per
//! page visit and closed eagerly. HTTP status and content type for a
//! navigation come from the first main-document network response, which also
//! reflects where any redirects landed.

use crate::browser::{Browser, BrowserError, BrowserLauncher, NavigationInfo, Tab};
use crate::config::Settings;
use async_trait::async_trait;
use chromiumoxide::browser::{Browser as ChromiumBrowser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::network::{EventResponseReceived, ResourceType};
use chromiumoxide::cdp::js_protocol::runtime::EvaluateParams;
use chromiumoxide::Page;
use futures::StreamExt;
use serde_json::Value;
use std::time::Duration;
use tokio::task::JoinHandle;

/// How long after a completed navigation we still wait for the document
/// response event to arrive
const RESPONSE_GRACE: Duration = Duration::from_secs(2);

/// Poll interval while waiting for the document to finish loading
const IDLE_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Settle time after the document reports itself complete
const IDLE_SETTLE: Duration = Duration::from_millis(500);

/// Launches Chromium processes configured from the scanner settings
pub struct CdpLauncher {
    headless: bool,
    viewport_width: u32,
    viewport_height: u32,
    user_agent: String,
}

impl CdpLauncher {
    pub fn new(settings: &Settings) -> Self {
        Self {
            headless: settings.headless,
            viewport_width: settings.viewport_width,
            viewport_height: settings.viewport_height,
            user_agent: settings.user_agent.clone(),
        }
    }
}

#[async_trait]
impl BrowserLauncher for CdpLauncher {
    async fn launch(&self) -> Result<Box<dyn Browser>, BrowserError> {
        let mut builder = BrowserConfig::builder()
            .window_size(self.viewport_width, self.viewport_height)
            .launch_timeout(Duration::from_secs(20))
            .args(vec![format!("--user-agent={}", self.user_agent)]);

        if !self.headless {
            builder = builder.with_head();
        }

        let config = builder.build().map_err(BrowserError::Launch)?;

        let (browser, mut handler) = ChromiumBrowser::launch(config)
            .await
            .map_err(|e| BrowserError::Launch(e.to_string()))?;

        // The handler stream must be polled for the browser connection to
        // make progress; it ends when the browser goes away.
        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        tracing::debug!("Chromium launched (headless: {})", self.headless);

        Ok(Box::new(CdpBrowser {
            browser: Some(browser),
            handler_task,
        }))
    }
}

/// A running Chromium instance
pub struct CdpBrowser {
    browser: Option<ChromiumBrowser>,
    handler_task: JoinHandle<()>,
}

#[async_trait]
impl Browser for CdpBrowser {
    async fn open_tab(&self) -> Result<Box<dyn Tab>, BrowserError> {
        let browser = self
            .browser
            .as_ref()
            .ok_or_else(|| BrowserError::OpenTab("browser already closed".to_string()))?;

        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| BrowserError::OpenTab(e.to_string()))?;

        Ok(Box::new(CdpTab { page: Some(page) }))
    }

    async fn close(&mut self) {
        if let Some(mut browser) = self.browser.take() {
            if let Err(e) = browser.close().await {
                tracing::warn!("Browser close failed: {}", e);
            }
            if let Err(e) = browser.wait().await {
                tracing::debug!("Browser process wait failed: {}", e);
            }
        }
        self.handler_task.abort();
    }
}

/// One open Chromium tab
pub struct CdpTab {
    page: Option<Page>,
}

impl CdpTab {
    fn page_or(&self, context: &str) -> Result<&Page, BrowserError> {
        self.page
            .as_ref()
            .ok_or_else(|| BrowserError::Evaluate(format!("tab already closed during {}", context)))
    }
}

#[async_trait]
impl Tab for CdpTab {
    async fn goto(
        &self,
        url: &str,
        timeout: Duration,
    ) -> Result<Option<NavigationInfo>, BrowserError> {
        let page = self.page_or("navigation").map_err(|_| BrowserError::Navigation {
            url: url.to_string(),
            message: "tab already closed".to_string(),
        })?;

        // Subscribe before navigating so the document response cannot be
        // missed. The first Document-type response is the navigation's final
        // (post-redirect) response.
        let mut responses = page
            .event_listener::<EventResponseReceived>()
            .await
            .map_err(|e| BrowserError::Navigation {
                url: url.to_string(),
                message: format!("could not subscribe to responses: {}", e),
            })?;

        let (tx, rx) = tokio::sync::oneshot::channel();
        let capture = tokio::spawn(async move {
            while let Some(event) = responses.next().await {
                if event.r#type == ResourceType::Document {
                    let mime = event.response.mime_type.trim().to_string();
                    let info = NavigationInfo {
                        status: event.response.status as u16,
                        content_type: if mime.is_empty() { None } else { Some(mime) },
                        final_url: event.response.url.clone(),
                    };
                    let _ = tx.send(info);
                    break;
                }
            }
        });

        match tokio::time::timeout(timeout, page.goto(url)).await {
            Err(_) => {
                capture.abort();
                tracing::debug!("Navigation to {} produced no response within {:?}", url, timeout);
                return Ok(None);
            }
            Ok(Err(e)) => {
                capture.abort();
                return Err(BrowserError::Navigation {
                    url: url.to_string(),
                    message: e.to_string(),
                });
            }
            Ok(Ok(_)) => {}
        }

        match tokio::time::timeout(RESPONSE_GRACE, rx).await {
            Ok(Ok(info)) => Ok(Some(info)),
            _ => {
                capture.abort();
                tracing::debug!("No document response observed for {}", url);
                Ok(None)
            }
        }
    }

    async fn wait_for_idle(&self, timeout: Duration) {
        let Some(page) = self.page.as_ref() else {
            return;
        };

        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            let state = page
                .evaluate("document.readyState")
                .await
                .ok()
                .and_then(|result| result.value().and_then(Value::as_str).map(str::to_string));

            if state.as_deref() == Some("complete") {
                break;
            }
            if tokio::time::Instant::now() >= deadline {
                tracing::debug!("Page did not settle within {:?}", timeout);
                return;
            }
            tokio::time::sleep(IDLE_POLL_INTERVAL).await;
        }

        tokio::time::sleep(IDLE_SETTLE).await;
    }

    async fn evaluate(&self, script: &str) -> Result<Value, BrowserError> {
        let page = self.page_or("evaluate")?;

        let params = EvaluateParams::builder()
            .expression(script)
            .return_by_value(true)
            .build()
            .map_err(BrowserError::Evaluate)?;

        let result = page
            .evaluate(params)
            .await
            .map_err(|e| BrowserError::Evaluate(e.to_string()))?;

        Ok(result.value().cloned().unwrap_or(Value::Null))
    }

    async fn close(&mut self) {
        if let Some(page) = self.page.take() {
            if let Err(e) = page.close().await {
                tracing::warn!("Failed to close tab: {}", e);
            }
        }
    }
}
