use crate::analytics;
use crate::browser::{Browser, Tab};
use crate::config::{ScanConfig, Settings};
use crate::consent::{self, ConsentResult};
use crate::crawler::types::PageResult;
use crate::extract;
use crate::url::{is_crawlable, normalize_url, DomainKey};

/// In-page script returning every anchor href on the page
pub(crate) const LINKS_JS: &str = r#"(() => {
    const anchors = document.querySelectorAll('a[href]');
    return Array.from(anchors).map(a => a.href).filter(h => h);
})()"#;

/// In-page script returning the document title
pub(crate) const TITLE_JS: &str = "document.title";

/// Everything a single page visit produces
pub(crate) struct PageVisit {
    pub result: PageResult,

    /// Same-domain crawlable links found on the page, normalized
    pub links: Vec<String>,

    /// Set when the consent resolver ran on this page
    pub consent: Option<ConsentResult>,
}

impl PageVisit {
    fn aborted(result: PageResult) -> Self {
        Self {
            result,
            links: Vec::new(),
            consent: None,
        }
    }
}

/// Visits one page in a fresh tab
///
/// Runs the full pipeline: navigate, gate on status/domain/content-type,
/// settle, resolve consent (first page only), extract elements, detect
/// analytics, discover links. Every failure mode produces a [`PageResult`]
/// with `error` set rather than propagating, and the tab is closed on every
/// exit path.
pub(crate) async fn visit_page(
    browser: &dyn Browser,
    base: &DomainKey,
    config: &ScanConfig,
    settings: &Settings,
    url: &str,
    depth: u32,
    handle_consent: bool,
) -> PageVisit {
    let mut tab = match browser.open_tab().await {
        Ok(tab) => tab,
        Err(e) => {
            tracing::warn!("Could not open tab for {}: {}", url, e);
            return PageVisit::aborted(PageResult::failed(url, depth, None, e.to_string()));
        }
    };

    let visit = visit_on_tab(
        tab.as_ref(),
        base,
        config,
        settings,
        url,
        depth,
        handle_consent,
    )
    .await;
    tab.close().await;
    visit
}

async fn visit_on_tab(
    tab: &dyn Tab,
    base: &DomainKey,
    config: &ScanConfig,
    settings: &Settings,
    url: &str,
    depth: u32,
    handle_consent: bool,
) -> PageVisit {
    let nav = match tab.goto(url, settings.navigation_timeout()).await {
        Ok(Some(nav)) => nav,
        Ok(None) => {
            return PageVisit::aborted(PageResult::failed(url, depth, None, "No response"));
        }
        Err(e) => {
            tracing::warn!("Error visiting {}: {}", url, e);
            return PageVisit::aborted(PageResult::failed(url, depth, None, e.to_string()));
        }
    };

    if nav.status >= 400 {
        tracing::info!("Skipping {} (HTTP {})", url, nav.status);
        return PageVisit::aborted(PageResult::failed(
            url,
            depth,
            Some(nav.status),
            format!("HTTP {}", nav.status),
        ));
    }

    if !base.matches(&nav.final_url) {
        tracing::info!("Skipping {} (redirected to {})", url, nav.final_url);
        return PageVisit::aborted(PageResult::failed(
            url,
            depth,
            Some(nav.status),
            format!("Redirected off-domain to {}", nav.final_url),
        ));
    }

    if let Some(content_type) = nav.content_type.as_deref() {
        if !content_type.to_lowercase().contains("html") {
            tracing::info!("Skipping {} (content-type: {})", url, content_type);
            return PageVisit::aborted(PageResult::failed(
                url,
                depth,
                Some(nav.status),
                format!("Non-HTML content: {}", content_type),
            ));
        }
    }

    tab.wait_for_idle(settings.network_idle_timeout()).await;

    let title = fetch_title(tab).await;

    let consent = if handle_consent {
        let result = consent::resolve(tab, settings).await;
        if result.detected {
            tracing::info!(
                "Consent: detected={}, action={}, framework={}",
                result.detected,
                result.action,
                result.framework
            );
        }
        Some(result)
    } else {
        None
    };

    let elements = extract::extract_elements(
        tab,
        url,
        title.as_deref(),
        &config.tag_name,
        config.tag_keywords.as_deref(),
    )
    .await;

    let analytics = analytics::detect_analytics(tab).await;

    let links = if depth < config.max_depth {
        discover_links(tab, base).await
    } else {
        Vec::new()
    };

    PageVisit {
        result: PageResult {
            url: url.to_string(),
            title,
            status_code: Some(nav.status),
            depth,
            elements,
            analytics,
            error: None,
        },
        links,
        consent,
    }
}

async fn fetch_title(tab: &dyn Tab) -> Option<String> {
    match tab.evaluate(TITLE_JS).await {
        Ok(value) => value
            .as_str()
            .filter(|title| !title.is_empty())
            .map(str::to_string),
        Err(e) => {
            tracing::debug!("Title lookup failed: {}", e);
            None
        }
    }
}

/// Collects same-domain crawlable links from the page, normalized
async fn discover_links(tab: &dyn Tab, base: &DomainKey) -> Vec<String> {
    let value = match tab.evaluate(LINKS_JS).await {
        Ok(value) => value,
        Err(e) => {
            tracing::debug!("Link discovery failed: {}", e);
            return Vec::new();
        }
    };
    let hrefs = match value.as_array() {
        Some(hrefs) => hrefs,
        None => return Vec::new(),
    };
    hrefs
        .iter()
        .filter_map(|href| href.as_str())
        .map(normalize_url)
        .filter(|link| is_crawlable(link, base))
        .collect()
}
