//! Analytics platform detection
//!
//! Recognizes tag managers and analytics tools by the global JavaScript
//! objects they install. One script checks every signature in a single
//! evaluation; a page where the script fails simply reports nothing.

use crate::browser::Tab;
use std::collections::BTreeSet;

/// Probes the page's window globals; returns an array of platform names
pub const DETECTION_JS: &str = r#"(() => {
    const detected = [];
    try { if (window.dataLayer && Array.isArray(window.dataLayer)) detected.push('GTM'); } catch (e) {}
    try { if (window._satellite && typeof window._satellite.getVar === 'function') detected.push('Adobe Launch'); } catch (e) {}
    try { if (window.utag) detected.push('Tealium'); } catch (e) {}
    try { if (window.analytics && typeof window.analytics.track === 'function') detected.push('Segment'); } catch (e) {}
    try { if (typeof window.gtag === 'function') detected.push('GA4'); } catch (e) {}
    try { if (window.s && typeof window.s.t === 'function') detected.push('Adobe Analytics'); } catch (e) {}
    try { if (typeof window.hj === 'function') detected.push('Hotjar'); } catch (e) {}
    return detected;
})()"#;

/// Detects analytics platforms on the current page
///
/// Returns platform names in signature order, deduplicated. Detection is
/// best-effort: any failure yields an empty list.
pub async fn detect_analytics(tab: &dyn Tab) -> Vec<String> {
    let value = match tab.evaluate(DETECTION_JS).await {
        Ok(value) => value,
        Err(e) => {
            tracing::debug!("Analytics detection failed: {}", e);
            return Vec::new();
        }
    };

    let names = match value.as_array() {
        Some(items) => items,
        None => return Vec::new(),
    };

    let mut detected = Vec::new();
    for name in names.iter().filter_map(|v| v.as_str()) {
        if !detected.iter().any(|seen| seen == name) {
            detected.push(name.to_string());
        }
    }
    if !detected.is_empty() {
        tracing::debug!("Analytics detected: {:?}", detected);
    }
    detected
}

/// Merges per-page detections into a sorted, deduplicated union
pub fn union_frameworks<'a>(detections: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let set: BTreeSet<&str> = detections.into_iter().collect();
    set.into_iter().map(str::to_string).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browser::fake::{FakeLauncher, FakePage, FakeSite};
    use crate::browser::{Browser, BrowserLauncher};
    use serde_json::json;
    use std::time::Duration;

    async fn detect_on(page: FakePage) -> Vec<String> {
        let url = "https://example.com/";
        let launcher = FakeLauncher::new(FakeSite::new().page(url, page));
        let browser = launcher.launch().await.unwrap();
        let tab = browser.open_tab().await.unwrap();
        tab.goto(url, Duration::from_secs(5)).await.unwrap();
        detect_analytics(tab.as_ref()).await
    }

    #[tokio::test]
    async fn test_detects_reported_platforms() {
        let page = FakePage::html("https://example.com/")
            .with_eval(DETECTION_JS, json!(["GTM", "GA4"]));
        assert_eq!(detect_on(page).await, vec!["GTM", "GA4"]);
    }

    #[tokio::test]
    async fn test_duplicates_collapsed() {
        let page = FakePage::html("https://example.com/")
            .with_eval(DETECTION_JS, json!(["GTM", "GTM", "Hotjar"]));
        assert_eq!(detect_on(page).await, vec!["GTM", "Hotjar"]);
    }

    #[tokio::test]
    async fn test_unanswered_page_reports_nothing() {
        assert!(detect_on(FakePage::html("https://example.com/")).await.is_empty());
    }

    #[tokio::test]
    async fn test_non_array_output_reports_nothing() {
        let page = FakePage::html("https://example.com/")
            .with_eval(DETECTION_JS, json!("GTM"));
        assert!(detect_on(page).await.is_empty());
    }

    #[test]
    fn test_union_sorted_and_deduplicated() {
        let page_a = vec!["GTM".to_string(), "GA4".to_string()];
        let page_b = vec!["Adobe Analytics".to_string(), "GTM".to_string()];
        let union = union_frameworks(
            page_a.iter().map(String::as_str).chain(page_b.iter().map(String::as_str)),
        );
        assert_eq!(union, vec!["Adobe Analytics", "GA4", "GTM"]);
    }

    #[test]
    fn test_union_of_nothing_is_empty() {
        assert!(union_frameworks(std::iter::empty()).is_empty());
    }
}
