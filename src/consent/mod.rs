//! Consent banner detection and dismissal
//!
//! Runs once per crawl, on the first page that loads successfully. The
//! resolver waits for late-loading banners, probes for a visible one, names
//! the consent platform when it can, then walks a fixed cascade of dismissal
//! strategies: accept clicks by selector, accept clicks by text, close
//! clicks by selector, close clicks by text, and finally removing the
//! overlay from the DOM. Every step is best-effort; the resolver records
//! what happened but never fails the crawl.

pub(crate) mod script;

use crate::browser::Tab;
use crate::config::Settings;
use std::fmt;

/// How the resolver dealt with a banner
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsentAction {
    /// An accept/agree control was clicked
    AcceptAll,
    /// A close/dismiss control was clicked
    Close,
    /// The overlay was removed from the DOM directly
    BypassCss,
    /// No banner was detected, nothing to do
    None,
    /// A banner was detected but every strategy failed
    Failed,
}

impl ConsentAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConsentAction::AcceptAll => "accept_all",
            ConsentAction::Close => "close",
            ConsentAction::BypassCss => "bypass_css",
            ConsentAction::None => "none",
            ConsentAction::Failed => "failed",
        }
    }
}

impl fmt::Display for ConsentAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Consent platforms the resolver can recognize by their DOM footprint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsentFramework {
    OneTrust,
    TrustArc,
    Cookiebot,
    Evidon,
    Quantcast,
    Didomi,
    Unknown,
}

impl ConsentFramework {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConsentFramework::OneTrust => "onetrust",
            ConsentFramework::TrustArc => "trustarc",
            ConsentFramework::Cookiebot => "cookiebot",
            ConsentFramework::Evidon => "evidon",
            ConsentFramework::Quantcast => "quantcast",
            ConsentFramework::Didomi => "didomi",
            ConsentFramework::Unknown => "unknown",
        }
    }

    /// Maps a platform name back to its variant, defaulting to `Unknown`
    pub fn from_name(name: &str) -> Self {
        match name {
            "onetrust" => ConsentFramework::OneTrust,
            "trustarc" => ConsentFramework::TrustArc,
            "cookiebot" => ConsentFramework::Cookiebot,
            "evidon" => ConsentFramework::Evidon,
            "quantcast" => ConsentFramework::Quantcast,
            "didomi" => ConsentFramework::Didomi,
            _ => ConsentFramework::Unknown,
        }
    }
}

impl fmt::Display for ConsentFramework {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// What the consent step observed and did
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsentResult {
    /// Whether a visible banner was found
    pub detected: bool,

    /// The dismissal outcome
    pub action: ConsentAction,

    /// The platform behind the banner, when recognizable
    pub framework: ConsentFramework,

    /// Free-form detail for the audit trail
    pub notes: Option<String>,
}

impl ConsentResult {
    fn not_detected() -> Self {
        Self {
            detected: false,
            action: ConsentAction::None,
            framework: ConsentFramework::Unknown,
            notes: None,
        }
    }

    fn dismissed(action: ConsentAction, framework: ConsentFramework) -> Self {
        Self {
            detected: true,
            action,
            framework,
            notes: None,
        }
    }
}

/// Detects and attempts to dismiss a consent banner on the current page
///
/// Strategies run in priority order and the first one that works wins:
/// accepting is preferred over closing, closing over DOM surgery. When all
/// five fail the result records `action = failed` so the scan can be flagged
/// as consent-blocked.
pub async fn resolve(tab: &dyn Tab, settings: &Settings) -> ConsentResult {
    // Banners often arrive after the load event; give them a moment
    tokio::time::sleep(settings.consent_settle()).await;

    if !evaluate_bool(tab, &script::banner_probe_script()).await {
        return ConsentResult::not_detected();
    }
    tracing::info!("Consent banner detected");

    let framework = detect_framework(tab).await;
    tracing::info!("Consent framework: {}", framework);

    if evaluate_bool(tab, &script::click_selectors_script(script::ACCEPT_SELECTORS)).await {
        tokio::time::sleep(settings.click_settle()).await;
        tracing::info!("Consent dismissed via accept selector");
        return ConsentResult::dismissed(ConsentAction::AcceptAll, framework);
    }

    if evaluate_bool(tab, &script::click_text_script(script::ACCEPT_TEXT_PATTERNS)).await {
        tokio::time::sleep(settings.click_settle()).await;
        tracing::info!("Consent dismissed via accept text match");
        return ConsentResult::dismissed(ConsentAction::AcceptAll, framework);
    }

    if evaluate_bool(tab, &script::click_selectors_script(script::CLOSE_SELECTORS)).await {
        tokio::time::sleep(settings.click_settle()).await;
        tracing::info!("Consent dismissed via close selector");
        return ConsentResult::dismissed(ConsentAction::Close, framework);
    }

    if evaluate_bool(tab, &script::click_text_script(script::CLOSE_TEXT_PATTERNS)).await {
        tokio::time::sleep(settings.click_settle()).await;
        tracing::info!("Consent dismissed via close text match");
        return ConsentResult::dismissed(ConsentAction::Close, framework);
    }

    if bypass_dom(tab).await {
        tracing::info!("Consent bypassed via DOM removal");
        return ConsentResult {
            detected: true,
            action: ConsentAction::BypassCss,
            framework,
            notes: Some("Overlay removed via DOM manipulation".to_string()),
        };
    }

    tracing::warn!("Failed to dismiss consent banner");
    ConsentResult {
        detected: true,
        action: ConsentAction::Failed,
        framework,
        notes: Some("All dismissal strategies exhausted".to_string()),
    }
}

/// Identifies the consent platform from its container elements
async fn detect_framework(tab: &dyn Tab) -> ConsentFramework {
    match tab.evaluate(&script::framework_script()).await {
        Ok(value) => value
            .as_str()
            .map(ConsentFramework::from_name)
            .unwrap_or(ConsentFramework::Unknown),
        Err(e) => {
            tracing::debug!("Framework detection failed: {}", e);
            ConsentFramework::Unknown
        }
    }
}

async fn bypass_dom(tab: &dyn Tab) -> bool {
    match tab.evaluate(script::DOM_BYPASS_JS).await {
        Ok(value) => value.as_u64().unwrap_or(0) > 0,
        Err(e) => {
            tracing::debug!("DOM bypass failed: {}", e);
            false
        }
    }
}

/// Runs a strategy script; anything but an explicit `true` counts as a miss
async fn evaluate_bool(tab: &dyn Tab, script: &str) -> bool {
    match tab.evaluate(script).await {
        Ok(value) => value.as_bool().unwrap_or(false),
        Err(e) => {
            tracing::debug!("Consent strategy script failed: {}", e);
            false
        }
    }
}
