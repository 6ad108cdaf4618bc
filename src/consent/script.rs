//! Scripts and selector tables for the consent resolver
//!
//! Each strategy is a single self-contained script evaluated in the page, so
//! one round trip decides it. The selector and phrase tables are serialized
//! into the script source as JSON arrays.

use crate::consent::ConsentFramework;

/// DOM footprints of known consent platforms, checked in order
pub(crate) const FRAMEWORK_SIGNATURES: &[(ConsentFramework, &str)] = &[
    (
        ConsentFramework::OneTrust,
        "#onetrust-banner-sdk, .onetrust-pc-dark-filter, #ot-sdk-btn",
    ),
    (
        ConsentFramework::TrustArc,
        "#truste-consent-track, .truste_overlay, #consent_blackbar",
    ),
    (
        ConsentFramework::Cookiebot,
        "#CybotCookiebotDialog, .CybotCookiebotDialogActive",
    ),
    (
        ConsentFramework::Evidon,
        "#_evidon_banner, #_evidon-barrier-wrapper",
    ),
    (
        ConsentFramework::Quantcast,
        ".qc-cmp2-container, #qc-cmp2-ui",
    ),
    (
        ConsentFramework::Didomi,
        "#didomi-host, .didomi-popup-container",
    ),
];

/// Containers checked for visibility when probing for a banner
pub(crate) const BANNER_PROBE_SELECTORS: &[&str] = &[
    "#onetrust-banner-sdk",
    "#truste-consent-track",
    "#CybotCookiebotDialog",
    "#_evidon_banner",
    ".qc-cmp2-container",
    "#didomi-host",
    "[class*=\"cookie-banner\"]",
    "[class*=\"consent-banner\"]",
    "[class*=\"cookie-notice\"]",
    "[id*=\"cookie-banner\"]",
    "[id*=\"consent-banner\"]",
    "[id*=\"gdpr\"]",
];

/// Accept-button selectors, platform-specific first
pub(crate) const ACCEPT_SELECTORS: &[&str] = &[
    "#onetrust-accept-btn-handler",
    "#truste-consent-button",
    "#CybotCookiebotDialogBodyLevelButtonLevelOptinAllowAll",
    "#CybotCookiebotDialogBodyButtonAccept",
    ".qc-cmp2-summary-buttons button:first-child",
    "#didomi-notice-agree-button",
    "#accept-all-cookies",
    "#accept-cookies",
    "#cookie-accept",
    "button[id*=\"accept\" i]",
    "button[id*=\"agree\" i]",
    "a[id*=\"accept\" i]",
];

/// Phrases matched against clickable text when no accept selector hits
pub(crate) const ACCEPT_TEXT_PATTERNS: &[&str] = &[
    "accept all",
    "accept cookies",
    "accept",
    "i agree",
    "agree",
    "allow all",
    "allow cookies",
    "got it",
    "ok",
    "continue",
    "i understand",
];

/// Close/dismiss selectors, tried after accept strategies fail
pub(crate) const CLOSE_SELECTORS: &[&str] = &[
    "#onetrust-close-btn-container button",
    ".onetrust-close-btn-handler",
    "#truste-consent-close",
    "button[aria-label=\"Close\"]",
    "button[aria-label=\"close\"]",
    "button[aria-label=\"Dismiss\"]",
    ".cookie-banner-close",
    ".consent-close",
    "button.close[data-dismiss]",
];

pub(crate) const CLOSE_TEXT_PATTERNS: &[&str] = &[
    "close",
    "dismiss",
    "no thanks",
    "maybe later",
    "continue without",
    "x",
];

const BANNER_PROBE_TEMPLATE: &str = r#"(() => {
    const selectors = __SELECTORS__;
    for (const sel of selectors) {
        const el = document.querySelector(sel);
        if (el) {
            const style = window.getComputedStyle(el);
            if (style.display !== 'none' &&
                style.visibility !== 'hidden' &&
                parseFloat(style.opacity) > 0) {
                return true;
            }
        }
    }

    // Fallback: fixed-position elements talking about cookies or privacy,
    // short enough to be a banner rather than page content
    const fixed = document.querySelectorAll('[style*="position: fixed"], [style*="position:fixed"]');
    for (const el of fixed) {
        const text = (el.innerText || '').toLowerCase();
        if (text.includes('cookie') || text.includes('consent') || text.includes('privacy')) {
            if (text.length < 2000) return true;
        }
    }

    return false;
})()"#;

const FRAMEWORK_TEMPLATE: &str = r#"(() => {
    const signatures = __SIGNATURES__;
    for (const [name, selector] of signatures) {
        try {
            if (document.querySelector(selector)) return name;
        } catch (e) {
            continue;
        }
    }
    return null;
})()"#;

const CLICK_SELECTORS_TEMPLATE: &str = r#"(() => {
    const selectors = __SELECTORS__;
    const visible = (el) => {
        const style = window.getComputedStyle(el);
        if (style.display === 'none' ||
            style.visibility === 'hidden' ||
            parseFloat(style.opacity) === 0) {
            return false;
        }
        const rect = el.getBoundingClientRect();
        return rect.width > 0 && rect.height > 0;
    };
    for (const sel of selectors) {
        try {
            const el = document.querySelector(sel);
            if (el && visible(el)) {
                el.click();
                return true;
            }
        } catch (e) {
            continue;
        }
    }
    return false;
})()"#;

const CLICK_TEXT_TEMPLATE: &str = r#"(() => {
    const phrases = __PHRASES__;
    const visible = (el) => {
        const style = window.getComputedStyle(el);
        if (style.display === 'none' ||
            style.visibility === 'hidden' ||
            parseFloat(style.opacity) === 0) {
            return false;
        }
        const rect = el.getBoundingClientRect();
        return rect.width > 0 && rect.height > 0;
    };
    for (const phrase of phrases) {
        const matches = [];
        for (const el of document.querySelectorAll('button, a, span, div')) {
            const text = (el.innerText || '').trim().toLowerCase();
            if (text.includes(phrase)) {
                matches.push(el);
                if (matches.length >= 3) break;
            }
        }
        for (const el of matches) {
            if (!visible(el)) continue;
            const rect = el.getBoundingClientRect();
            // Tiny targets are unlikely to be consent buttons
            if (rect.width > 30 && rect.height > 15) {
                el.click();
                return true;
            }
        }
    }
    return false;
})()"#;

/// Last-resort overlay removal; returns the number of elements removed
pub(crate) const DOM_BYPASS_JS: &str = r#"(() => {
    let removed = 0;

    for (const el of document.querySelectorAll('div, aside, section')) {
        const style = window.getComputedStyle(el);
        const zIndex = parseInt(style.zIndex);
        if (zIndex > 9000 && style.position === 'fixed') {
            el.remove();
            removed++;
        }
    }

    document.body.style.overflow = 'auto';
    document.documentElement.style.overflow = 'auto';

    const overlays = document.querySelectorAll(
        '.modal-backdrop, .overlay, [class*="overlay"], [class*="backdrop"]'
    );
    overlays.forEach(el => {
        if (window.getComputedStyle(el).position === 'fixed') {
            el.remove();
            removed++;
        }
    });

    return removed;
})()"#;

/// Returns true when a consent banner is currently visible
pub(crate) fn banner_probe_script() -> String {
    BANNER_PROBE_TEMPLATE.replace(
        "__SELECTORS__",
        &serde_json::json!(BANNER_PROBE_SELECTORS).to_string(),
    )
}

/// Returns the name of the consent platform present, or null
pub(crate) fn framework_script() -> String {
    let signatures: Vec<(&str, &str)> = FRAMEWORK_SIGNATURES
        .iter()
        .map(|(framework, selector)| (framework.as_str(), *selector))
        .collect();
    FRAMEWORK_TEMPLATE.replace("__SIGNATURES__", &serde_json::json!(signatures).to_string())
}

/// Clicks the first visible element matching any selector; returns whether
/// a click happened
pub(crate) fn click_selectors_script(selectors: &[&str]) -> String {
    CLICK_SELECTORS_TEMPLATE.replace("__SELECTORS__", &serde_json::json!(selectors).to_string())
}

/// Clicks the first visible, adequately sized element whose text contains
/// any phrase, trying at most the first three matches per phrase
pub(crate) fn click_text_script(phrases: &[&str]) -> String {
    CLICK_TEXT_TEMPLATE.replace("__PHRASES__", &serde_json::json!(phrases).to_string())
}
