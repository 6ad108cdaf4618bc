use crate::consent::{ConsentAction, ConsentResult};
use crate::extract::ElementResult;
use crate::robots::RobotsResult;

/// Terminal (or in-flight) state of a scan
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanStatus {
    Running,
    Completed,
    Timeout,
    BlockedByRobots,
}

impl ScanStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScanStatus::Running => "running",
            ScanStatus::Completed => "completed",
            ScanStatus::Timeout => "timeout",
            ScanStatus::BlockedByRobots => "blocked_by_robots",
        }
    }
}

impl std::fmt::Display for ScanStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How trustworthy the scan's view of the site was
///
/// Derived from the consent outcome: a banner that could not be dismissed
/// hides content, and CSS surgery may have left the page in an unnatural
/// state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanQuality {
    Clean,
    PartialConsent,
    BlockedByConsent,
}

impl ScanQuality {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScanQuality::Clean => "clean",
            ScanQuality::PartialConsent => "partial_consent",
            ScanQuality::BlockedByConsent => "blocked_by_consent",
        }
    }
}

impl std::fmt::Display for ScanQuality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Live view of a crawl, updated by the engine as it works
#[derive(Debug, Clone)]
pub struct CrawlProgress {
    pub scan_id: String,
    pub pages_scanned: usize,
    pub total_pages_found: usize,
    pub current_url: Option<String>,
    pub status: ScanStatus,
}

impl CrawlProgress {
    pub(crate) fn new() -> Self {
        Self {
            scan_id: String::new(),
            pages_scanned: 0,
            total_pages_found: 0,
            current_url: None,
            status: ScanStatus::Running,
        }
    }
}

/// What one page visit produced
///
/// A page that failed to load still yields a result, with `error` set and
/// no elements; error pages count against the page cap.
#[derive(Debug, Clone)]
pub struct PageResult {
    /// Normalized URL that was visited
    pub url: String,

    /// Document title, when the page had a non-empty one
    pub title: Option<String>,

    /// HTTP status of the document response, when one arrived
    pub status_code: Option<u16>,

    /// Link depth from the seed
    pub depth: u32,

    /// Interactive elements extracted from the page
    pub elements: Vec<ElementResult>,

    /// Analytics platforms detected on the page
    pub analytics: Vec<String>,

    /// Why the page contributed nothing, when it didn't
    pub error: Option<String>,
}

impl PageResult {
    pub(crate) fn failed(
        url: impl Into<String>,
        depth: u32,
        status_code: Option<u16>,
        error: impl Into<String>,
    ) -> Self {
        Self {
            url: url.into(),
            title: None,
            status_code,
            depth,
            elements: Vec::new(),
            analytics: Vec::new(),
            error: Some(error.into()),
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

/// Complete result of one crawl
#[derive(Debug, Clone)]
pub struct ScanOutcome {
    /// How the crawl ended
    pub status: ScanStatus,

    /// Per-page results, in visit order
    pub pages: Vec<PageResult>,

    /// Consent outcome from the first successfully loaded page
    pub consent: Option<ConsentResult>,

    /// Union of analytics platforms across all pages, sorted
    pub analytics: Vec<String>,

    /// What the robots.txt gate saw
    pub robots: RobotsResult,
}

impl ScanOutcome {
    pub fn total_elements(&self) -> usize {
        self.pages.iter().map(|p| p.elements.len()).sum()
    }

    pub fn error_page_count(&self) -> usize {
        self.pages.iter().filter(|p| p.is_error()).count()
    }

    pub fn quality(&self) -> ScanQuality {
        match self.consent.as_ref().map(|c| c.action) {
            Some(ConsentAction::Failed) => ScanQuality::BlockedByConsent,
            Some(ConsentAction::BypassCss) => ScanQuality::PartialConsent,
            _ => ScanQuality::Clean,
        }
    }
}

/// Builds a scan identifier: UTC timestamp plus a sanitized domain
///
/// Every character outside `[A-Za-z0-9_-]` becomes `_`, and the domain part
/// is capped at 60 characters, so the id is always filesystem- and
/// URL-safe.
pub fn generate_scan_id(domain: &str) -> String {
    let timestamp = chrono::Utc::now().format("%Y%m%d_%H%M%S");
    let safe_domain: String = domain
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .take(60)
        .collect();
    format!("{}_{}", timestamp, safe_domain)
}
