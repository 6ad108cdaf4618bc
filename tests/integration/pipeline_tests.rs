//! Record-and-export pipeline tests using a real database file

use std::time::Duration;
use tapmap::config::ScanConfig;
use tapmap::consent::{ConsentAction, ConsentFramework, ConsentResult};
use tapmap::crawler::{PageResult, ScanOutcome, ScanStatus};
use tapmap::export::{dedup_rows, write_csv, CSV_COLUMNS};
use tapmap::extract::{ActionType, ContainerContext, ElementResult, ElementType};
use tapmap::robots::RobotsResult;
use tapmap::storage::ScanStore;

const UA: &str = "TapMap/1.0 (internal pharma audit tool)";

fn element(page_url: &str, text: &str, selector: &str, target: Option<&str>) -> ElementResult {
    ElementResult {
        page_url: page_url.to_string(),
        page_title: Some("Sample Page".to_string()),
        element_type: ElementType::Link,
        action_type: Some(ActionType::Navigate),
        element_text: Some(text.to_string()),
        css_selector: selector.to_string(),
        section_context: Some("Products".to_string()),
        container_context: ContainerContext::Nav,
        is_above_fold: true,
        target_url: target.map(str::to_string),
        is_external: false,
        domain_context: None,
    }
}

fn page(url: &str, depth: u32, elements: Vec<ElementResult>) -> PageResult {
    PageResult {
        url: url.to_string(),
        title: Some("Sample Page".to_string()),
        status_code: Some(200),
        depth,
        elements,
        analytics: Vec::new(),
        error: None,
    }
}

fn completed_outcome(pages: Vec<PageResult>) -> ScanOutcome {
    ScanOutcome {
        status: ScanStatus::Completed,
        pages,
        consent: Some(ConsentResult {
            detected: true,
            action: ConsentAction::AcceptAll,
            framework: ConsentFramework::OneTrust,
            notes: None,
        }),
        analytics: vec!["GA4".to_string(), "GTM".to_string()],
        robots: RobotsResult::from_content("User-agent: *\nAllow: /", UA, "https://example.com/"),
    }
}

#[test]
fn test_scan_lifecycle_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("data").join("scans.db");

    let config = ScanConfig::new("https://example.com")
        .with_max_pages(40)
        .with_max_depth(3)
        .with_rate_limit(2.0)
        .effective();

    let mut store = ScanStore::open(&db_path).unwrap();
    store.create_scan("scan_a", "example.com", &config).unwrap();
    store.mark_running("scan_a").unwrap();

    let outcome = completed_outcome(vec![
        page(
            "https://example.com",
            0,
            vec![
                element("https://example.com", "About us", "nav > a:nth-of-type(1)", Some("https://example.com/about")),
                element("https://example.com", "Contact", "nav > a:nth-of-type(2)", Some("https://example.com/contact")),
            ],
        ),
        page(
            "https://example.com/about",
            1,
            vec![element("https://example.com/about", "Careers", "main a", Some("https://example.com/careers"))],
        ),
    ]);
    store
        .record_outcome("scan_a", &outcome, Duration::from_millis(12_340))
        .unwrap();

    let record = store.get_scan("scan_a").unwrap().unwrap();
    assert_eq!(record.scan_status, "completed");
    assert_eq!(record.scan_quality.as_deref(), Some("clean"));
    assert_eq!(record.pages_scanned, 2);
    assert_eq!(record.total_pages, Some(2));
    assert_eq!(record.config_max_pages, Some(40));
    assert_eq!(record.config_max_depth, Some(3));
    assert_eq!(record.config_rate_limit, Some(2.0));
    assert!(record.consent_detected);
    assert_eq!(record.consent_action.as_deref(), Some("accept_all"));
    assert_eq!(record.consent_framework.as_deref(), Some("onetrust"));
    assert_eq!(record.robots_txt_found, Some(true));
    assert_eq!(record.robots_txt_respected, Some(true));
    assert_eq!(record.duration_seconds, Some(12.34));
    assert_eq!(record.analytics_detected, vec!["GA4", "GTM"]);
    assert_eq!(record.tag_name, "Pharma");

    let elements = store.load_elements("scan_a").unwrap();
    assert_eq!(elements.len(), 3);
    assert_eq!(elements[0].element_text.as_deref(), Some("About us"));
    assert_eq!(elements[2].page_url, "https://example.com/about");
}

#[test]
fn test_failed_scan_keeps_auditable_row() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("scans.db");

    let config = ScanConfig::new("https://example.com").effective();
    let mut store = ScanStore::open(&db_path).unwrap();
    store.create_scan("scan_b", "example.com", &config).unwrap();
    store.mark_running("scan_b").unwrap();
    store
        .record_failure("scan_b", "Browser error: failed to launch\nat /usr/lib/chromium")
        .unwrap();

    let record = store.get_scan("scan_b").unwrap().unwrap();
    assert_eq!(record.scan_status, "failed");
    assert_eq!(record.notes.as_deref(), Some("Browser error: failed to launch"));
    assert_eq!(record.pages_scanned, 0);
    assert!(record.scan_quality.is_none());
}

#[test]
fn test_exported_csv_matches_stored_elements() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("scans.db");
    let csv_path = dir.path().join("elements.csv");

    let config = ScanConfig::new("https://example.com").effective();
    let mut store = ScanStore::open(&db_path).unwrap();
    store.create_scan("scan_c", "example.com", &config).unwrap();

    let outcome = completed_outcome(vec![page(
        "https://example.com",
        0,
        vec![
            element("https://example.com", "Prescribing Info", "footer a", Some("https://example.com/pi.html")),
            element("https://example.com", "Contact", "nav a", None),
        ],
    )]);
    store
        .record_outcome("scan_c", &outcome, Duration::from_secs(3))
        .unwrap();

    let elements = store.load_elements("scan_c").unwrap();
    write_csv(&csv_path, &elements).unwrap();

    let mut reader = csv::Reader::from_path(&csv_path).unwrap();
    let headers = reader.headers().unwrap().clone();
    assert_eq!(headers.iter().collect::<Vec<_>>(), CSV_COLUMNS.to_vec());

    let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
    assert_eq!(rows.len(), 2);
    assert_eq!(&rows[0][4], "Prescribing Info");
    assert_eq!(&rows[0][8], "Yes");
    // Missing target renders as an empty cell
    assert_eq!(&rows[1][9], "");
}

#[test]
fn test_dedup_collapses_sitewide_nav() {
    // The same nav link appears on every page; dedup keeps one row
    let nav = |page_url: &str| element(page_url, "Home", "nav > a.home", Some("https://example.com"));
    let outcome = completed_outcome(vec![
        page("https://example.com", 0, vec![nav("https://example.com")]),
        page("https://example.com/a", 1, vec![nav("https://example.com/a")]),
        page("https://example.com/b", 1, vec![nav("https://example.com/b")]),
    ]);

    let all: Vec<ElementResult> = outcome
        .pages
        .iter()
        .flat_map(|p| p.elements.iter().cloned())
        .collect();
    assert_eq!(all.len(), 3);

    let rows = dedup_rows(&all);
    assert_eq!(rows.len(), 1);
    // First occurrence wins, so the row carries the first page's URL
    assert_eq!(rows[0].page_url, "https://example.com");
}
