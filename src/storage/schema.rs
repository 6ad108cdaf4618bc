//! Database schema definitions
//!
//! This module contains the SQL schema for the tapmap scan database.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- One row per scan, from creation through its terminal status
CREATE TABLE IF NOT EXISTS scans (
    scan_id TEXT PRIMARY KEY,
    domain TEXT NOT NULL,
    scan_url TEXT NOT NULL,
    crawl_date TEXT NOT NULL,
    total_pages INTEGER,
    pages_scanned INTEGER DEFAULT 0,
    scan_status TEXT NOT NULL DEFAULT 'pending',
    scan_quality TEXT,
    consent_detected INTEGER DEFAULT 0,
    consent_action TEXT,
    consent_framework TEXT,
    config_max_pages INTEGER,
    config_max_depth INTEGER,
    config_rate_limit REAL,
    robots_txt_found INTEGER,
    robots_txt_respected INTEGER,
    duration_seconds REAL,
    notes TEXT,
    analytics_detected TEXT,
    tag_name TEXT DEFAULT 'Pharma',
    tag_keywords TEXT
);

CREATE INDEX IF NOT EXISTS idx_scans_domain ON scans(domain);
CREATE INDEX IF NOT EXISTS idx_scans_status ON scans(scan_status);

-- Every extracted interactive element, one row each
CREATE TABLE IF NOT EXISTS elements (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    scan_id TEXT NOT NULL REFERENCES scans(scan_id),
    page_url TEXT NOT NULL,
    page_title TEXT,
    element_type TEXT NOT NULL,
    action_type TEXT,
    element_text TEXT,
    css_selector TEXT,
    section_context TEXT,
    container_context TEXT,
    is_above_fold INTEGER,
    target_url TEXT,
    is_external INTEGER,
    domain_context TEXT
);

CREATE INDEX IF NOT EXISTS idx_elements_scan_id ON elements(scan_id);
"#;

/// Initializes the database schema
///
/// # Arguments
///
/// * `conn` - The database connection
///
/// # Returns
///
/// * `Ok(())` - Schema initialized successfully
/// * `Err(rusqlite::Error)` - Failed to initialize schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}
