//! Storage module for persisting scan results
//!
//! The crawl core never touches storage; it returns in-memory results. This
//! module is the caller-side recording layer: one `scans` row per scan
//! (created as `pending`, updated through `running` to a terminal status)
//! and one `elements` row per extracted element.

mod schema;

use crate::config::ScanConfig;
use crate::crawler::ScanOutcome;
use crate::extract::{ActionType, ContainerContext, ElementResult, ElementType};
use crate::Result;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::time::Duration;

/// SQLite store for scan records and their extracted elements
pub struct ScanStore {
    conn: Connection,
}

impl ScanStore {
    /// Opens (or creates) the scan database at the given path
    ///
    /// Missing parent directories are created first.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;

        // Configure SQLite for better performance
        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
            PRAGMA temp_store = MEMORY;
            PRAGMA mmap_size = 268435456;
        ",
        )?;

        schema::initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database (for testing)
    #[cfg(test)]
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        schema::initialize_schema(&conn)?;
        Ok(Self { conn })
    }

    /// Records a new scan in `pending` state with its configuration echo
    pub fn create_scan(&mut self, scan_id: &str, domain: &str, config: &ScanConfig) -> Result<()> {
        let now = Utc::now().to_rfc3339();
        let tag_keywords_json = config
            .tag_keywords
            .as_ref()
            .map(|keywords| serde_json::json!(keywords).to_string());

        self.conn.execute(
            "INSERT INTO scans
                (scan_id, domain, scan_url, crawl_date, scan_status,
                 config_max_pages, config_max_depth, config_rate_limit,
                 tag_name, tag_keywords)
             VALUES (?1, ?2, ?3, ?4, 'pending', ?5, ?6, ?7, ?8, ?9)",
            params![
                scan_id,
                domain,
                config.url,
                now,
                config.max_pages,
                config.max_depth,
                config.rate_limit,
                config.tag_name,
                tag_keywords_json,
            ],
        )?;
        Ok(())
    }

    /// Marks a scan as running
    pub fn mark_running(&mut self, scan_id: &str) -> Result<()> {
        self.conn.execute(
            "UPDATE scans SET scan_status = 'running' WHERE scan_id = ?1",
            params![scan_id],
        )?;
        Ok(())
    }

    /// Records a finished crawl: final scan row fields plus every element
    pub fn record_outcome(
        &mut self,
        scan_id: &str,
        outcome: &ScanOutcome,
        duration: Duration,
    ) -> Result<()> {
        let (consent_detected, consent_action, consent_framework) = match &outcome.consent {
            Some(consent) => (
                consent.detected,
                Some(consent.action.as_str()),
                Some(consent.framework.as_str()),
            ),
            None => (false, None, None),
        };

        let analytics_json = if outcome.analytics.is_empty() {
            None
        } else {
            Some(serde_json::json!(outcome.analytics).to_string())
        };

        let duration_seconds = (duration.as_secs_f64() * 100.0).round() / 100.0;

        self.conn.execute(
            "UPDATE scans SET
                scan_status = ?1,
                pages_scanned = ?2,
                total_pages = ?3,
                duration_seconds = ?4,
                scan_quality = ?5,
                consent_detected = ?6,
                consent_action = ?7,
                consent_framework = ?8,
                robots_txt_found = ?9,
                robots_txt_respected = ?10,
                analytics_detected = ?11
             WHERE scan_id = ?12",
            params![
                outcome.status.as_str(),
                outcome.pages.len() as u32,
                outcome.pages.len() as u32,
                duration_seconds,
                outcome.quality().as_str(),
                consent_detected,
                consent_action,
                consent_framework,
                outcome.robots.found,
                true,
                analytics_json,
                scan_id,
            ],
        )?;

        let mut stmt = self.conn.prepare(
            "INSERT INTO elements
                (scan_id, page_url, page_title, element_type, action_type,
                 element_text, css_selector, section_context, container_context,
                 is_above_fold, target_url, is_external, domain_context)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
        )?;

        for page in &outcome.pages {
            for element in &page.elements {
                stmt.execute(params![
                    scan_id,
                    element.page_url,
                    element.page_title,
                    element.element_type.as_str(),
                    element.action_type.map(|a| a.as_str()),
                    element.element_text,
                    element.css_selector,
                    element.section_context,
                    element.container_context.as_str(),
                    element.is_above_fold,
                    element.target_url,
                    element.is_external,
                    element.domain_context,
                ])?;
            }
        }

        Ok(())
    }

    /// Marks a scan as failed with a user-safe note
    ///
    /// Only the first line of the message is kept, capped at 200 characters,
    /// so stack traces and filesystem paths never reach the scan row.
    pub fn record_failure(&mut self, scan_id: &str, message: &str) -> Result<()> {
        let safe_msg: String = message
            .lines()
            .next()
            .unwrap_or("")
            .chars()
            .take(200)
            .collect();

        self.conn.execute(
            "UPDATE scans SET scan_status = 'failed', notes = ?1 WHERE scan_id = ?2",
            params![safe_msg, scan_id],
        )?;
        Ok(())
    }

    /// Loads one scan row, if present
    pub fn get_scan(&self, scan_id: &str) -> Result<Option<ScanRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT scan_id, domain, scan_url, crawl_date, total_pages,
                    pages_scanned, scan_status, scan_quality, consent_detected,
                    consent_action, consent_framework, config_max_pages,
                    config_max_depth, config_rate_limit, robots_txt_found,
                    robots_txt_respected, duration_seconds, notes,
                    analytics_detected, tag_name, tag_keywords
             FROM scans WHERE scan_id = ?1",
        )?;

        let record = stmt
            .query_row(params![scan_id], |row| {
                Ok(ScanRecord {
                    scan_id: row.get(0)?,
                    domain: row.get(1)?,
                    scan_url: row.get(2)?,
                    crawl_date: row.get(3)?,
                    total_pages: row.get(4)?,
                    pages_scanned: row.get(5)?,
                    scan_status: row.get(6)?,
                    scan_quality: row.get(7)?,
                    consent_detected: row.get(8)?,
                    consent_action: row.get(9)?,
                    consent_framework: row.get(10)?,
                    config_max_pages: row.get(11)?,
                    config_max_depth: row.get(12)?,
                    config_rate_limit: row.get(13)?,
                    robots_txt_found: row.get(14)?,
                    robots_txt_respected: row.get(15)?,
                    duration_seconds: row.get(16)?,
                    notes: row.get(17)?,
                    analytics_detected: row
                        .get::<_, Option<String>>(18)?
                        .and_then(|json| serde_json::from_str(&json).ok())
                        .unwrap_or_default(),
                    tag_name: row.get(19)?,
                    tag_keywords: row
                        .get::<_, Option<String>>(20)?
                        .and_then(|json| serde_json::from_str(&json).ok()),
                })
            })
            .optional()?;

        Ok(record)
    }

    /// Loads all elements recorded for a scan, in insertion order
    pub fn load_elements(&self, scan_id: &str) -> Result<Vec<ElementResult>> {
        let mut stmt = self.conn.prepare(
            "SELECT page_url, page_title, element_type, action_type,
                    element_text, css_selector, section_context,
                    container_context, is_above_fold, target_url, is_external,
                    domain_context
             FROM elements WHERE scan_id = ?1 ORDER BY id",
        )?;

        let elements = stmt
            .query_map(params![scan_id], |row| {
                Ok(ElementResult {
                    page_url: row.get(0)?,
                    page_title: row.get(1)?,
                    element_type: ElementType::from_db_string(&row.get::<_, String>(2)?),
                    action_type: row
                        .get::<_, Option<String>>(3)?
                        .as_deref()
                        .and_then(ActionType::from_db_string),
                    element_text: row.get(4)?,
                    css_selector: row.get::<_, Option<String>>(5)?.unwrap_or_default(),
                    section_context: row.get(6)?,
                    container_context: row
                        .get::<_, Option<String>>(7)?
                        .as_deref()
                        .map(ContainerContext::from_db_string)
                        .unwrap_or_default(),
                    is_above_fold: row.get::<_, Option<bool>>(8)?.unwrap_or(false),
                    target_url: row.get(9)?,
                    is_external: row.get::<_, Option<bool>>(10)?.unwrap_or(false),
                    domain_context: row.get(11)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(elements)
    }
}

/// One row of the `scans` table
#[derive(Debug, Clone)]
pub struct ScanRecord {
    pub scan_id: String,
    pub domain: String,
    pub scan_url: String,
    pub crawl_date: String,
    pub total_pages: Option<u32>,
    pub pages_scanned: u32,
    pub scan_status: String,
    pub scan_quality: Option<String>,
    pub consent_detected: bool,
    pub consent_action: Option<String>,
    pub consent_framework: Option<String>,
    pub config_max_pages: Option<u32>,
    pub config_max_depth: Option<u32>,
    pub config_rate_limit: Option<f64>,
    pub robots_txt_found: Option<bool>,
    pub robots_txt_respected: Option<bool>,
    pub duration_seconds: Option<f64>,
    pub notes: Option<String>,
    pub analytics_detected: Vec<String>,
    pub tag_name: String,
    pub tag_keywords: Option<Vec<String>>,
}
