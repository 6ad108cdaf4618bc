//! CSV rendering of extracted elements
//!
//! One row per element, in scan order. An optional dedup pass collapses
//! rows that repeat across pages (site-wide navigation, footers) so the
//! export reads as an inventory of distinct interaction points rather than
//! a page-by-page dump.

use crate::extract::ElementResult;
use crate::Result;
use std::collections::HashSet;
use std::fs::File;
use std::path::Path;

/// Column headers, in output order
pub const CSV_COLUMNS: [&str; 12] = [
    "Page URL",
    "Page Title",
    "Element Type",
    "Action Type",
    "Element Text",
    "CSS Selector",
    "Section Context",
    "Container",
    "Above Fold",
    "Target URL",
    "External",
    "Domain Context",
];

/// Writes elements to a CSV file at `path`
pub fn write_csv(path: &Path, elements: &[ElementResult]) -> Result<()> {
    let file = File::create(path)?;
    let mut writer = csv::Writer::from_writer(file);
    writer.write_record(CSV_COLUMNS)?;

    for element in elements {
        writer.write_record([
            element.page_url.as_str(),
            element.page_title.as_deref().unwrap_or(""),
            element.element_type.as_str(),
            element.action_type.map(|a| a.as_str()).unwrap_or(""),
            element.element_text.as_deref().unwrap_or(""),
            element.css_selector.as_str(),
            element.section_context.as_deref().unwrap_or(""),
            element.container_context.as_str(),
            yes_no(element.is_above_fold),
            element.target_url.as_deref().unwrap_or(""),
            yes_no(element.is_external),
            element.domain_context.as_deref().unwrap_or(""),
        ])?;
    }

    writer.flush()?;
    Ok(())
}

/// Collapses rows that repeat across pages
///
/// Identity is `(element_text, css_selector, target_url)` with missing
/// values treated as empty strings; the first occurrence wins and row order
/// is otherwise preserved. This is distinct from the in-page
/// `(element_type, css_selector)` dedup applied during extraction.
pub fn dedup_rows(elements: &[ElementResult]) -> Vec<ElementResult> {
    let mut seen = HashSet::new();
    let mut rows = Vec::new();

    for element in elements {
        let key = (
            element.element_text.as_deref().unwrap_or(""),
            element.css_selector.as_str(),
            element.target_url.as_deref().unwrap_or(""),
        );
        if seen.insert(key) {
            rows.push(element.clone());
        }
    }

    rows
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "Yes"
    } else {
        "No"
    }
}
