//! DOM element extraction
//!
//! Runs the in-page extraction script on a loaded tab, decodes the raw
//! element array it returns, and assembles [`ElementResult`] records with
//! page identity and keyword-context labels attached. Extraction is
//! best-effort at two levels: a failed script yields an empty list, and a
//! single undecodable element is skipped without aborting the batch.

mod classify;
mod script;

pub use classify::{detect_tag_context, BUILTIN_TAG};
pub use script::EXTRACTION_JS;

use crate::browser::Tab;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// What kind of element was found
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementType {
    Link,
    Button,
    Form,
    Menu,
    Tab,
    Accordion,
    Download,
    #[serde(other)]
    Unknown,
}

impl ElementType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ElementType::Link => "link",
            ElementType::Button => "button",
            ElementType::Form => "form",
            ElementType::Menu => "menu",
            ElementType::Tab => "tab",
            ElementType::Accordion => "accordion",
            ElementType::Download => "download",
            ElementType::Unknown => "unknown",
        }
    }

    pub fn from_db_string(s: &str) -> Self {
        match s {
            "link" => ElementType::Link,
            "button" => ElementType::Button,
            "form" => ElementType::Form,
            "menu" => ElementType::Menu,
            "tab" => ElementType::Tab,
            "accordion" => ElementType::Accordion,
            "download" => ElementType::Download,
            _ => ElementType::Unknown,
        }
    }
}

impl Default for ElementType {
    fn default() -> Self {
        ElementType::Unknown
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// What interacting with the element does
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionType {
    Navigate,
    Submit,
    Toggle,
    Expand,
    Download,
    Other,
}

impl ActionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionType::Navigate => "navigate",
            ActionType::Submit => "submit",
            ActionType::Toggle => "toggle",
            ActionType::Expand => "expand",
            ActionType::Download => "download",
            ActionType::Other => "other",
        }
    }

    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "navigate" => Some(ActionType::Navigate),
            "submit" => Some(ActionType::Submit),
            "toggle" => Some(ActionType::Toggle),
            "expand" => Some(ActionType::Expand),
            "download" => Some(ActionType::Download),
            "other" => Some(ActionType::Other),
            _ => None,
        }
    }
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The nearest landmark region enclosing the element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContainerContext {
    Header,
    Nav,
    Main,
    Footer,
    Aside,
    Dialog,
    #[serde(other)]
    Unknown,
}

impl ContainerContext {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContainerContext::Header => "header",
            ContainerContext::Nav => "nav",
            ContainerContext::Main => "main",
            ContainerContext::Footer => "footer",
            ContainerContext::Aside => "aside",
            ContainerContext::Dialog => "dialog",
            ContainerContext::Unknown => "unknown",
        }
    }

    pub fn from_db_string(s: &str) -> Self {
        match s {
            "header" => ContainerContext::Header,
            "nav" => ContainerContext::Nav,
            "main" => ContainerContext::Main,
            "footer" => ContainerContext::Footer,
            "aside" => ContainerContext::Aside,
            "dialog" => ContainerContext::Dialog,
            _ => ContainerContext::Unknown,
        }
    }
}

impl Default for ContainerContext {
    fn default() -> Self {
        ContainerContext::Unknown
    }
}

impl fmt::Display for ContainerContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One interactive element, with its page identity and semantic metadata
#[derive(Debug, Clone, PartialEq)]
pub struct ElementResult {
    /// URL of the page the element was found on
    pub page_url: String,

    /// Title of that page, when it had one
    pub page_title: Option<String>,

    pub element_type: ElementType,

    pub action_type: Option<ActionType>,

    /// Best-effort human-readable label (text, ARIA, title, alt, ...)
    pub element_text: Option<String>,

    /// CSS selector that addresses the element on its page
    pub css_selector: String,

    /// Nearest heading text above the element
    pub section_context: Option<String>,

    pub container_context: ContainerContext,

    /// Whether the element intersects the initial viewport
    pub is_above_fold: bool,

    /// Resolved link target, for elements that lead somewhere
    pub target_url: Option<String>,

    /// Whether the target points off the page's host
    pub is_external: bool,

    /// Keyword-context label, e.g. `isi:medication guide` or `custom:enroll`
    pub domain_context: Option<String>,
}

/// Shape of one entry in the extraction script's output
#[derive(Debug, Deserialize)]
struct RawElement {
    #[serde(default)]
    element_type: ElementType,
    #[serde(default)]
    action_type: Option<ActionType>,
    #[serde(default)]
    element_text: Option<String>,
    #[serde(default)]
    css_selector: String,
    #[serde(default)]
    section_context: Option<String>,
    #[serde(default)]
    container_context: ContainerContext,
    #[serde(default)]
    is_above_fold: bool,
    #[serde(default)]
    target_url: Option<String>,
    #[serde(default)]
    is_external: bool,
}

/// Extracts every interactive element from the current page
///
/// A script failure is logged and yields an empty list; the page visit
/// itself is unaffected.
pub async fn extract_elements(
    tab: &dyn Tab,
    page_url: &str,
    page_title: Option<&str>,
    tag_name: &str,
    tag_keywords: Option<&[String]>,
) -> Vec<ElementResult> {
    let raw = match tab.evaluate(EXTRACTION_JS).await {
        Ok(raw) => raw,
        Err(e) => {
            tracing::warn!("Extraction failed on {}: {}", page_url, e);
            return Vec::new();
        }
    };

    let results = from_script_output(raw, page_url, page_title, tag_name, tag_keywords);
    tracing::info!(
        "Extracted {} elements from {} (tag hints: {})",
        results.len(),
        page_url,
        results.iter().filter(|r| r.domain_context.is_some()).count()
    );
    results
}

/// Decodes the raw element array and attaches page identity and tag labels
fn from_script_output(
    raw: Value,
    page_url: &str,
    page_title: Option<&str>,
    tag_name: &str,
    tag_keywords: Option<&[String]>,
) -> Vec<ElementResult> {
    let items = match raw {
        Value::Array(items) => items,
        Value::Null => return Vec::new(),
        other => {
            tracing::warn!(
                "Extraction script returned non-array output on {}: {}",
                page_url,
                other
            );
            return Vec::new();
        }
    };

    let mut results = Vec::with_capacity(items.len());
    for item in items {
        let raw: RawElement = match serde_json::from_value(item) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::debug!("Skipping undecodable element on {}: {}", page_url, e);
                continue;
            }
        };

        let domain_context = detect_tag_context(
            raw.element_text.as_deref(),
            raw.target_url.as_deref(),
            tag_name,
            tag_keywords,
        );

        results.push(ElementResult {
            page_url: page_url.to_string(),
            page_title: page_title.map(str::to_string),
            element_type: raw.element_type,
            action_type: raw.action_type,
            element_text: raw.element_text,
            css_selector: raw.css_selector,
            section_context: raw.section_context,
            container_context: raw.container_context,
            is_above_fold: raw.is_above_fold,
            target_url: raw.target_url,
            is_external: raw.is_external,
            domain_context,
        });
    }
    results
}
