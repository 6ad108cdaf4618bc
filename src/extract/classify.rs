//! Keyword-context classification
//!
//! Tags extracted elements with a semantic label. The built-in "Pharma"
//! vocabulary groups phrases into regulatory categories; a custom tag
//! replaces it with a flat keyword list. Matching is case-insensitive
//! substring search, first match wins, and the label always carries the
//! phrase that matched so results are auditable.

/// Built-in vocabulary, checked in order within each category
const PHARMA_PATTERNS: &[(&str, &[&str])] = &[
    (
        "isi",
        &[
            "important safety information",
            "full prescribing information",
            "medication guide",
            "prescribing information",
            "safety information",
        ],
    ),
    (
        "adverse_event",
        &[
            "report side effects",
            "adverse event",
            "medwatch",
            "report adverse",
            "side effect",
        ],
    ),
    (
        "patient_enrollment",
        &[
            "patient support",
            "copay",
            "savings card",
            "savings program",
            "co-pay",
            "patient assistance",
            "enroll",
            "sign up for savings",
        ],
    ),
    (
        "hcp_gate",
        &[
            "are you a healthcare professional",
            "for us healthcare professionals",
            "healthcare provider",
            "hcp portal",
            "for healthcare professionals",
            "i am a healthcare",
        ],
    ),
    (
        "fair_balance",
        &[
            "indications and usage",
            "contraindications",
            "warnings and precautions",
            "boxed warning",
            "black box warning",
        ],
    ),
];

/// The tag name that selects the built-in vocabulary
pub const BUILTIN_TAG: &str = "Pharma";

/// Classifies an element's text and target URL against the active vocabulary
///
/// Built-in mode (`tag_name == "Pharma"`, no keywords) returns
/// `"<category>:<matched phrase>"`. Custom mode matches the supplied
/// keywords against text and URL combined and returns
/// `"custom:<keyword>"`. `None` means nothing matched.
pub fn detect_tag_context(
    text: Option<&str>,
    url: Option<&str>,
    tag_name: &str,
    keywords: Option<&[String]>,
) -> Option<String> {
    let has_keywords = keywords.is_some_and(|k| !k.is_empty());
    if tag_name == BUILTIN_TAG && !has_keywords {
        return detect_pharma_builtin(text, url);
    }
    if !has_keywords {
        return None;
    }

    let mut combined = String::new();
    if let Some(text) = text {
        combined.push_str(&text.to_lowercase());
    }
    if let Some(url) = url {
        combined.push(' ');
        combined.push_str(&url.to_lowercase());
    }
    if combined.trim().is_empty() {
        return None;
    }

    for keyword in keywords.into_iter().flatten() {
        if combined.contains(&keyword.to_lowercase()) {
            return Some(format!("custom:{}", keyword));
        }
    }
    None
}

/// Built-in pharma matching; URL hints catch unlabeled document links
fn detect_pharma_builtin(text: Option<&str>, url: Option<&str>) -> Option<String> {
    let text = text?;
    if text.is_empty() {
        return None;
    }

    let text_lower = text.to_lowercase();
    for (category, patterns) in PHARMA_PATTERNS {
        for pattern in *patterns {
            if text_lower.contains(pattern) {
                return Some(format!("{}:{}", category, pattern));
            }
        }
    }

    if let Some(url) = url {
        let url_lower = url.to_lowercase();
        if url_lower.contains("prescribing") || url_lower.contains("/pi") {
            return Some("isi:prescribing information".to_string());
        }
        if url_lower.contains("medguide") || url_lower.contains("medication-guide") {
            return Some("isi:medication guide".to_string());
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn builtin(text: Option<&str>, url: Option<&str>) -> Option<String> {
        detect_tag_context(text, url, BUILTIN_TAG, None)
    }

    #[test]
    fn test_isi_phrase() {
        assert_eq!(
            builtin(Some("Important Safety Information"), None).as_deref(),
            Some("isi:important safety information")
        );
    }

    #[test]
    fn test_adverse_event_phrase() {
        assert_eq!(
            builtin(Some("Report side effects to MedWatch"), None).as_deref(),
            Some("adverse_event:report side effects")
        );
    }

    #[test]
    fn test_enrollment_phrase() {
        assert_eq!(
            builtin(Some("Get your copay card today"), None).as_deref(),
            Some("patient_enrollment:copay")
        );
    }

    #[test]
    fn test_hcp_gate_phrase() {
        assert_eq!(
            builtin(Some("Are you a healthcare professional?"), None).as_deref(),
            Some("hcp_gate:are you a healthcare professional")
        );
    }

    #[test]
    fn test_fair_balance_phrase() {
        assert_eq!(
            builtin(Some("See Indications and Usage"), None).as_deref(),
            Some("fair_balance:indications and usage")
        );
    }

    #[test]
    fn test_category_order_is_first_match() {
        // Text matching both isi and adverse_event resolves to isi
        let label = builtin(Some("safety information and side effect reporting"), None);
        assert_eq!(label.as_deref(), Some("isi:safety information"));
    }

    #[test]
    fn test_url_hint_prescribing() {
        assert_eq!(
            builtin(Some("Download"), Some("https://example.com/files/prescribing-info.pdf"))
                .as_deref(),
            Some("isi:prescribing information")
        );
    }

    #[test]
    fn test_url_hint_pi_path() {
        assert_eq!(
            builtin(Some("PDF"), Some("https://example.com/pi.pdf")).as_deref(),
            Some("isi:prescribing information")
        );
    }

    #[test]
    fn test_url_hint_medication_guide() {
        assert_eq!(
            builtin(Some("Download"), Some("https://example.com/medication-guide.pdf"))
                .as_deref(),
            Some("isi:medication guide")
        );
    }

    #[test]
    fn test_text_match_beats_url_hint() {
        let label = builtin(
            Some("Medication Guide"),
            Some("https://example.com/prescribing.pdf"),
        );
        assert_eq!(label.as_deref(), Some("isi:medication guide"));
    }

    #[test]
    fn test_no_text_returns_none() {
        assert_eq!(builtin(None, Some("https://example.com/prescribing.pdf")), None);
        assert_eq!(builtin(Some(""), None), None);
    }

    #[test]
    fn test_unmatched_text_returns_none() {
        assert_eq!(builtin(Some("Contact us"), None), None);
    }

    #[test]
    fn test_custom_keywords_match_text() {
        let keywords = vec!["cookie policy".to_string(), "privacy".to_string()];
        let label = detect_tag_context(
            Some("Read our cookie policy and privacy notice"),
            None,
            "Compliance",
            Some(&keywords),
        );
        assert_eq!(label.as_deref(), Some("custom:cookie policy"));
    }

    #[test]
    fn test_custom_keywords_match_url() {
        let keywords = vec!["terms".to_string()];
        let label = detect_tag_context(
            None,
            Some("https://example.com/terms-of-use"),
            "Legal",
            Some(&keywords),
        );
        assert_eq!(label.as_deref(), Some("custom:terms"));
    }

    #[test]
    fn test_custom_keyword_case_preserved() {
        let keywords = vec!["MedInfo".to_string()];
        let label = detect_tag_context(Some("visit medinfo portal"), None, "Custom", Some(&keywords));
        assert_eq!(label.as_deref(), Some("custom:MedInfo"));
    }

    #[test]
    fn test_custom_keywords_override_builtin_tag() {
        // Keywords supplied alongside the built-in tag name switch to custom mode
        let keywords = vec!["enroll".to_string()];
        let label = detect_tag_context(
            Some("Important Safety Information"),
            None,
            BUILTIN_TAG,
            Some(&keywords),
        );
        assert_eq!(label, None);
    }

    #[test]
    fn test_custom_no_match() {
        let keywords = vec!["unsubscribe".to_string()];
        assert_eq!(
            detect_tag_context(Some("Home"), None, "Custom", Some(&keywords)),
            None
        );
    }

    #[test]
    fn test_non_builtin_tag_without_keywords() {
        assert_eq!(
            detect_tag_context(Some("Important Safety Information"), None, "Other", None),
            None
        );
        let empty: Vec<String> = Vec::new();
        assert_eq!(
            detect_tag_context(Some("anything"), None, "Other", Some(&empty)),
            None
        );
    }

    #[test]
    fn test_empty_inputs_custom_mode() {
        let keywords = vec!["x".to_string()];
        assert_eq!(detect_tag_context(None, None, "Custom", Some(&keywords)), None);
    }
}
