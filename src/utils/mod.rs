//! Utility functions and helpers.

pub mod http;

use std::sync::LazyLock;

use regex::Regex;

static NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d[\d,]*(?:\.\d+)?").expect("number pattern"));
static RAK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(?:rak|r\.a\.k)\b").expect("rak pattern"));

/// Collapse runs of whitespace into single spaces and trim.
pub fn clean_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// First number in the text, with thousands separators removed.
pub fn extract_number(text: &str) -> Option<f64> {
    NUMBER_RE
        .find(text)
        .and_then(|m| m.as_str().replace(',', "").parse().ok())
}

/// Detect which emirate a name or address refers to.
///
/// Al Ain belongs to Abu Dhabi. Returns `None` when nothing matches.
pub fn detect_emirate(text: &str) -> Option<&'static str> {
    let lower = text.to_lowercase();
    if lower.contains("dubai") {
        Some("Dubai")
    } else if lower.contains("abu dhabi") || lower.contains("abu-dhabi") {
        Some("Abu Dhabi")
    } else if lower.contains("sharjah") {
        Some("Sharjah")
    } else if lower.contains("ajman") {
        Some("Ajman")
    } else if lower.contains("fujairah") {
        Some("Fujairah")
    } else if lower.contains("ras al khaimah") || RAK_RE.is_match(&lower) {
        Some("Ras Al Khaimah")
    } else if lower.contains("umm al quwain") || lower.contains("uaq") {
        Some("Umm Al Quwain")
    } else if lower.contains("al ain") {
        Some("Abu Dhabi")
    } else {
        None
    }
}
