// src/models/raw.rs

//! Loosely structured records as produced by the extraction adapters.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A field-name to value mapping for one university-like or course-like
/// candidate. Fields a source could not find are simply absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawRecord {
    fields: Map<String, Value>,
}

impl RawRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style setter. `None` and empty strings are not stored.
    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.set(key, value);
        self
    }

    pub fn set(&mut self, key: &str, value: impl Into<Value>) {
        match value.into() {
            Value::Null => {}
            Value::String(s) if s.trim().is_empty() => {}
            other => {
                self.fields.insert(key.to_string(), other);
            }
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Trimmed, non-empty string value. Numbers are rendered as text.
    pub fn text(&self, key: &str) -> Option<String> {
        match self.fields.get(key)? {
            Value::String(s) => {
                let trimmed = s.trim();
                (!trimmed.is_empty()).then(|| trimmed.to_string())
            }
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    /// Numeric value, accepting numbers or numeric strings (commas ignored).
    pub fn number(&self, key: &str) -> Option<f64> {
        match self.fields.get(key)? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().replace(',', "").parse().ok(),
            _ => None,
        }
    }

    /// Non-negative integer count. Negative, fractional or non-numeric
    /// values read as absent.
    pub fn count(&self, key: &str) -> Option<u32> {
        let value = self.number(key)?;
        if value.is_finite() && value >= 0.0 && value.fract() == 0.0 && value <= u32::MAX as f64 {
            Some(value as u32)
        } else {
            None
        }
    }

    pub fn flag(&self, key: &str) -> Option<bool> {
        match self.fields.get(key)? {
            Value::Bool(b) => Some(*b),
            Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
                "true" | "yes" => Some(true),
                "false" | "no" => Some(false),
                _ => None,
            },
            _ => None,
        }
    }

    /// String list. A single string is read as a one-element list.
    pub fn list(&self, key: &str) -> Vec<String> {
        match self.fields.get(key) {
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(Value::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
            Some(Value::String(s)) if !s.trim().is_empty() => vec![s.trim().to_string()],
            _ => Vec::new(),
        }
    }
}

impl From<Map<String, Value>> for RawRecord {
    fn from(fields: Map<String, Value>) -> Self {
        let mut record = Self::new();
        for (key, value) in fields {
            record.set(&key, value);
        }
        record
    }
}

/// Everything one adapter collected, tagged with its provenance label.
#[derive(Debug, Clone, Default)]
pub struct SourceBatch {
    pub source: String,
    pub universities: Vec<RawRecord>,
    pub courses: Vec<RawRecord>,
}

impl SourceBatch {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            ..Self::default()
        }
    }

    /// The degenerate result of a source that could not be collected.
    pub fn empty(source: impl Into<String>) -> Self {
        Self::new(source)
    }

    pub fn is_empty(&self) -> bool {
        self.universities.is_empty() && self.courses.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_values_are_not_stored() {
        let record = RawRecord::new()
            .with("name", "  ")
            .with("city", Value::Null)
            .with("emirate", "Dubai");

        assert!(!record.contains("name"));
        assert!(!record.contains("city"));
        assert_eq!(record.text("emirate").as_deref(), Some("Dubai"));
    }

    #[test]
    fn counts_reject_negative_and_garbage() {
        let record = RawRecord::new()
            .with("total_programs", -3)
            .with("bachelor_programs", "12")
            .with("master_programs", "lots")
            .with("scholarships_available", 2.5);

        assert_eq!(record.count("total_programs"), None);
        assert_eq!(record.count("bachelor_programs"), Some(12));
        assert_eq!(record.count("master_programs"), None);
        assert_eq!(record.count("scholarships_available"), None);
    }

    #[test]
    fn numbers_accept_grouped_strings() {
        let record = RawRecord::new().with("tuition_fee_value", "45,000");
        assert_eq!(record.number("tuition_fee_value"), Some(45000.0));
    }

    #[test]
    fn list_accepts_single_string() {
        let record = RawRecord::new()
            .with("attendance_options", json!(["Online", " ", "Blended"]))
            .with("aliases", "UAEU");

        assert_eq!(record.list("attendance_options"), vec!["Online", "Blended"]);
        assert_eq!(record.list("aliases"), vec!["UAEU"]);
        assert!(record.list("missing").is_empty());
    }

    #[test]
    fn from_map_drops_empty_fields() {
        let map = json!({"name": "Zayed University", "website": ""})
            .as_object()
            .cloned()
            .unwrap();
        let record = RawRecord::from(map);

        assert!(record.contains("name"));
        assert!(!record.contains("website"));
    }
}
