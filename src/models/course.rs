//! Internal course record.

use serde::{Deserialize, Serialize};

use super::country::CURRENCY;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DegreeLevel {
    #[default]
    Bachelor,
    Master,
    PhD,
    Diploma,
    Associate,
}

impl DegreeLevel {
    /// Parse an explicit degree label.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "bachelor" | "bachelors" | "bachelor's" | "undergraduate" => Some(Self::Bachelor),
            "master" | "masters" | "master's" | "postgraduate" => Some(Self::Master),
            "phd" | "ph.d" | "ph.d." | "doctorate" | "doctoral" => Some(Self::PhD),
            "diploma" => Some(Self::Diploma),
            "associate" | "associates" | "associate's" => Some(Self::Associate),
            _ => None,
        }
    }

    /// Guess the level from a programme name.
    pub fn infer_from_name(name: &str) -> Self {
        let lower = name.to_lowercase();
        if ["master", "mba", "msc"].iter().any(|t| lower.contains(t)) {
            Self::Master
        } else if ["phd", "doctorate"].iter().any(|t| lower.contains(t)) {
            Self::PhD
        } else if lower.contains("diploma") {
            Self::Diploma
        } else if lower.contains("associate") {
            Self::Associate
        } else {
            Self::Bachelor
        }
    }
}

/// A course as seen by reconciliation.
///
/// `id` is fixed at creation. `university_id` is provisional until the
/// linking pass hands back a relinked copy.
#[derive(Debug, Clone, PartialEq)]
pub struct Course {
    pub id: String,
    pub name: String,
    pub university_id: String,
    /// Informational, may not match the linked university's name
    pub university_name: String,
    pub degree_level: DegreeLevel,
    pub field_of_study: Option<String>,
    pub duration: Option<String>,
    pub duration_months: Option<u32>,
    pub study_mode: Option<String>,
    pub delivery_format: Option<String>,
    pub tuition_fee: Option<String>,
    pub tuition_fee_value: Option<f64>,
    pub tuition_currency: String,
    pub tuition_period: Option<String>,
    pub language: String,
    pub accredited: bool,
    pub start_dates: Option<String>,
    pub application_deadline: Option<String>,
    pub source: String,
    pub url: Option<String>,
}

impl Course {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        university_id: impl Into<String>,
        source: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            university_id: university_id.into(),
            university_name: String::new(),
            degree_level: DegreeLevel::default(),
            field_of_study: None,
            duration: None,
            duration_months: None,
            study_mode: None,
            delivery_format: None,
            tuition_fee: None,
            tuition_fee_value: None,
            tuition_currency: CURRENCY.to_string(),
            tuition_period: None,
            language: "English".to_string(),
            accredited: true,
            start_dates: None,
            application_deadline: None,
            source: source.into(),
            url: None,
        }
    }

    /// Copy of this course owned by another university. The id is kept.
    pub fn relinked(&self, university_id: &str) -> Course {
        Course {
            university_id: university_id.to_string(),
            ..self.clone()
        }
    }
}
