// src/models/schema.rs

//! Strict output schema.
//!
//! These are the only types that reach the exported document. Every field
//! is either required and present, or optional and explicitly `null`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::country::{CostOfLiving, TuitionRange};
use super::course::DegreeLevel;

/// Accreditation registry status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AccreditationStatus {
    Licensed,
    #[serde(rename = "Licensure Revoked")]
    Revoked,
    #[default]
    Unknown,
}

impl AccreditationStatus {
    /// `"Licensed"` only on an exact match; any text containing
    /// `"Revoked"` is revoked; everything else is unknown.
    pub fn from_raw(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some("Licensed") => Self::Licensed,
            Some(text) if text.contains("Revoked") => Self::Revoked,
            _ => Self::Unknown,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InstitutionType {
    Public,
    Private,
    Unknown,
}

impl InstitutionType {
    pub fn from_raw(raw: &str) -> Self {
        let lower = raw.to_lowercase();
        if lower.contains("public") || lower.contains("government") {
            Self::Public
        } else if lower.contains("private") {
            Self::Private
        } else {
            Self::Unknown
        }
    }
}

/// Course attendance intensity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StudyMode {
    #[serde(rename = "Full-time")]
    FullTime,
    #[serde(rename = "Part-time")]
    PartTime,
    Online,
    Blended,
}

impl StudyMode {
    pub fn parse(raw: &str) -> Option<Self> {
        let lower = normalize_label(raw);
        match lower.as_str() {
            "fulltime" => Some(Self::FullTime),
            "parttime" => Some(Self::PartTime),
            "online" | "distance" => Some(Self::Online),
            "blended" | "hybrid" => Some(Self::Blended),
            _ => None,
        }
    }
}

/// Where teaching happens. Also used for a university's attendance options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DeliveryFormat {
    #[serde(rename = "On-campus")]
    OnCampus,
    Online,
    Blended,
}

impl DeliveryFormat {
    pub fn parse(raw: &str) -> Option<Self> {
        let lower = normalize_label(raw);
        match lower.as_str() {
            "oncampus" | "campus" | "inperson" => Some(Self::OnCampus),
            "online" | "distance" => Some(Self::Online),
            "blended" | "hybrid" => Some(Self::Blended),
            _ => None,
        }
    }
}

fn normalize_label(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UniversityRecord {
    pub id: String,
    pub name: String,
    pub name_arabic: Option<String>,
    pub emirate: Option<String>,
    pub city: Option<String>,
    pub country: String,
    pub institution_type: Option<InstitutionType>,
    pub accreditation_status: AccreditationStatus,
    pub ranking: Option<String>,
    pub ranking_tier: Option<String>,
    pub rating: Option<f64>,
    pub review_count: Option<u32>,
    pub website: Option<String>,
    pub caa_guid: Option<String>,
    pub total_programs: u32,
    pub bachelor_programs: u32,
    pub master_programs: u32,
    pub scholarships_available: u32,
    pub attendance_options: Vec<DeliveryFormat>,
    pub source: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourseRecord {
    pub id: String,
    pub name: String,
    pub university_id: String,
    pub university_name: String,
    pub degree_level: DegreeLevel,
    pub field_of_study: Option<String>,
    pub duration: Option<String>,
    pub duration_months: Option<u32>,
    pub study_mode: Option<StudyMode>,
    pub delivery_format: Option<DeliveryFormat>,
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

/// Country-level aggregate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountryRecord {
    pub name: String,
    pub code: String,
    pub region: String,
    pub currency: String,
    pub currency_symbol: String,
    pub cost_of_living: CostOfLiving,
    pub tuition_range: TuitionRange,
    pub total_universities: usize,
    pub total_courses: usize,
    pub data_sources: Vec<String>,
    pub scraped_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    pub scraped_at: DateTime<Utc>,
    pub total_universities: usize,
    pub total_courses: usize,
    pub api_version: String,
    pub sources: Vec<String>,
}

/// The root output document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FullDataResponse {
    pub country: CountryRecord,
    pub universities: Vec<UniversityRecord>,
    pub courses: Vec<CourseRecord>,
    pub metadata: Metadata,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accreditation_mapping() {
        assert_eq!(AccreditationStatus::from_raw(Some("Licensed")), AccreditationStatus::Licensed);
        assert_eq!(
            AccreditationStatus::from_raw(Some("Licensure Revoked")),
            AccreditationStatus::Revoked
        );
        // Only the exact label counts as licensed
        assert_eq!(
            AccreditationStatus::from_raw(Some("Licensed (provisional)")),
            AccreditationStatus::Unknown
        );
        assert_eq!(AccreditationStatus::from_raw(None), AccreditationStatus::Unknown);
    }

    #[test]
    fn revoked_serializes_with_registry_label() {
        let json = serde_json::to_string(&AccreditationStatus::Revoked).unwrap();
        assert_eq!(json, "\"Licensure Revoked\"");
    }

    #[test]
    fn study_mode_and_delivery_are_independent() {
        assert_eq!(StudyMode::parse("Full time"), Some(StudyMode::FullTime));
        assert_eq!(StudyMode::parse("part-time"), Some(StudyMode::PartTime));
        assert_eq!(StudyMode::parse("On campus"), None);
        assert_eq!(DeliveryFormat::parse("On-Campus"), Some(DeliveryFormat::OnCampus));
        assert_eq!(DeliveryFormat::parse("Hybrid"), Some(DeliveryFormat::Blended));
        assert_eq!(DeliveryFormat::parse("Full-time"), None);
    }

    #[test]
    fn institution_type_contains_rules() {
        assert_eq!(InstitutionType::from_raw("Public university"), InstitutionType::Public);
        assert_eq!(InstitutionType::from_raw("PRIVATE"), InstitutionType::Private);
        assert_eq!(InstitutionType::from_raw("federal"), InstitutionType::Unknown);
    }
}
