// src/pipeline/compose.rs

//! Aggregate composition.
//!
//! The country aggregate and metadata are built last, from the final
//! validated lists, so their counts always equal the list lengths.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use crate::models::{
    API_VERSION, AccreditationStatus, COUNTRY_CODE, COUNTRY_NAME, COUNTRY_REGION, CURRENCY,
    CURRENCY_SYMBOL, CountryRecord, CourseRecord, DATA_SOURCES, FullDataResponse, LivingCosts,
    Metadata, UniversityRecord,
};

/// Assemble the output document.
pub fn compose(
    universities: Vec<UniversityRecord>,
    courses: Vec<CourseRecord>,
    costs: LivingCosts,
    scraped_at: DateTime<Utc>,
) -> FullDataResponse {
    let sources: Vec<String> = DATA_SOURCES.iter().map(|s| s.to_string()).collect();

    let country = CountryRecord {
        name: COUNTRY_NAME.to_string(),
        code: COUNTRY_CODE.to_string(),
        region: COUNTRY_REGION.to_string(),
        currency: CURRENCY.to_string(),
        currency_symbol: CURRENCY_SYMBOL.to_string(),
        cost_of_living: costs.cost_of_living,
        tuition_range: costs.tuition_range,
        total_universities: universities.len(),
        total_courses: courses.len(),
        data_sources: sources.clone(),
        scraped_at,
    };

    let metadata = Metadata {
        scraped_at,
        total_universities: universities.len(),
        total_courses: courses.len(),
        api_version: API_VERSION.to_string(),
        sources,
    };

    FullDataResponse {
        country,
        universities,
        courses,
        metadata,
    }
}

/// Breakdown of a finished document for the end-of-run report.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Summary {
    pub total_universities: usize,
    pub total_courses: usize,
    pub by_accreditation: BTreeMap<AccreditationStatus, usize>,
    /// Universities without an emirate are counted under "Unknown"
    pub by_emirate: BTreeMap<String, usize>,
}

impl Summary {
    pub fn of(document: &FullDataResponse) -> Self {
        let mut summary = Self {
            total_universities: document.universities.len(),
            total_courses: document.courses.len(),
            ..Self::default()
        };
        for uni in &document.universities {
            *summary.by_accreditation.entry(uni.accreditation_status).or_default() += 1;
            let emirate = uni.emirate.clone().unwrap_or_else(|| "Unknown".to_string());
            *summary.by_emirate.entry(emirate).or_default() += 1;
        }
        summary
    }

    pub fn licensed(&self) -> usize {
        self.by_accreditation
            .get(&AccreditationStatus::Licensed)
            .copied()
            .unwrap_or(0)
    }

    pub fn revoked(&self) -> usize {
        self.by_accreditation
            .get(&AccreditationStatus::Revoked)
            .copied()
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CostOfLiving, University};
    use crate::pipeline::validate::{Validated, map_university};

    fn record(name: &str, emirate: Option<&str>, status: &str) -> UniversityRecord {
        let mut uni = University::new(format!("id-{name}"), name, "CAA");
        uni.emirate = emirate.map(str::to_string);
        uni.accreditation_status = Some(status.to_string());
        match map_university(uni) {
            Validated::Valid { record, .. } => record,
            Validated::Rejected(r) => panic!("unexpected rejection: {r}"),
        }
    }

    fn sample() -> FullDataResponse {
        compose(
            vec![
                record("Zayed University", Some("Dubai"), "Licensed"),
                record("Ajman University", Some("Ajman"), "Licensed"),
                record("Example College", None, "Licensure Revoked"),
            ],
            Vec::new(),
            LivingCosts::default(),
            Utc::now(),
        )
    }

    #[test]
    fn counts_match_list_lengths() {
        let doc = sample();
        assert_eq!(doc.country.total_universities, doc.universities.len());
        assert_eq!(doc.country.total_courses, doc.courses.len());
        assert_eq!(doc.metadata.total_universities, 3);
        assert_eq!(doc.metadata.total_courses, 0);
        assert_eq!(doc.metadata.api_version, "1.0");
        assert_eq!(doc.country.code, "UAE");
    }

    #[test]
    fn default_costs_are_complete() {
        let doc = sample();
        assert_eq!(doc.country.cost_of_living, CostOfLiving::default());
        assert_eq!(doc.country.cost_of_living.total_min, 4500.0);
        assert_eq!(doc.country.tuition_range.postgraduate_max, 120000.0);
    }

    #[test]
    fn summary_breakdown() {
        let summary = Summary::of(&sample());
        assert_eq!(summary.licensed(), 2);
        assert_eq!(summary.revoked(), 1);
        assert_eq!(summary.by_emirate.get("Unknown"), Some(&1));
        assert_eq!(summary.by_emirate.get("Dubai"), Some(&1));
    }

    #[test]
    fn document_round_trips_through_json() {
        let doc = sample();
        let json = serde_json::to_string_pretty(&doc).unwrap();
        let back: FullDataResponse = serde_json::from_str(&json).unwrap();
        assert_eq!(doc, back);
    }
}
