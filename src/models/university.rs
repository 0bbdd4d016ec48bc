// src/models/university.rs

//! Internal university record and the field-by-field merge rule.

use std::collections::BTreeSet;

use super::country::COUNTRY_NAME;
use super::schema::DeliveryFormat;

/// A university as seen by reconciliation, before schema mapping.
///
/// Optional scalars keep the raw source text; mapping to closed
/// enumerations happens in validation.
#[derive(Debug, Clone, PartialEq)]
pub struct University {
    /// Derived from the normalized name
    pub id: String,
    pub name: String,
    pub name_arabic: Option<String>,
    pub emirate: Option<String>,
    pub city: Option<String>,
    pub country: String,
    pub institution_type: Option<String>,
    pub accreditation_status: Option<String>,
    pub ranking: Option<String>,
    pub ranking_tier: Option<String>,
    pub rating: Option<f64>,
    pub review_count: Option<u32>,
    pub website: Option<String>,
    /// Registry reference code
    pub caa_guid: Option<String>,
    pub total_programs: u32,
    pub bachelor_programs: u32,
    pub master_programs: u32,
    pub scholarships_available: u32,
    pub attendance_options: BTreeSet<DeliveryFormat>,
    /// Provenance labels joined with ", "
    pub source: String,
}

impl University {
    pub fn new(id: impl Into<String>, name: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            name_arabic: None,
            emirate: None,
            city: None,
            country: COUNTRY_NAME.to_string(),
            institution_type: None,
            accreditation_status: None,
            ranking: None,
            ranking_tier: None,
            rating: None,
            review_count: None,
            website: None,
            caa_guid: None,
            total_programs: 0,
            bachelor_programs: 0,
            master_programs: 0,
            scholarships_available: 0,
            attendance_options: BTreeSet::new(),
            source: source.into(),
        }
    }

    /// Combine `self` (seen first) with a later duplicate.
    ///
    /// Optional scalars keep the first present value, counts take the
    /// maximum, attendance options are unioned and provenance labels are
    /// appended once each. `id` and `name` stay those of `self`.
    pub fn merged_with(mut self, other: &University) -> University {
        fill(&mut self.name_arabic, &other.name_arabic);
        fill(&mut self.emirate, &other.emirate);
        fill(&mut self.city, &other.city);
        fill(&mut self.institution_type, &other.institution_type);
        fill(&mut self.accreditation_status, &other.accreditation_status);
        fill(&mut self.ranking, &other.ranking);
        fill(&mut self.ranking_tier, &other.ranking_tier);
        fill(&mut self.website, &other.website);
        fill(&mut self.caa_guid, &other.caa_guid);
        self.rating = self.rating.or(other.rating);
        self.review_count = self.review_count.or(other.review_count);

        self.total_programs = self.total_programs.max(other.total_programs);
        self.bachelor_programs = self.bachelor_programs.max(other.bachelor_programs);
        self.master_programs = self.master_programs.max(other.master_programs);
        self.scholarships_available = self.scholarships_available.max(other.scholarships_available);

        self.attendance_options
            .extend(other.attendance_options.iter().copied());

        for label in provenance_labels(&other.source) {
            if !provenance_labels(&self.source).any(|existing| existing == label) {
                if self.source.is_empty() {
                    self.source = label.to_string();
                } else {
                    self.source = format!("{}, {}", self.source, label);
                }
            }
        }

        self
    }
}

fn fill(target: &mut Option<String>, other: &Option<String>) {
    let missing = target.as_deref().is_none_or(|s| s.trim().is_empty());
    if missing {
        if let Some(value) = other.as_deref().filter(|s| !s.trim().is_empty()) {
            *target = Some(value.to_string());
        }
    }
}

fn provenance_labels(source: &str) -> impl Iterator<Item = &str> {
    source.split(',').map(str::trim).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry_entry() -> University {
        let mut uni = University::new("id-1", "Abu Dhabi University", "CAA");
        uni.emirate = Some("Abu Dhabi".to_string());
        uni.accreditation_status = Some("Licensed".to_string());
        uni.caa_guid = Some("14".to_string());
        uni
    }

    fn portal_entry() -> University {
        let mut uni = University::new("id-2", "Abu Dhabi University", "BachelorsPortal");
        uni.emirate = Some("Al Ain".to_string());
        uni.city = Some("Abu Dhabi".to_string());
        uni.rating = Some(4.2);
        uni.bachelor_programs = 31;
        uni.scholarships_available = 4;
        uni.attendance_options = [DeliveryFormat::OnCampus, DeliveryFormat::Online].into();
        uni
    }

    #[test]
    fn first_present_scalar_wins() {
        let merged = registry_entry().merged_with(&portal_entry());

        assert_eq!(merged.id, "id-1");
        assert_eq!(merged.emirate.as_deref(), Some("Abu Dhabi"));
        assert_eq!(merged.city.as_deref(), Some("Abu Dhabi"));
        assert_eq!(merged.rating, Some(4.2));
        assert_eq!(merged.caa_guid.as_deref(), Some("14"));
        assert_eq!(merged.source, "CAA, BachelorsPortal");
    }

    #[test]
    fn empty_string_counts_as_absent() {
        let mut first = registry_entry();
        first.website = Some(String::new());
        let mut second = portal_entry();
        second.website = Some("https://www.adu.ac.ae".to_string());

        let merged = first.merged_with(&second);
        assert_eq!(merged.website.as_deref(), Some("https://www.adu.ac.ae"));
    }

    #[test]
    fn counts_never_decrease() {
        let mut first = portal_entry();
        first.master_programs = 12;
        let mut second = registry_entry();
        second.bachelor_programs = 5;
        second.total_programs = 60;

        let merged = first.merged_with(&second);
        assert_eq!(merged.bachelor_programs, 31);
        assert_eq!(merged.master_programs, 12);
        assert_eq!(merged.total_programs, 60);
    }

    #[test]
    fn provenance_is_not_repeated() {
        let merged = registry_entry()
            .merged_with(&registry_entry())
            .merged_with(&portal_entry())
            .merged_with(&portal_entry());
        assert_eq!(merged.source, "CAA, BachelorsPortal");
    }
}
