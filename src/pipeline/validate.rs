// src/pipeline/validate.rs

//! Validation and schema mapping.
//!
//! Each internal record is mapped on its own. A record missing a required
//! field is rejected; a bad optional field is downgraded to `None` with a
//! warning. Nothing here aborts the batch.

use std::fmt;

use crate::models::{
    AccreditationStatus, Course, CourseRecord, DeliveryFormat, InstitutionType, StudyMode,
    University, UniversityRecord,
};

/// Result of mapping one record into the output schema.
#[derive(Debug, Clone, PartialEq)]
pub enum Validated<T> {
    Valid { record: T, warnings: Vec<String> },
    Rejected(Rejection),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    University,
    Course,
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::University => write!(f, "university"),
            Self::Course => write!(f, "course"),
        }
    }
}

/// A record dropped during mapping.
#[derive(Debug, Clone, PartialEq)]
pub struct Rejection {
    pub kind: RecordKind,
    pub id: String,
    pub name: String,
    pub source: String,
    pub reason: String,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = if self.name.is_empty() { "<unnamed>" } else { &self.name };
        write!(
            f,
            "{} '{}' from {}: {}",
            self.kind, name, self.source, self.reason
        )
    }
}

/// Map a university into the output schema.
pub fn map_university(uni: University) -> Validated<UniversityRecord> {
    let reject = |reason: &str| {
        Validated::Rejected(Rejection {
            kind: RecordKind::University,
            id: uni.id.clone(),
            name: uni.name.clone(),
            source: uni.source.clone(),
            reason: reason.to_string(),
        })
    };
    if uni.name.trim().is_empty() {
        return reject("missing name");
    }
    if uni.id.trim().is_empty() {
        return reject("missing id");
    }

    let mut warnings = Vec::new();
    let rating = match uni.rating {
        Some(r) if !(0.0..=5.0).contains(&r) => {
            warnings.push(format!("rating {r} outside 0-5, dropped"));
            None
        }
        other => other,
    };

    let record = UniversityRecord {
        accreditation_status: AccreditationStatus::from_raw(uni.accreditation_status.as_deref()),
        institution_type: uni.institution_type.as_deref().map(InstitutionType::from_raw),
        rating,
        attendance_options: uni.attendance_options.into_iter().collect(),
        id: uni.id,
        name: uni.name,
        name_arabic: uni.name_arabic,
        emirate: uni.emirate,
        city: uni.city,
        country: uni.country,
        ranking: uni.ranking,
        ranking_tier: uni.ranking_tier,
        review_count: uni.review_count,
        website: uni.website,
        caa_guid: uni.caa_guid,
        total_programs: uni.total_programs,
        bachelor_programs: uni.bachelor_programs,
        master_programs: uni.master_programs,
        scholarships_available: uni.scholarships_available,
        source: uni.source,
    };
    Validated::Valid { record, warnings }
}

/// Map a course into the output schema.
pub fn map_course(course: Course) -> Validated<CourseRecord> {
    let reject = |reason: &str| {
        Validated::Rejected(Rejection {
            kind: RecordKind::Course,
            id: course.id.clone(),
            name: course.name.clone(),
            source: course.source.clone(),
            reason: reason.to_string(),
        })
    };
    if course.name.trim().is_empty() {
        return reject("missing name");
    }
    if course.university_id.trim().is_empty() {
        return reject("missing university reference");
    }

    let mut warnings = Vec::new();
    let tuition_fee_value = match course.tuition_fee_value {
        Some(v) if !v.is_finite() || v < 0.0 => {
            warnings.push(format!("tuition value {v} is invalid, dropped"));
            None
        }
        other => other,
    };
    let study_mode = course.study_mode.as_deref().and_then(|text| {
        let parsed = StudyMode::parse(text);
        if parsed.is_none() {
            warnings.push(format!("unknown study mode '{text}', dropped"));
        }
        parsed
    });
    let delivery_format = course.delivery_format.as_deref().and_then(|text| {
        let parsed = DeliveryFormat::parse(text);
        if parsed.is_none() {
            warnings.push(format!("unknown delivery format '{text}', dropped"));
        }
        parsed
    });

    let record = CourseRecord {
        tuition_fee_value,
        study_mode,
        delivery_format,
        id: course.id,
        name: course.name,
        university_id: course.university_id,
        university_name: course.university_name,
        degree_level: course.degree_level,
        field_of_study: course.field_of_study,
        duration: course.duration,
        duration_months: course.duration_months,
        tuition_fee: course.tuition_fee,
        tuition_currency: course.tuition_currency,
        tuition_period: course.tuition_period,
        language: course.language,
        accredited: course.accredited,
        start_dates: course.start_dates,
        application_deadline: course.application_deadline,
        source: course.source,
        url: course.url,
    };
    Validated::Valid { record, warnings }
}

/// Everything that survived mapping, plus what was dropped.
#[derive(Debug, Default)]
pub struct ValidationReport {
    pub universities: Vec<UniversityRecord>,
    pub courses: Vec<CourseRecord>,
    pub rejections: Vec<Rejection>,
    pub warnings: usize,
}

/// Map every university and course, collecting rejections on the side.
pub fn validate_all(universities: Vec<University>, courses: Vec<Course>) -> ValidationReport {
    let mut report = ValidationReport::default();

    for uni in universities {
        match map_university(uni) {
            Validated::Valid { record, warnings } => {
                for warning in &warnings {
                    log::warn!("University '{}': {}", record.name, warning);
                }
                report.warnings += warnings.len();
                report.universities.push(record);
            }
            Validated::Rejected(rejection) => {
                log::warn!("Rejected {}", rejection);
                report.rejections.push(rejection);
            }
        }
    }

    for course in courses {
        match map_course(course) {
            Validated::Valid { record, warnings } => {
                for warning in &warnings {
                    log::warn!("Course '{}': {}", record.name, warning);
                }
                report.warnings += warnings.len();
                report.courses.push(record);
            }
            Validated::Rejected(rejection) => {
                log::warn!("Rejected {}", rejection);
                report.rejections.push(rejection);
            }
        }
    }

    log::info!(
        "Validated {} universities and {} courses ({} rejected)",
        report.universities.len(),
        report.courses.len(),
        report.rejections.len()
    );
    report
}
