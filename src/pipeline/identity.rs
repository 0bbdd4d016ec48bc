// src/pipeline/identity.rs

//! Identity assignment.
//!
//! Every university and course gets a short content-derived identifier:
//! the first 12 hex characters of the SHA-256 digest of its normalized
//! name. Raw adapter records are converted into typed values here.

use std::sync::LazyLock;

use regex::Regex;
use sha2::{Digest, Sha256};

use crate::models::{Course, CURRENCY, DegreeLevel, DeliveryFormat, RawRecord, University};
use crate::utils::{clean_text, extract_number};

/// Length of every derived identifier, in hex characters.
pub const ID_LEN: usize = 12;

/// Accreditation text given to registry entries flagged as revoked.
pub const REVOKED_STATUS: &str = "Licensure Revoked";

static FORMERLY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\s*\(formerly:.*?\)").expect("formerly pattern"));
static REVOKED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\s*\(licensure revoked\)\s*").expect("revoked pattern"));
static YEARS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(\d+)\s*year").expect("years pattern"));
static MONTHS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(\d+)\s*month").expect("months pattern"));

fn digest(input: &str) -> String {
    let hash = Sha256::digest(input.as_bytes());
    let mut id = hex::encode(hash);
    id.truncate(ID_LEN);
    id
}

/// Identity of a university: depends only on the lowercased, trimmed name.
pub fn university_id(name: &str) -> String {
    digest(name.trim().to_lowercase().as_str())
}

/// Identity of a course: its normalized name joined with the owning
/// university's identity.
pub fn course_id(name: &str, university_id: &str) -> String {
    digest(&format!("{}_{}", name.trim().to_lowercase(), university_id))
}

/// A display name with registry annotations removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanName {
    pub name: String,
    /// The name carried a "(Licensure Revoked)" marker
    pub revoked: bool,
}

/// Collapse whitespace and strip `(formerly: ...)` and
/// `(licensure revoked)` annotations.
pub fn clean_display_name(raw: &str) -> CleanName {
    let collapsed = clean_text(raw);
    let revoked = REVOKED_RE.is_match(&collapsed);
    let without_revoked = REVOKED_RE.replace_all(&collapsed, " ");
    let without_formerly = FORMERLY_RE.replace_all(&without_revoked, "");
    CleanName {
        name: clean_text(&without_formerly),
        revoked,
    }
}

/// Total months in a duration such as "4 years" or "1 year 6 months".
///
/// A duration too large to count in months reads as absent.
pub fn duration_months(text: &str) -> Option<u32> {
    let years = YEARS_RE
        .captures(text)
        .and_then(|c| c[1].parse::<u32>().ok());
    let months = MONTHS_RE
        .captures(text)
        .and_then(|c| c[1].parse::<u32>().ok());

    match (years, months) {
        (None, None) => None,
        (y, m) => y
            .unwrap_or(0)
            .checked_mul(12)
            .and_then(|total| total.checked_add(m.unwrap_or(0))),
    }
}

/// A tuition text broken into its parts.
#[derive(Debug, Clone, PartialEq)]
pub struct Fee {
    pub value: Option<f64>,
    pub currency: &'static str,
    pub period: Option<&'static str>,
}

/// Parse free-form fee text, e.g. "USD 12,500 / year".
pub fn normalize_fee(text: &str) -> Fee {
    let upper = text.to_uppercase();
    let currency = if upper.contains("USD") || text.contains('$') {
        "USD"
    } else if upper.contains("EUR") || text.contains('€') {
        "EUR"
    } else {
        CURRENCY
    };

    let lower = text.to_lowercase();
    let period = if lower.contains("year") || lower.contains("annual") {
        Some("per year")
    } else if lower.contains("month") {
        Some("per month")
    } else if lower.contains("semester") {
        Some("per semester")
    } else if lower.contains("total") {
        Some("total")
    } else {
        None
    };

    Fee {
        value: extract_number(text),
        currency,
        period,
    }
}

/// Build a university from a raw record.
///
/// The identity is derived from the cleaned display name, so two records
/// whose names differ only in case or spacing share one identity.
pub fn assign_university(record: &RawRecord, source: &str) -> University {
    let cleaned = clean_display_name(&record.text("name").unwrap_or_default());
    let id = university_id(&cleaned.name);
    let source = record.text("source").unwrap_or_else(|| source.to_string());

    let mut uni = University::new(id, cleaned.name, source);
    uni.name_arabic = record.text("name_arabic");
    uni.emirate = record.text("emirate");
    uni.city = record.text("city");
    if let Some(country) = record.text("country") {
        uni.country = country;
    }
    uni.institution_type = record.text("institution_type");
    uni.accreditation_status = record
        .text("accreditation_status")
        .or_else(|| cleaned.revoked.then(|| REVOKED_STATUS.to_string()));
    uni.ranking = record.text("ranking");
    uni.ranking_tier = record.text("ranking_tier");
    uni.rating = record.number("rating");
    uni.review_count = record.count("review_count");
    uni.website = record.text("website");
    uni.caa_guid = record.text("caa_guid");
    uni.total_programs = record.count("total_programs").unwrap_or(0);
    uni.bachelor_programs = record.count("bachelor_programs").unwrap_or(0);
    uni.master_programs = record.count("master_programs").unwrap_or(0);
    uni.scholarships_available = record.count("scholarships_available").unwrap_or(0);
    uni.attendance_options = record
        .list("attendance_options")
        .iter()
        .filter_map(|mode| DeliveryFormat::parse(mode))
        .collect();
    uni
}

/// Build a course from a raw record.
///
/// The owning university is provisional: the raw `university_id` if given,
/// else one derived from `university_name`, else empty. Linking may
/// replace it later; the course identity is fixed here.
pub fn assign_course(record: &RawRecord, source: &str) -> Course {
    let name = clean_text(&record.text("name").unwrap_or_default());
    let university_name = record
        .text("university_name")
        .map(|n| clean_display_name(&n).name)
        .unwrap_or_default();
    let provisional = record.text("university_id").unwrap_or_else(|| {
        if university_name.is_empty() {
            String::new()
        } else {
            university_id(&university_name)
        }
    });
    let id = course_id(&name, &provisional);
    let source = record.text("source").unwrap_or_else(|| source.to_string());

    let mut course = Course::new(id, name, provisional, source);
    course.university_name = university_name;
    course.degree_level = record
        .text("degree_level")
        .and_then(|d| DegreeLevel::parse(&d))
        .unwrap_or_else(|| DegreeLevel::infer_from_name(&course.name));
    course.field_of_study = record.text("field_of_study");
    course.duration = record.text("duration");
    course.duration_months = record
        .count("duration_months")
        .or_else(|| course.duration.as_deref().and_then(duration_months));
    course.study_mode = record.text("study_mode");
    course.delivery_format = record.text("delivery_format");

    course.tuition_fee = record.text("tuition_fee");
    let fee = course.tuition_fee.as_deref().map(normalize_fee);
    course.tuition_fee_value = record
        .number("tuition_fee_value")
        .or_else(|| fee.as_ref().and_then(|f| f.value));
    course.tuition_currency = record
        .text("tuition_currency")
        .or_else(|| fee.as_ref().map(|f| f.currency.to_string()))
        .unwrap_or_else(|| CURRENCY.to_string());
    course.tuition_period = record
        .text("tuition_period")
        .or_else(|| fee.as_ref().and_then(|f| f.period).map(str::to_string));

    if let Some(language) = record.text("language") {
        course.language = language;
    }
    course.accredited = record.flag("accredited").unwrap_or(true);
    course.start_dates = record.text("start_dates");
    course.application_deadline = record.text("application_deadline");
    course.url = record.text("url");
    course
}
