// src/models/mod.rs

//! Domain models for the harvester.
//!
//! Raw adapter output, the internal university and course records used by
//! reconciliation, and the strict schema written to disk.

mod config;
mod country;
mod course;
mod raw;
mod schema;
mod university;

// Re-export all public types
pub use config::{Config, CrawlerConfig, OutputConfig, SourcesConfig};
pub use country::{
    API_VERSION, COUNTRY_CODE, COUNTRY_NAME, COUNTRY_REGION, CURRENCY, CURRENCY_SYMBOL,
    CostOfLiving, DATA_SOURCES, LivingCosts, TuitionRange,
};
pub use course::{Course, DegreeLevel};
pub use raw::{RawRecord, SourceBatch};
pub use schema::{
    AccreditationStatus, CountryRecord, CourseRecord, DeliveryFormat, FullDataResponse,
    InstitutionType, Metadata, StudyMode, UniversityRecord,
};
pub use university::University;
