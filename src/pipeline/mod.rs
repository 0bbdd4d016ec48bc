//! Reconciliation pipeline.
//!
//! - `identity`: Derive ids and convert raw records
//! - `reconcile`: Merge universities across sources, link courses
//! - `dedup`: Drop repeated courses
//! - `validate`: Map into the output schema
//! - `compose`: Build the country aggregate and document
//! - `run`: Collect, build and store in one pass

pub mod compose;
pub mod dedup;
pub mod identity;
pub mod reconcile;
pub mod run;
pub mod validate;

pub use compose::{Summary, compose};
pub use dedup::dedupe_courses;
pub use identity::{assign_course, assign_university, course_id, university_id};
pub use reconcile::{LinkIndex, link_courses, matching_key, merge_universities};
pub use run::{BuiltDocument, RunReport, build_document, run, run_pipeline};
pub use validate::{Rejection, Validated, ValidationReport, map_course, map_university, validate_all};
