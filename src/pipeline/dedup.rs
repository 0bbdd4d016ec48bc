//! Course deduplication.

use std::collections::HashSet;

use crate::models::{Course, DegreeLevel};

/// Drop repeated courses, keeping the first occurrence.
///
/// Two courses are the same when their lowercased trimmed names, owning
/// university ids and degree levels are all equal.
pub fn dedupe_courses(courses: Vec<Course>) -> Vec<Course> {
    let mut seen: HashSet<(String, String, DegreeLevel)> = HashSet::new();
    let total = courses.len();

    let unique: Vec<Course> = courses
        .into_iter()
        .filter(|course| {
            let key = (
                course.name.trim().to_lowercase(),
                course.university_id.clone(),
                course.degree_level,
            );
            let fresh = seen.insert(key);
            if !fresh {
                log::debug!("Dropping duplicate course '{}' ({})", course.name, course.university_id);
            }
            fresh
        })
        .collect();

    if unique.len() < total {
        log::debug!("Removed {} duplicate courses", total - unique.len());
    }
    unique
}
