// src/pipeline/reconcile.rs

//! Entity reconciliation.
//!
//! Universities reported by several sources are collapsed into one
//! canonical record per matching key, and courses are pointed at the
//! canonical university whose key best matches their university name.
//!
//! ## Matching key
//!
//! Lowercase the name, drop the stop words below, concatenate the rest and
//! keep alphanumeric characters only:
//!
//! ```text
//! "The American University of Sharjah"  ->  "americansharjah"
//! "American University, Sharjah"        ->  "americansharjah"
//! ```
//!
//! Keys are coarse on purpose. Two different institutions that reduce to
//! the same key will be merged.

use std::collections::HashMap;

use crate::models::{Course, University};

const STOP_WORDS: [&str; 9] = [
    "university",
    "college",
    "institute",
    "of",
    "the",
    "in",
    "for",
    "and",
    "&",
];

/// Matching key for a university or course-owner name.
pub fn matching_key(name: &str) -> String {
    name.to_lowercase()
        .split_whitespace()
        .filter(|word| !STOP_WORDS.contains(word))
        .flat_map(str::chars)
        .filter(|c| c.is_alphanumeric())
        .collect()
}

/// Matching key of the first two words, for names longer than one word.
pub fn first_two_words_key(name: &str) -> Option<String> {
    let words: Vec<&str> = name.split_whitespace().collect();
    if words.len() < 2 {
        return None;
    }
    let key = matching_key(&words[..2].join(" "));
    (!key.is_empty()).then_some(key)
}

/// Collapse duplicates across batches, processed in the given order.
///
/// The first record seen for a key provides the identity and wins every
/// optional scalar it has. Output keeps first-seen key order. Records
/// whose key is empty are passed through individually.
pub fn merge_universities(batches: Vec<Vec<University>>) -> Vec<University> {
    let mut merged: Vec<University> = Vec::new();
    let mut by_key: HashMap<String, usize> = HashMap::new();
    let mut duplicates = 0usize;

    for uni in batches.into_iter().flatten() {
        let key = matching_key(&uni.name);
        if key.is_empty() {
            merged.push(uni);
            continue;
        }

        match by_key.get(&key) {
            Some(&pos) => {
                log::debug!("Merging '{}' into '{}' (key {})", uni.name, merged[pos].name, key);
                merged[pos] = merged[pos].clone().merged_with(&uni);
                duplicates += 1;
            }
            None => {
                by_key.insert(key, merged.len());
                merged.push(uni);
            }
        }
    }

    log::info!(
        "Merged universities: {} canonical, {} duplicates folded",
        merged.len(),
        duplicates
    );
    merged
}

/// Lookup from matching keys to canonical university ids.
///
/// Entries are kept in insertion order: for each university its full key,
/// then its first-two-words key. Exact lookups only consider full keys.
#[derive(Debug, Default)]
pub struct LinkIndex {
    full: HashMap<String, String>,
    entries: Vec<(String, String)>,
}

impl LinkIndex {
    pub fn build(universities: &[University]) -> Self {
        let mut index = Self::default();
        for uni in universities {
            let key = matching_key(&uni.name);
            if !key.is_empty() {
                index.full.entry(key.clone()).or_insert_with(|| uni.id.clone());
                index.entries.push((key, uni.id.clone()));
            }
            if let Some(short) = first_two_words_key(&uni.name) {
                index.entries.push((short, uni.id.clone()));
            }
        }
        index
    }

    /// Canonical id for a university name, if any entry matches.
    ///
    /// Exact full-key match first, then the first entry whose key contains
    /// or is contained in the name's key.
    pub fn resolve(&self, university_name: &str) -> Option<&str> {
        let key = matching_key(university_name);
        if key.is_empty() {
            return None;
        }
        if let Some(id) = self.full.get(&key) {
            return Some(id);
        }
        self.entries
            .iter()
            .find(|(entry, _)| key.contains(entry.as_str()) || entry.contains(key.as_str()))
            .map(|(_, id)| id.as_str())
    }
}

/// Point each course at its canonical university.
///
/// Courses with no university name, or whose name resolves to nothing,
/// keep their provisional owner. Course ids are never changed.
pub fn link_courses(universities: &[University], courses: Vec<Course>) -> Vec<Course> {
    let index = LinkIndex::build(universities);
    let total = courses.len();
    let mut linked = 0usize;

    let courses: Vec<Course> = courses
        .into_iter()
        .map(|course| {
            if course.university_name.is_empty() {
                return course;
            }
            match index.resolve(&course.university_name) {
                Some(id) => {
                    linked += 1;
                    course.relinked(id)
                }
                None => {
                    log::debug!(
                        "No university matched '{}' for course '{}'",
                        course.university_name,
                        course.name
                    );
                    course
                }
            }
        })
        .collect();

    log::info!("Linked {} of {} courses to universities", linked, total);
    courses
}
