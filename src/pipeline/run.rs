// src/pipeline/run.rs

//! End-to-end harvest run.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};

use super::compose::{Summary, compose};
use super::dedup::dedupe_courses;
use super::identity::{assign_course, assign_university};
use super::reconcile::{link_courses, merge_universities};
use super::validate::{Rejection, validate_all};
use crate::error::Result;
use crate::models::{Config, FullDataResponse, LivingCosts, SourceBatch};
use crate::services::{BachelorsPortal, CaaRegistry, CostSource, Source, UniversityLiving};
use crate::storage::{DocumentStorage, LocalStorage};

/// The assembled document plus what was dropped on the way.
#[derive(Debug)]
pub struct BuiltDocument {
    pub document: FullDataResponse,
    pub rejections: Vec<Rejection>,
    /// Fields dropped from records that were kept
    pub warnings: usize,
}

/// Outcome of a successful run.
#[derive(Debug)]
pub struct RunReport {
    pub path: PathBuf,
    pub summary: Summary,
    pub rejections: Vec<Rejection>,
    pub warnings: usize,
    /// Sources that contributed nothing because collection failed
    pub failed_sources: Vec<String>,
    pub duration: Duration,
}

/// Turn collected batches into the output document.
///
/// Batches are reconciled in the order given, so the first batch wins
/// conflicting optional fields.
pub fn build_document(
    batches: Vec<SourceBatch>,
    costs: LivingCosts,
    scraped_at: DateTime<Utc>,
) -> BuiltDocument {
    let mut university_batches = Vec::with_capacity(batches.len());
    let mut courses = Vec::new();

    for batch in &batches {
        university_batches.push(
            batch
                .universities
                .iter()
                .map(|record| assign_university(record, &batch.source))
                .collect::<Vec<_>>(),
        );
        courses.extend(
            batch
                .courses
                .iter()
                .map(|record| assign_course(record, &batch.source)),
        );
    }

    let universities = merge_universities(university_batches);
    let courses = dedupe_courses(link_courses(&universities, courses));
    let report = validate_all(universities, courses);

    BuiltDocument {
        document: compose(report.universities, report.courses, costs, scraped_at),
        rejections: report.rejections,
        warnings: report.warnings,
    }
}

/// Collect every source in turn, build the document and store it.
///
/// A source that fails contributes an empty batch. Only a storage failure
/// fails the run.
pub async fn run_pipeline(
    sources: &[Box<dyn Source>],
    cost_source: &dyn CostSource,
    storage: &dyn DocumentStorage,
) -> Result<RunReport> {
    let started = Instant::now();
    let mut batches = Vec::with_capacity(sources.len());
    let mut failed_sources = Vec::new();

    for source in sources {
        log::info!("Collecting from {}", source.name());
        match source.collect().await {
            Ok(batch) => {
                log::info!(
                    "{}: {} university records, {} course records",
                    source.name(),
                    batch.universities.len(),
                    batch.courses.len()
                );
                batches.push(batch);
            }
            Err(e) => {
                log::warn!("{} failed, continuing without it: {}", source.name(), e);
                failed_sources.push(source.name().to_string());
                batches.push(SourceBatch::empty(source.name()));
            }
        }
    }

    let costs = cost_source.collect().await;
    let built = build_document(batches, costs, Utc::now());
    let path = storage.write_document(&built.document).await?;

    Ok(RunReport {
        path,
        summary: Summary::of(&built.document),
        rejections: built.rejections,
        warnings: built.warnings,
        failed_sources,
        duration: started.elapsed(),
    })
}

/// Run against the live sources with the given configuration.
pub async fn run(config: Config) -> Result<RunReport> {
    config.validate()?;
    let config = Arc::new(config);

    let sources: Vec<Box<dyn Source>> = vec![
        Box::new(CaaRegistry::new(Arc::clone(&config))?),
        Box::new(BachelorsPortal::new(Arc::clone(&config))?),
    ];
    let living = UniversityLiving::new(Arc::clone(&config))?;
    let storage = LocalStorage::from_config(&config.output);

    run_pipeline(&sources, &living, &storage).await
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use tempfile::tempdir;

    use super::*;
    use crate::error::AppError;
    use crate::models::{AccreditationStatus, CostOfLiving, RawRecord};
    use crate::pipeline::identity::university_id;

    struct FakeSource {
        name: String,
        batch: Option<SourceBatch>,
    }

    impl FakeSource {
        fn ok(batch: SourceBatch) -> Box<dyn Source> {
            Box::new(Self {
                name: batch.source.clone(),
                batch: Some(batch),
            })
        }

        fn failing(name: &str) -> Box<dyn Source> {
            Box::new(Self {
                name: name.to_string(),
                batch: None,
            })
        }
    }

    #[async_trait]
    impl Source for FakeSource {
        fn name(&self) -> &str {
            &self.name
        }

        async fn collect(&self) -> Result<SourceBatch> {
            self.batch
                .clone()
                .ok_or_else(|| AppError::source(self.name.as_str(), "connection refused"))
        }
    }

    struct FixedCosts(LivingCosts);

    #[async_trait]
    impl CostSource for FixedCosts {
        async fn collect(&self) -> LivingCosts {
            self.0.clone()
        }
    }

    fn named(name: &str) -> RawRecord {
        RawRecord::new().with("name", name)
    }

    fn registry() -> SourceBatch {
        let mut batch = SourceBatch::new("CAA");
        batch.universities = vec![
            named("UAE University").with("accreditation_status", "Licensed"),
            named("Abu Dhabi University").with("accreditation_status", "Licensed"),
            named("Example College (Licensure Revoked)"),
        ];
        batch
    }

    fn portal() -> SourceBatch {
        let mut batch = SourceBatch::new("BachelorsPortal");
        batch.universities = vec![
            named("uae   university").with("rating", 4.4).with("bachelor_programs", 40),
            RawRecord::new().with("city", "Sharjah"),
        ];
        batch.courses = vec![
            named("Accounting").with("university_name", "Abu Dhabi Univ"),
            named("Accounting").with("university_name", "Abu Dhabi University"),
            named("Law"),
        ];
        batch
    }

    fn build(batches: Vec<SourceBatch>) -> BuiltDocument {
        build_document(batches, LivingCosts::default(), Utc::now())
    }

    #[test]
    fn whitespace_duplicates_merge_across_sources() {
        let built = build(vec![registry(), portal()]);
        let uaeu: Vec<_> = built
            .document
            .universities
            .iter()
            .filter(|u| u.name.eq_ignore_ascii_case("UAE University"))
            .collect();

        assert_eq!(uaeu.len(), 1);
        assert_eq!(uaeu[0].id, university_id("UAE University"));
        assert_eq!(uaeu[0].rating, Some(4.4));
        assert_eq!(uaeu[0].bachelor_programs, 40);
        assert_eq!(uaeu[0].source, "CAA, BachelorsPortal");
    }

    #[test]
    fn revoked_suffix_maps_to_revoked_status() {
        let built = build(vec![registry()]);
        let example = built
            .document
            .universities
            .iter()
            .find(|u| u.name == "Example College")
            .unwrap();
        assert_eq!(example.accreditation_status, AccreditationStatus::Revoked);
    }

    #[test]
    fn short_university_name_links_by_substring() {
        let built = build(vec![registry(), portal()]);
        let adu = university_id("Abu Dhabi University");
        let accounting: Vec<_> = built
            .document
            .courses
            .iter()
            .filter(|c| c.name == "Accounting")
            .collect();

        // Both spellings link to the same university and collapse into one course
        assert_eq!(accounting.len(), 1);
        assert_eq!(accounting[0].university_id, adu);
        assert_eq!(accounting[0].university_name, "Abu Dhabi Univ");
    }

    #[test]
    fn nameless_records_are_dropped_without_failing() {
        let built = build(vec![registry(), portal()]);
        let doc = &built.document;

        // 3 registry + 2 portal records, one merged, one nameless
        assert_eq!(doc.universities.len(), 3);
        assert_eq!(doc.country.total_universities, 3);
        // "Law" has no university reference
        assert_eq!(doc.courses.len(), 1);
        assert_eq!(doc.country.total_courses, 1);
        assert_eq!(built.rejections.len(), 2);
    }

    #[test]
    fn downgraded_fields_are_counted() {
        let mut portal = SourceBatch::new("BachelorsPortal");
        portal.universities = vec![named("Zayed University").with("rating", 7.5)];
        portal.courses = vec![
            named("Law")
                .with("university_name", "Zayed University")
                .with("study_mode", "whenever"),
        ];

        let built = build(vec![portal]);
        assert_eq!(built.warnings, 2);
        assert_eq!(built.document.universities[0].rating, None);
        assert_eq!(built.document.courses[0].study_mode, None);
        assert!(built.rejections.is_empty());
    }

    #[test]
    fn source_order_decides_conflicting_scalars() {
        let mut caa = SourceBatch::new("CAA");
        caa.universities = vec![named("Zayed University").with("emirate", "Abu Dhabi")];
        let mut portal = SourceBatch::new("BachelorsPortal");
        portal.universities = vec![named("Zayed University").with("emirate", "Dubai")];

        let forward = build(vec![caa.clone(), portal.clone()]);
        let backward = build(vec![portal, caa]);
        assert_eq!(forward.document.universities[0].emirate.as_deref(), Some("Abu Dhabi"));
        assert_eq!(backward.document.universities[0].emirate.as_deref(), Some("Dubai"));
    }

    #[tokio::test]
    async fn failed_sources_still_produce_a_document() {
        let dir = tempdir().unwrap();
        let storage = LocalStorage::new(dir.path(), "out.json");
        let sources = vec![FakeSource::ok(registry()), FakeSource::failing("BachelorsPortal")];

        let report = run_pipeline(&sources, &FixedCosts(LivingCosts::default()), &storage)
            .await
            .unwrap();

        assert_eq!(report.failed_sources, vec!["BachelorsPortal"]);
        assert_eq!(report.summary.total_universities, 3);
        assert_eq!(report.summary.licensed(), 2);
        assert_eq!(report.summary.revoked(), 1);
        assert!(report.path.exists());
    }

    #[tokio::test]
    async fn unreachable_cost_source_writes_default_bands() {
        let dir = tempdir().unwrap();
        let storage = LocalStorage::new(dir.path(), "out.json");

        let mut config = Config::default();
        config.sources.living_cost = "http://127.0.0.1:9/cost-of-living".to_string();
        config.sources.living_delay_ms = 0;
        config.crawler.max_retries = 0;
        config.crawler.timeout_secs = 1;
        let living = UniversityLiving::new(Arc::new(config)).unwrap();

        let sources = vec![FakeSource::ok(registry())];
        run_pipeline(&sources, &living, &storage).await.unwrap();

        let written = storage.load_document().await.unwrap().unwrap();
        let costs = &written.country.cost_of_living;
        assert_eq!(costs, &CostOfLiving::default());
        assert_eq!((costs.accommodation_min, costs.accommodation_max), (3500.0, 6000.0));
        assert_eq!((costs.food_min, costs.food_max), (500.0, 1200.0));
        assert_eq!((costs.transport_min, costs.transport_max), (350.0, 500.0));
        assert_eq!((costs.utilities_min, costs.utilities_max), (300.0, 600.0));
        assert_eq!((costs.total_min, costs.total_max), (4500.0, 6500.0));
    }

    #[tokio::test]
    async fn storage_failure_fails_the_run() {
        let dir = tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, b"x").unwrap();
        let storage = LocalStorage::new(&blocker, "out.json");

        let sources = vec![FakeSource::ok(registry())];
        let result = run_pipeline(&sources, &FixedCosts(LivingCosts::default()), &storage).await;
        assert!(result.is_err());
    }
}
