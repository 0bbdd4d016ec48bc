// src/services/portal.rs

//! Ranking portal adapter.
//!
//! Walks the paginated university and programme search results. Each
//! result card yields one raw record; fields are read from the card's
//! text because the portal's markup changes often.
//!
//! The portal renders much of its content client-side, so plain HTTP can
//! come back with few cards. It is disabled unless `portal_enabled` is set.

use std::collections::HashSet;
use std::sync::{Arc, LazyLock};
use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use serde_json::Value;

use super::{Source, element_text, parse_selector};
use crate::error::Result;
use crate::models::{Config, RawRecord, SourceBatch};
use crate::utils::http::{create_async_client, fetch_text};
use crate::utils::{detect_emirate, extract_number};

const SOURCE_NAME: &str = "BachelorsPortal";
const MIN_NAME_LEN: usize = 3;

const CARD: &str = r#"div[class*="card"], div[class*="result"], div[class*="item"], div[class*="programme"], article"#;
const TITLE: &str = r#"h2[class*="title"], h3[class*="title"], h4[class*="title"], a[class*="title"], h2[class*="name"], h3[class*="name"], h4[class*="name"], a[class*="name"]"#;
const UNIVERSITY_LINK: &str = r#"a[href*="/universities/"]"#;
const STUDY_LINK: &str = r#"a[href*="/studies/"]"#;
const LOCATION: &str = r#"[class*="location"], [class*="city"]"#;
const RATING: &str = r#"[class*="rating"], [class*="score"], [class*="star"]"#;
const PROVIDER: &str = r#"[class*="university"], [class*="institution"], [class*="provider"]"#;
const NEXT_LINK: &str = r#"a[rel="next"], [class*="pagination"] [class*="next"]"#;

static TIER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)top\s*\d+(?:\.\d+)?\s*%").expect("tier pattern"));
static BACHELOR_COUNT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(\d+)\s*bachelor").expect("bachelor pattern"));
static SCHOLARSHIP_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(\d+)\s*scholarship").expect("scholarship pattern"));
static ON_CAMPUS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)on.?campus").expect("on-campus pattern"));
static ONLINE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)online").expect("online pattern"));
static BLENDED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)blended|hybrid").expect("blended pattern"));
static FULL_TIME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)full.?time").expect("full-time pattern"));
static PART_TIME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)part.?time").expect("part-time pattern"));
static DURATION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\d+\s*(?:years?|months?)(?:\s*(?:and\s*)?\d+\s*months?)?").expect("duration pattern")
});
static FEE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:AED|USD|EUR|\$|€)\s*[\d,]+(?:\s*(?:/|per)\s*(?:year|month|semester))?")
        .expect("fee pattern")
});
static NEXT_TEXT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(?:next|→|›)").expect("next pattern"));

/// Records parsed from one search results page.
#[derive(Debug, Default)]
pub struct PortalPage {
    pub records: Vec<RawRecord>,
    pub has_next: bool,
}

pub struct BachelorsPortal {
    config: Arc<Config>,
    client: Client,
}

impl BachelorsPortal {
    pub fn new(config: Arc<Config>) -> Result<Self> {
        let client = create_async_client(&config.crawler)?;
        Ok(Self { config, client })
    }

    /// Fetch result pages until one is empty, has no next link, or the
    /// page cap is reached. A failed page ends the walk.
    async fn walk(
        &self,
        base_url: &str,
        max_pages: usize,
        parse: fn(&str) -> Result<PortalPage>,
    ) -> Result<Vec<RawRecord>> {
        let delay = Duration::from_millis(self.config.sources.portal_delay_ms);
        let retry_delay = Duration::from_millis(self.config.crawler.retry_delay_ms);
        let mut records = Vec::new();

        for page in 1..=max_pages {
            let url = if page > 1 {
                format!("{base_url}?page={page}")
            } else {
                base_url.to_string()
            };
            log::info!("Fetching portal page {} ({})", page, url);

            let html = match fetch_text(&self.client, &url, self.config.crawler.max_retries, retry_delay).await {
                Ok(html) => html,
                Err(e) => {
                    log::warn!("Failed to fetch portal page {}: {}", page, e);
                    break;
                }
            };

            let parsed = parse(&html)?;
            if parsed.records.is_empty() {
                log::info!("No more results on page {}", page);
                break;
            }
            records.extend(parsed.records);
            if !parsed.has_next {
                break;
            }
            tokio::time::sleep(delay).await;
        }

        Ok(records)
    }
}

#[async_trait]
impl Source for BachelorsPortal {
    fn name(&self) -> &str {
        SOURCE_NAME
    }

    async fn collect(&self) -> Result<SourceBatch> {
        let mut batch = SourceBatch::new(SOURCE_NAME);
        let sources = &self.config.sources;
        if !sources.portal_enabled {
            log::info!("Skipping {} (portal_enabled = false)", SOURCE_NAME);
            return Ok(batch);
        }

        batch.universities = self
            .walk(
                &sources.portal_universities,
                sources.portal_max_university_pages,
                parse_university_page,
            )
            .await?;
        log::info!("Found {} universities on {}", batch.universities.len(), SOURCE_NAME);

        batch.courses = self
            .walk(
                &sources.portal_programmes,
                sources.portal_max_programme_pages,
                parse_programme_page,
            )
            .await?;
        log::info!("Found {} programmes on {}", batch.courses.len(), SOURCE_NAME);

        Ok(batch)
    }
}

struct Selectors {
    card: Selector,
    title: Selector,
    fallback_title: Selector,
    next: Selector,
    anchor: Selector,
}

impl Selectors {
    fn new(fallback_title: &str) -> Result<Self> {
        Ok(Self {
            card: parse_selector(CARD)?,
            title: parse_selector(TITLE)?,
            fallback_title: parse_selector(fallback_title)?,
            next: parse_selector(NEXT_LINK)?,
            anchor: parse_selector("a")?,
        })
    }

    /// Card title, falling back to the first matching link.
    fn card_name(&self, card: &ElementRef) -> Option<String> {
        let element = card
            .select(&self.title)
            .next()
            .or_else(|| card.select(&self.fallback_title).next())?;
        let name = element_text(&element);
        (name.chars().count() >= MIN_NAME_LEN).then_some(name)
    }

    fn has_next(&self, document: &Html) -> bool {
        document.select(&self.next).next().is_some()
            || document
                .select(&self.anchor)
                .any(|a| NEXT_TEXT_RE.is_match(&element_text(&a)))
    }
}

/// Parse a university search results page.
pub fn parse_university_page(html: &str) -> Result<PortalPage> {
    let document = Html::parse_document(html);
    let sel = Selectors::new(UNIVERSITY_LINK)?;
    let location_sel = parse_selector(LOCATION)?;
    let rating_sel = parse_selector(RATING)?;

    let mut seen = HashSet::new();
    let mut records = Vec::new();

    for card in document.select(&sel.card) {
        let Some(name) = sel.card_name(&card) else {
            continue;
        };
        // Nested card containers repeat the same title
        if !seen.insert(name.to_lowercase()) {
            continue;
        }
        let text = element_text(&card);
        let lower = text.to_lowercase();

        let city = card
            .select(&location_sel)
            .next()
            .map(|el| element_text(&el))
            .and_then(|loc| loc.split(',').next().map(|s| s.trim().to_string()))
            .filter(|s| !s.is_empty());
        let emirate = city
            .as_deref()
            .and_then(detect_emirate)
            .map(str::to_string)
            .or_else(|| city.clone());

        let institution_type = if lower.contains("public") {
            Some("Public")
        } else if lower.contains("private") {
            Some("Private")
        } else {
            None
        };
        let rating = card
            .select(&rating_sel)
            .next()
            .and_then(|el| extract_number(&element_text(&el)));

        let mut attendance = Vec::new();
        if ON_CAMPUS_RE.is_match(&text) {
            attendance.push(Value::from("On-campus"));
        }
        if ONLINE_RE.is_match(&text) {
            attendance.push(Value::from("Online"));
        }
        if BLENDED_RE.is_match(&text) {
            attendance.push(Value::from("Blended"));
        }

        records.push(
            RawRecord::new()
                .with("name", name)
                .with("city", city)
                .with("emirate", emirate)
                .with("institution_type", institution_type)
                .with("rating", rating)
                .with("ranking_tier", TIER_RE.find(&text).map(|m| m.as_str().to_string()))
                .with("bachelor_programs", first_count(&BACHELOR_COUNT_RE, &text))
                .with("scholarships_available", first_count(&SCHOLARSHIP_RE, &text))
                .with("attendance_options", Value::Array(attendance))
                .with("source", SOURCE_NAME),
        );
    }

    Ok(PortalPage {
        has_next: sel.has_next(&document),
        records,
    })
}

/// Parse a programme search results page.
pub fn parse_programme_page(html: &str) -> Result<PortalPage> {
    let document = Html::parse_document(html);
    let sel = Selectors::new(STUDY_LINK)?;
    let provider_sel = parse_selector(PROVIDER)?;

    let mut seen = HashSet::new();
    let mut records = Vec::new();

    for card in document.select(&sel.card) {
        let Some(name) = sel.card_name(&card) else {
            continue;
        };
        let university_name = card
            .select(&provider_sel)
            .next()
            .map(|el| element_text(&el))
            .filter(|s| !s.is_empty());
        let key = (name.to_lowercase(), university_name.clone().unwrap_or_default());
        if !seen.insert(key) {
            continue;
        }
        let text = element_text(&card);

        let study_mode = if FULL_TIME_RE.is_match(&text) {
            Some("Full-time")
        } else if PART_TIME_RE.is_match(&text) {
            Some("Part-time")
        } else {
            None
        };
        let delivery_format = if ON_CAMPUS_RE.is_match(&text) {
            Some("On-campus")
        } else if ONLINE_RE.is_match(&text) {
            Some("Online")
        } else if BLENDED_RE.is_match(&text) {
            Some("Blended")
        } else {
            None
        };

        records.push(
            RawRecord::new()
                .with("name", name)
                .with("university_name", university_name)
                .with("duration", DURATION_RE.find(&text).map(|m| m.as_str().to_string()))
                .with("study_mode", study_mode)
                .with("delivery_format", delivery_format)
                .with("tuition_fee", FEE_RE.find(&text).map(|m| m.as_str().to_string()))
                .with("source", SOURCE_NAME),
        );
    }

    Ok(PortalPage {
        has_next: sel.has_next(&document),
        records,
    })
}

fn first_count(pattern: &Regex, text: &str) -> Option<u32> {
    pattern.captures(text).and_then(|c| c[1].parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DeliveryFormat;
    use crate::pipeline::identity::{assign_course, assign_university};

    const UNIVERSITIES: &str = r#"
        <html><body>
          <div class="search-result-card">
            <article>
              <h2 class="organisation-title">Abu Dhabi University</h2>
              <span class="location">Abu Dhabi, United Arab Emirates</span>
              <span class="rating-value">4.3</span>
              <p>Private · Top 5% worldwide</p>
              <p>31 Bachelors · 4 Scholarships</p>
              <p>On-campus, Online</p>
            </article>
          </div>
          <div class="search-result-card">
            <h3 class="card-title">Khalifa University</h3>
            <span class="city">Abu Dhabi</span>
            <p>Public</p>
          </div>
          <div class="card"><a class="title" href="/universities/x">AB</a></div>
          <nav class="pagination"><a class="next" href="?page=2">Next</a></nav>
        </body></html>
    "#;

    const PROGRAMMES: &str = r#"
        <html><body>
          <div class="programme-card">
            <h3 class="title">Master of Business Administration</h3>
            <span class="university-name">Abu Dhabi Univ</span>
            <p>1 year 6 months · Full-time · On campus</p>
            <p>AED 80,000 / year</p>
          </div>
          <div class="programme-card">
            <a href="/studies/123/law.html">B.A. in Law</a>
            <span class="provider">Zayed University</span>
            <p>4 years · Part-time · Blended</p>
          </div>
        </body></html>
    "#;

    #[test]
    fn university_cards_yield_records() {
        let page = parse_university_page(UNIVERSITIES).unwrap();
        assert!(page.has_next);
        assert_eq!(page.records.len(), 2);

        let adu = &page.records[0];
        assert_eq!(adu.text("name").as_deref(), Some("Abu Dhabi University"));
        assert_eq!(adu.text("city").as_deref(), Some("Abu Dhabi"));
        assert_eq!(adu.text("institution_type").as_deref(), Some("Private"));
        assert_eq!(adu.number("rating"), Some(4.3));
        assert_eq!(adu.text("ranking_tier").as_deref(), Some("Top 5%"));
        assert_eq!(adu.count("bachelor_programs"), Some(31));
        assert_eq!(adu.count("scholarships_available"), Some(4));

        let uni = assign_university(adu, SOURCE_NAME);
        assert!(uni.attendance_options.contains(&DeliveryFormat::OnCampus));
        assert!(uni.attendance_options.contains(&DeliveryFormat::Online));

        assert_eq!(page.records[1].text("institution_type").as_deref(), Some("Public"));
    }

    #[test]
    fn programme_cards_yield_records() {
        let page = parse_programme_page(PROGRAMMES).unwrap();
        assert!(!page.has_next);
        assert_eq!(page.records.len(), 2);

        let mba = assign_course(&page.records[0], SOURCE_NAME);
        assert_eq!(mba.university_name, "Abu Dhabi Univ");
        assert_eq!(mba.duration_months, Some(18));
        assert_eq!(mba.study_mode.as_deref(), Some("Full-time"));
        assert_eq!(mba.delivery_format.as_deref(), Some("On-campus"));
        assert_eq!(mba.tuition_fee_value, Some(80000.0));
        assert_eq!(mba.tuition_period.as_deref(), Some("per year"));

        let law = assign_course(&page.records[1], SOURCE_NAME);
        assert_eq!(law.name, "B.A. in Law");
        assert_eq!(law.duration_months, Some(48));
        assert_eq!(law.study_mode.as_deref(), Some("Part-time"));
        assert_eq!(law.delivery_format.as_deref(), Some("Blended"));
    }

    #[test]
    fn empty_results_page() {
        let page = parse_university_page("<html><body><p>No results</p></body></html>").unwrap();
        assert!(page.records.is_empty());
        assert!(!page.has_next);
    }

    #[tokio::test]
    async fn disabled_portal_returns_empty_batch() {
        let portal = BachelorsPortal::new(Arc::new(Config::default())).unwrap();
        let batch = portal.collect().await.unwrap();
        assert_eq!(batch.source, SOURCE_NAME);
        assert!(batch.is_empty());
    }
}
