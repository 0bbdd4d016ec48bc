// src/services/caa.rs

//! Accreditation registry adapter.
//!
//! The registry lists every licensed institution as a link to its detail
//! page, with the registry reference in the `GUID` query parameter.
//! Revoked institutions carry a "(LICENSURE REVOKED)" suffix.

use std::collections::HashSet;
use std::sync::{Arc, LazyLock};
use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use scraper::Html;

use super::{Source, element_text, parse_selector};
use crate::error::{AppError, Result};
use crate::models::{COUNTRY_NAME, Config, RawRecord, SourceBatch};
use crate::pipeline::identity::{REVOKED_STATUS, clean_display_name};
use crate::utils::detect_emirate;
use crate::utils::http::{create_async_client, fetch_text};

const SOURCE_NAME: &str = "CAA";
const DEFAULT_EMIRATE: &str = "Abu Dhabi";
const DETAIL_LINK: &str = r#"a[href*="/Pages/Institutes/Details.aspx?GUID="]"#;

static GUID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"GUID=(\d+)").expect("guid pattern"));

pub struct CaaRegistry {
    config: Arc<Config>,
    client: Client,
}

impl CaaRegistry {
    pub fn new(config: Arc<Config>) -> Result<Self> {
        let client = create_async_client(&config.crawler)?;
        Ok(Self { config, client })
    }
}

#[async_trait]
impl Source for CaaRegistry {
    fn name(&self) -> &str {
        SOURCE_NAME
    }

    async fn collect(&self) -> Result<SourceBatch> {
        let url = &self.config.sources.caa_institutions;
        log::info!("Fetching institution list from {}", url);

        tokio::time::sleep(Duration::from_millis(self.config.sources.caa_delay_ms)).await;
        let html = fetch_text(
            &self.client,
            url,
            self.config.crawler.max_retries,
            Duration::from_millis(self.config.crawler.retry_delay_ms),
        )
        .await
        .map_err(|e| AppError::source(SOURCE_NAME, e))?;

        let mut batch = SourceBatch::new(SOURCE_NAME);
        batch.universities =
            parse_institutions(&html, self.config.sources.caa_max_institutions)?;
        log::info!("Found {} institutions in the registry", batch.universities.len());
        Ok(batch)
    }
}

/// Parse the registry list page.
///
/// Entries without a GUID are skipped and repeated GUIDs keep the first
/// entry. `limit` caps the number of institutions returned.
pub fn parse_institutions(html: &str, limit: Option<usize>) -> Result<Vec<RawRecord>> {
    let document = Html::parse_document(html);
    let link_sel = parse_selector(DETAIL_LINK)?;

    let mut seen = HashSet::new();
    let mut records = Vec::new();

    for link in document.select(&link_sel) {
        let raw_name = element_text(&link);
        let Some(href) = link.value().attr("href") else {
            continue;
        };
        if raw_name.is_empty() {
            continue;
        }
        let Some(guid) = GUID_RE.captures(href).map(|c| c[1].to_string()) else {
            log::debug!("Skipping registry entry without GUID: {}", raw_name);
            continue;
        };
        if !seen.insert(guid.clone()) {
            continue;
        }

        let cleaned = clean_display_name(&raw_name);
        let status = if cleaned.revoked { REVOKED_STATUS } else { "Licensed" };
        let emirate = detect_emirate(&raw_name).unwrap_or(DEFAULT_EMIRATE);

        records.push(
            RawRecord::new()
                .with("name", cleaned.name)
                .with("emirate", emirate)
                .with("city", emirate)
                .with("country", COUNTRY_NAME)
                .with("accreditation_status", status)
                .with("caa_guid", guid)
                .with("source", SOURCE_NAME),
        );

        if limit.is_some_and(|max| records.len() >= max) {
            break;
        }
    }

    Ok(records)
}
