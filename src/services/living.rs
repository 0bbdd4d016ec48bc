//! Cost-of-living adapter.
//!
//! Starts from fixed student-budget bands and overrides the monthly total
//! and the undergraduate tuition band when the article states them.

use std::sync::{Arc, LazyLock};
use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use scraper::Html;

use super::CostSource;
use crate::error::Result;
use crate::models::{Config, LivingCosts};
use crate::utils::clean_text;
use crate::utils::http::{create_async_client, fetch_text};

// "AED 4,500 – AED 6,500 per month"
static TOTAL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)AED\s*(\d[\d,]*)\s*[-–]\s*AED\s*(\d[\d,]*)\s*per\s*month").expect("total pattern")
});
// "tuition ... AED 25,000 to AED 75,000"
static TUITION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)tuition.*?AED\s*(\d[\d,]*)\s*[-–to]+\s*(?:AED\s*)?(\d[\d,]*)")
        .expect("tuition pattern")
});

pub struct UniversityLiving {
    config: Arc<Config>,
    client: Client,
}

impl UniversityLiving {
    pub fn new(config: Arc<Config>) -> Result<Self> {
        let client = create_async_client(&config.crawler)?;
        Ok(Self { config, client })
    }
}

#[async_trait]
impl CostSource for UniversityLiving {
    async fn collect(&self) -> LivingCosts {
        let url = &self.config.sources.living_cost;
        log::info!("Fetching cost of living from {}", url);

        tokio::time::sleep(Duration::from_millis(self.config.sources.living_delay_ms)).await;
        match fetch_text(
            &self.client,
            url,
            self.config.crawler.max_retries,
            Duration::from_millis(self.config.crawler.retry_delay_ms),
        )
        .await
        {
            Ok(html) => parse_living_costs(&html),
            Err(e) => {
                log::warn!("Cost of living unavailable ({}), using defaults", e);
                LivingCosts::default()
            }
        }
    }
}

/// Extract cost bands from the article, keeping defaults for anything not
/// stated. A band is only overridden when its minimum does not exceed its
/// maximum.
pub fn parse_living_costs(html: &str) -> LivingCosts {
    let document = Html::parse_document(html);
    let text = clean_text(&document.root_element().text().collect::<Vec<_>>().join(" "));
    let mut costs = LivingCosts::default();

    if let Some((min, max)) = band(&TOTAL_RE, &text) {
        costs.cost_of_living.total_min = min;
        costs.cost_of_living.total_max = max;
    } else {
        log::debug!("No monthly total found, keeping default band");
    }

    if let Some((min, max)) = band(&TUITION_RE, &text) {
        costs.tuition_range.undergraduate_min = min;
        costs.tuition_range.undergraduate_max = max;
    } else {
        log::debug!("No tuition range found, keeping default band");
    }

    costs
}

fn band(pattern: &Regex, text: &str) -> Option<(f64, f64)> {
    let caps = pattern.captures(text)?;
    let min: f64 = caps[1].replace(',', "").parse().ok()?;
    let max: f64 = caps[2].replace(',', "").parse().ok()?;
    (min <= max).then_some((min, max))
}
