//! Extraction adapters, one per source.
//!
//! - `CaaRegistry`: the government accreditation registry
//! - `BachelorsPortal`: the ranking/listing portal
//! - `UniversityLiving`: the cost-of-living article
//!
//! Adapters fetch with the shared HTTP client and parse with `scraper` in
//! plain synchronous functions, so parsing can be tested on fixtures.

mod caa;
mod living;
mod portal;

use async_trait::async_trait;
use scraper::{ElementRef, Selector};

use crate::error::{AppError, Result};
use crate::models::{LivingCosts, SourceBatch};
use crate::utils::clean_text;

pub use caa::{CaaRegistry, parse_institutions};
pub use living::{UniversityLiving, parse_living_costs};
pub use portal::{BachelorsPortal, PortalPage, parse_programme_page, parse_university_page};

/// A source of raw university and course records.
#[async_trait]
pub trait Source: Send + Sync {
    /// Provenance label attached to every record
    fn name(&self) -> &str;

    /// Collect everything the source offers. Partial page failures are
    /// absorbed; an `Err` means the source as a whole was unusable.
    async fn collect(&self) -> Result<SourceBatch>;
}

/// A source of the per-run cost-of-living bands.
#[async_trait]
pub trait CostSource: Send + Sync {
    /// Always returns complete bands, falling back to defaults.
    async fn collect(&self) -> LivingCosts;
}

pub(crate) fn parse_selector(s: &str) -> Result<Selector> {
    Selector::parse(s).map_err(|e| AppError::selector(s, format!("{e:?}")))
}

/// Whitespace-normalized text content of an element.
pub(crate) fn element_text(element: &ElementRef) -> String {
    clean_text(&element.text().collect::<Vec<_>>().join(" "))
}
