//! Application configuration structures.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// HTTP behavior settings
    #[serde(default)]
    pub crawler: CrawlerConfig,

    /// Source endpoints and per-source limits
    #[serde(default)]
    pub sources: SourcesConfig,

    /// Output location
    #[serde(default)]
    pub output: OutputConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.crawler.user_agent.trim().is_empty() {
            return Err(AppError::validation("crawler.user_agent is empty"));
        }
        if self.crawler.timeout_secs == 0 {
            return Err(AppError::validation("crawler.timeout_secs must be > 0"));
        }
        for (key, value) in [
            ("sources.caa_institutions", &self.sources.caa_institutions),
            ("sources.portal_universities", &self.sources.portal_universities),
            ("sources.portal_programmes", &self.sources.portal_programmes),
            ("sources.living_cost", &self.sources.living_cost),
        ] {
            url::Url::parse(value)
                .map_err(|e| AppError::validation(format!("{key} is not a valid URL: {e}")))?;
        }
        if self.sources.caa_max_institutions == Some(0) {
            return Err(AppError::validation(
                "sources.caa_max_institutions must be > 0 when set",
            ));
        }
        if self.output.file_name.trim().is_empty() {
            return Err(AppError::validation("output.file_name is empty"));
        }
        Ok(())
    }
}

/// HTTP client settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlerConfig {
    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// Retries after the first failed attempt
    #[serde(default = "defaults::max_retries")]
    pub max_retries: u32,

    /// Base delay between retries in milliseconds
    #[serde(default = "defaults::retry_delay")]
    pub retry_delay_ms: u64,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
            max_retries: defaults::max_retries(),
            retry_delay_ms: defaults::retry_delay(),
        }
    }
}

/// Source endpoints and polite-crawling limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourcesConfig {
    /// CAA institution list page
    #[serde(default = "defaults::caa_institutions")]
    pub caa_institutions: String,

    /// BachelorsPortal university search
    #[serde(default = "defaults::portal_universities")]
    pub portal_universities: String,

    /// BachelorsPortal programme search
    #[serde(default = "defaults::portal_programmes")]
    pub portal_programmes: String,

    /// University Living cost-of-living article
    #[serde(default = "defaults::living_cost")]
    pub living_cost: String,

    #[serde(default = "defaults::caa_delay")]
    pub caa_delay_ms: u64,

    #[serde(default = "defaults::portal_delay")]
    pub portal_delay_ms: u64,

    #[serde(default = "defaults::living_delay")]
    pub living_delay_ms: u64,

    /// Cap on registry institutions (unset = no cap)
    #[serde(default)]
    pub caa_max_institutions: Option<usize>,

    /// Whether the ranking portal is collected at all
    #[serde(default)]
    pub portal_enabled: bool,

    #[serde(default = "defaults::portal_max_university_pages")]
    pub portal_max_university_pages: usize,

    #[serde(default = "defaults::portal_max_programme_pages")]
    pub portal_max_programme_pages: usize,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            caa_institutions: defaults::caa_institutions(),
            portal_universities: defaults::portal_universities(),
            portal_programmes: defaults::portal_programmes(),
            living_cost: defaults::living_cost(),
            caa_delay_ms: defaults::caa_delay(),
            portal_delay_ms: defaults::portal_delay(),
            living_delay_ms: defaults::living_delay(),
            caa_max_institutions: None,
            portal_enabled: false,
            portal_max_university_pages: defaults::portal_max_university_pages(),
            portal_max_programme_pages: defaults::portal_max_programme_pages(),
        }
    }
}

/// Output file settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Directory the document is written into
    #[serde(default = "defaults::output_dir")]
    pub dir: PathBuf,

    /// Document file name
    #[serde(default = "defaults::file_name")]
    pub file_name: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: defaults::output_dir(),
            file_name: defaults::file_name(),
        }
    }
}

mod defaults {
    use std::path::PathBuf;

    // Crawler defaults
    pub fn user_agent() -> String {
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36".into()
    }
    pub fn timeout() -> u64 {
        15
    }
    pub fn max_retries() -> u32 {
        2
    }
    pub fn retry_delay() -> u64 {
        2000
    }

    // Source defaults
    pub fn caa_institutions() -> String {
        "https://www.caa.ae/Pages/Institutes/All.aspx".into()
    }
    pub fn portal_universities() -> String {
        "https://www.bachelorsportal.com/search/universities/bachelor/united-arab-emirates".into()
    }
    pub fn portal_programmes() -> String {
        "https://www.bachelorsportal.com/search/bachelor/united-arab-emirates".into()
    }
    pub fn living_cost() -> String {
        "https://www.universityliving.com/blog/student-finances/cost-of-living-in-dubai/".into()
    }
    pub fn caa_delay() -> u64 {
        300
    }
    pub fn portal_delay() -> u64 {
        1500
    }
    pub fn living_delay() -> u64 {
        200
    }
    pub fn portal_max_university_pages() -> usize {
        5
    }
    pub fn portal_max_programme_pages() -> usize {
        10
    }

    // Output defaults
    pub fn output_dir() -> PathBuf {
        PathBuf::from("output")
    }
    pub fn file_name() -> String {
        "uae_education_data.json".into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_default_config_ok() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn validate_rejects_empty_user_agent() {
        let mut config = Config::default();
        config.crawler.user_agent = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_bad_source_url() {
        let mut config = Config::default();
        config.sources.living_cost = "not a url".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config: Config = toml::from_str(
            r#"
            [sources]
            portal_enabled = true

            [output]
            dir = "/tmp/out"
            "#,
        )
        .unwrap();

        assert!(config.sources.portal_enabled);
        assert_eq!(config.sources.portal_max_programme_pages, 10);
        assert_eq!(config.output.dir, PathBuf::from("/tmp/out"));
        assert_eq!(config.output.file_name, "uae_education_data.json");
        assert_eq!(config.crawler.max_retries, 2);
    }
}
