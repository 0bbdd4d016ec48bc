// src/utils/http.rs

//! HTTP client utilities.

use std::time::Duration;

use crate::error::Result;
use crate::models::CrawlerConfig;

/// Create a configured asynchronous HTTP client.
pub fn create_async_client(config: &CrawlerConfig) -> Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .user_agent(&config.user_agent)
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()?;
    Ok(client)
}

/// Fetch a page body as text, retrying failed attempts.
///
/// Makes at most `1 + max_retries` requests, waiting `retry_delay * attempt`
/// between them. Non-2xx responses count as failures.
pub async fn fetch_text(
    client: &reqwest::Client,
    url: &str,
    max_retries: u32,
    retry_delay: Duration,
) -> Result<String> {
    let mut attempt = 0;
    loop {
        match fetch_once(client, url).await {
            Ok(text) => return Ok(text),
            Err(e) if attempt < max_retries => {
                attempt += 1;
                log::warn!(
                    "Fetch failed for {} ({}), retry {}/{}",
                    url,
                    e,
                    attempt,
                    max_retries
                );
                tokio::time::sleep(retry_delay * attempt).await;
            }
            Err(e) => return Err(e),
        }
    }
}

async fn fetch_once(client: &reqwest::Client, url: &str) -> Result<String> {
    let text = client
        .get(url)
        .send()
        .await?
        .error_for_status()?
        .text()
        .await?;
    Ok(text)
}
