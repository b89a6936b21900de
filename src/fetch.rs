use std::time::Duration;

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

pub struct FetchConfig {
    pub user_agent: String,
    pub timeout: Duration,
}

pub fn is_remote(source: &str) -> bool {
    source.starts_with("http://") || source.starts_with("https://")
}

/// Page HTML from a URL, or from a saved file for anything that isn't http(s).
pub async fn load_source(config: &FetchConfig, source: &str) -> Result<String> {
    if is_remote(source) {
        return fetch_page(config, source).await;
    }
    info!("Reading local file: {}", source);
    tokio::fs::read_to_string(source)
        .await
        .with_context(|| format!("Failed to read {}", source))
}

/// Fetch a single page. Non-success statuses are errors.
pub async fn fetch_page(config: &FetchConfig, url: &str) -> Result<String> {
    let client = reqwest::Client::builder()
        .user_agent(config.user_agent.as_str())
        .timeout(config.timeout)
        .build()
        .context("Failed to build HTTP client")?;

    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    pb.set_message(format!("Fetching {}", url));
    pb.enable_steady_tick(Duration::from_millis(100));

    info!("Fetching URL: {}", url);
    let result: reqwest::Result<String> = async {
        let response = client.get(url).send().await?.error_for_status()?;
        response.text().await
    }
    .await;
    pb.finish_and_clear();

    let body = result.with_context(|| format!("Failed to fetch {}", url))?;
    info!("URL fetched successfully ({} bytes)", body.len());
    Ok(body)
}
