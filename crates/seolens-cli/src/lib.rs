//! Input loading, terminal rendering and progress display for the
//! `seolens` binary

pub mod progress;
pub mod render;

use anyhow::{Context, Result};
use reqwest::Client;
use seolens_core::{ContentContext, SeolensConfig};
use std::fs;
use std::io::Read;
use std::path::Path;
use std::time::Duration;
use url::Url;

pub use progress::ProgressBarSink;

const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Read a page from a file path, `-` for stdin, or an http(s) URL
pub async fn load_input(input: &str) -> Result<String> {
    if input == "-" {
        let mut html = String::new();
        std::io::stdin()
            .read_to_string(&mut html)
            .context("failed to read HTML from stdin")?;
        return Ok(html);
    }

    if let Some(url) = input_url(input) {
        return fetch(url.as_str()).await;
    }

    fs::read_to_string(input).with_context(|| format!("failed to read {}", input))
}

/// The input parsed as a URL when it names a remote page
pub fn input_url(input: &str) -> Option<Url> {
    if !(input.starts_with("http://") || input.starts_with("https://")) {
        return None;
    }
    Url::parse(input).ok()
}

async fn fetch(url: &str) -> Result<String> {
    let client = Client::builder()
        .timeout(FETCH_TIMEOUT)
        .user_agent(concat!("seolens/", env!("CARGO_PKG_VERSION")))
        .build()
        .context("failed to build HTTP client")?;

    let response = client
        .get(url)
        .send()
        .await
        .with_context(|| format!("failed to fetch {}", url))?;

    response
        .error_for_status()
        .with_context(|| format!("non-success status from {}", url))?
        .text()
        .await
        .with_context(|| format!("failed to read response body from {}", url))
}

/// Page metadata from a JSON file, if one was given
pub fn load_context(path: Option<&Path>) -> Result<Option<ContentContext>> {
    let Some(path) = path else {
        return Ok(None);
    };
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read context file {}", path.display()))?;
    let context: ContentContext = serde_json::from_str(&raw)
        .with_context(|| format!("invalid context JSON in {}", path.display()))?;
    Ok(Some(context))
}

/// Configuration from an optional file, then `SEOLENS_*` environment overrides
pub fn load_config(path: Option<&Path>) -> Result<SeolensConfig> {
    load_config_with(path, |key| std::env::var(key).ok())
}

pub fn load_config_with<F>(path: Option<&Path>, lookup: F) -> Result<SeolensConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = match path {
        Some(path) => SeolensConfig::from_file(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => SeolensConfig::default(),
    };
    config
        .apply_overrides_from(lookup)
        .context("invalid SEOLENS_* environment override")?;
    config.validate().context("invalid configuration")?;
    Ok(config)
}

/// Write `contents` to `path`, creating parent directories
pub fn write_output(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).with_context(|| {
                format!("failed to create output directory {}", parent.display())
            })?;
        }
    }
    fs::write(path, contents)
        .with_context(|| format!("failed to write output file {}", path.display()))
}
