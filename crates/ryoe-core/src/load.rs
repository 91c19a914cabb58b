// One-shot fetch of the CSV resource and construction of the dataset.
//
// The source is either an HTTP(S) URL or a local file. Failure is terminal:
// there is no retry, and callers are expected to report it once and stop.

use std::fmt;
use std::path::PathBuf;

use reqwest::header::CACHE_CONTROL;
use thiserror::Error;
use tracing::{info, warn};

use crate::stats::{Columns, Dataset};

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to fetch {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("failed to fetch {url}: {status}")]
    Status { url: String, status: u16 },

    #[error("failed to read file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
}

// ---------------------------------------------------------------------------
// Source
// ---------------------------------------------------------------------------

/// Location of the CSV resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    Url(String),
    Path(PathBuf),
}

impl Source {
    /// `http://` and `https://` strings are URLs; anything else is a path.
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        let lower = raw.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            Source::Url(raw.to_string())
        } else {
            Source::Path(PathBuf::from(raw))
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Url(url) => f.write_str(url),
            Source::Path(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Options for the fetch step.
#[derive(Debug, Clone, Copy)]
pub struct FetchOptions {
    /// Send `Cache-Control: no-store` on HTTP requests.
    pub no_store: bool,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self { no_store: true }
    }
}

// ---------------------------------------------------------------------------
// Fetching
// ---------------------------------------------------------------------------

/// Fetch the raw CSV text.
pub async fn fetch_text(
    http: &reqwest::Client,
    source: &Source,
    options: FetchOptions,
) -> Result<String, LoadError> {
    match source {
        Source::Url(url) => fetch_url(http, url, options).await,
        Source::Path(path) => tokio::fs::read_to_string(path)
            .await
            .map_err(|e| LoadError::Io {
                path: path.display().to_string(),
                source: e,
            }),
    }
}

async fn fetch_url(
    http: &reqwest::Client,
    url: &str,
    options: FetchOptions,
) -> Result<String, LoadError> {
    let mut request = http.get(url);
    if options.no_store {
        request = request.header(CACHE_CONTROL, "no-store");
    }

    let response = request.send().await.map_err(|e| LoadError::Http {
        url: url.to_string(),
        source: e,
    })?;

    let status = response.status();
    if !status.is_success() {
        return Err(LoadError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    response.text().await.map_err(|e| LoadError::Http {
        url: url.to_string(),
        source: e,
    })
}

/// Fetch, decode and aggregate the dataset in one step.
pub async fn load_dataset(
    http: &reqwest::Client,
    source: &Source,
    columns: &Columns,
    options: FetchOptions,
) -> Result<Dataset, LoadError> {
    info!("loading dataset from {source}");
    let text = fetch_text(http, source, options).await?;
    let dataset = Dataset::from_csv_text(&text, columns);

    if dataset.is_empty() {
        warn!("dataset from {source} contains no players");
    } else {
        info!(
            players = dataset.len(),
            strategy = ?dataset.strategy(),
            "dataset ready"
        );
    }
    Ok(dataset)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
