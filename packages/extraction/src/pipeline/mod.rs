//! Extraction pipeline.
//!
//! The pipeline orchestrates one extraction request:
//! - URL validation
//! - Optional proxy acquisition from the [`ProxyPool`](crate::pool::ProxyPool)
//! - Fetch with a fixed deadline
//! - Document parse and per-locator text extraction
//! - Reporting the outcome back to the pool

mod document;
mod extract;

pub use document::{apply_locators, read_document, resolve_locator, PageDocument};
pub use extract::Extractor;

use std::time::Duration;
use url::Url;

use crate::error::{ExtractionError, Result};

/// Deadline for a single page fetch.
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// `User-Agent` sent with every page fetch.
pub const USER_AGENT: &str =
    "Mozilla/5.0 (compatible; LocatorExtractor/0.1; +https://github.com/fourthplaces)";

/// Parse a target URL, accepting only `http` and `https`.
pub fn validate_target_url(raw: &str) -> Result<Url> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(ExtractionError::validation("url is required"));
    }

    let url = Url::parse(raw)
        .map_err(|e| ExtractionError::validation(format!("invalid url {raw:?}: {e}")))?;

    match url.scheme() {
        "http" | "https" if url.host_str().is_some() => Ok(url),
        "http" | "https" => Err(ExtractionError::validation(format!(
            "url {raw:?} has no host"
        ))),
        scheme => Err(ExtractionError::validation(format!(
            "unsupported url scheme {scheme:?}, expected http or https"
        ))),
    }
}
