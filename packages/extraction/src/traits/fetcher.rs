//! Fetcher trait for retrieving a target page.
//!
//! The pipeline never talks to the network directly. It hands a
//! [`FetchRequest`] to a [`Fetcher`], optionally carrying the proxy route the
//! pool picked, and gets back the raw body plus the metadata needed to decide
//! whether the body is a document at all.
//!
//! # Usage
//!
//! ```rust,ignore
//! use extraction::traits::fetcher::{FetchRequest, Fetcher};
//!
//! let request = FetchRequest::new("https://example.com").with_proxy(route);
//! let page = fetcher.fetch(&request).await?;
//! ```

use async_trait::async_trait;
use std::collections::HashMap;

use crate::error::FetchResult;
use crate::security::ProxyCredentials;
use crate::types::proxy::Proxy;

/// Where to send a request when it should go through a proxy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyRoute {
    /// `scheme://host:port`, never carrying credentials
    pub url: String,
    pub credentials: Option<ProxyCredentials>,
}

impl From<&Proxy> for ProxyRoute {
    fn from(proxy: &Proxy) -> Self {
        Self {
            url: proxy.url(),
            credentials: proxy.credentials.clone(),
        }
    }
}

/// One page retrieval.
#[derive(Debug, Clone)]
pub struct FetchRequest {
    pub url: String,
    pub headers: HashMap<String, String>,
    pub proxy: Option<ProxyRoute>,
}

impl FetchRequest {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            headers: HashMap::new(),
            proxy: None,
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn with_proxy(mut self, route: ProxyRoute) -> Self {
        self.proxy = Some(route);
        self
    }
}

/// A successfully retrieved response.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// Final URL after redirects
    pub url: String,
    pub status: u16,
    pub body: String,
    pub content_type: Option<String>,
}

impl FetchedPage {
    pub fn html(url: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            status: 200,
            body: body.into(),
            content_type: Some("text/html; charset=utf-8".to_string()),
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Whether the body can be parsed as a document.
    ///
    /// A missing content type is given the benefit of the doubt.
    pub fn is_document(&self) -> bool {
        match &self.content_type {
            None => true,
            Some(content_type) => {
                let mime = content_type
                    .split(';')
                    .next()
                    .unwrap_or_default()
                    .trim()
                    .to_ascii_lowercase();
                mime == "text/html" || mime == "application/xhtml+xml" || mime.is_empty()
            }
        }
    }
}

/// Retrieves pages for the extraction pipeline.
///
/// Implementations:
/// - `HttpFetcher` - reqwest, with per-request proxy routing
/// - `MockFetcher` - canned pages for tests
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetch one page. Non-2xx responses are errors.
    async fn fetch(&self, request: &FetchRequest) -> FetchResult<FetchedPage>;

    /// Get the fetcher name (for logging/debugging).
    fn name(&self) -> &str {
        "unknown"
    }
}
