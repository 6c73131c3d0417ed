//! Mock fetcher for testing.
//!
//! Provides a configurable mock implementation of the Fetcher trait.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use crate::error::{FetchError, FetchResult};
use crate::traits::fetcher::{FetchRequest, FetchedPage, Fetcher};

/// Canned outcome for one URL.
#[derive(Debug, Clone)]
pub enum MockResponse {
    Page(FetchedPage),
    Status(u16),
    Unreachable,
}

/// Mock fetcher for testing.
///
/// Unknown URLs behave like an unreachable host.
///
/// # Example
///
/// ```rust
/// use extraction::fetchers::MockFetcher;
///
/// let mock = MockFetcher::new().with_html("https://example.com", "<h1>Title</h1>");
/// assert_eq!(mock.call_count(), 0);
/// ```
#[derive(Debug, Default, Clone)]
pub struct MockFetcher {
    responses: Arc<RwLock<HashMap<String, MockResponse>>>,
    delay: Arc<RwLock<Option<Duration>>>,
    calls: Arc<RwLock<Vec<FetchRequest>>>,
}

impl MockFetcher {
    /// Create a new empty mock fetcher.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_response(&self, url: impl Into<String>, response: MockResponse) {
        self.responses
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(url.into(), response);
    }

    /// Serve `html` as `text/html` for `url` (builder pattern).
    pub fn with_html(self, url: impl Into<String>, html: impl Into<String>) -> Self {
        let url = url.into();
        let page = FetchedPage::html(url.clone(), html);
        self.add_response(url, MockResponse::Page(page));
        self
    }

    pub fn with_page(self, page: FetchedPage) -> Self {
        self.add_response(page.url.clone(), MockResponse::Page(page));
        self
    }

    pub fn with_status(self, url: impl Into<String>, status: u16) -> Self {
        self.add_response(url, MockResponse::Status(status));
        self
    }

    /// Wait this long before answering every request.
    pub fn with_delay(self, delay: Duration) -> Self {
        *self.delay.write().unwrap_or_else(PoisonError::into_inner) = Some(delay);
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Requests received so far, in arrival order.
    pub fn calls(&self) -> Vec<FetchRequest> {
        self.calls
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Clear recorded calls.
    pub fn reset_calls(&self) {
        self.calls
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

#[async_trait]
impl Fetcher for MockFetcher {
    async fn fetch(&self, request: &FetchRequest) -> FetchResult<FetchedPage> {
        // Record the call
        self.calls
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(request.clone());

        let delay = *self.delay.read().unwrap_or_else(PoisonError::into_inner);
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let response = self
            .responses
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&request.url)
            .cloned()
            .unwrap_or(MockResponse::Unreachable);

        match response {
            MockResponse::Page(page) => Ok(page),
            MockResponse::Status(status) => Err(FetchError::Status {
                status,
                url: request.url.clone(),
            }),
            MockResponse::Unreachable => Err(FetchError::Http(Box::new(std::io::Error::new(
                std::io::ErrorKind::ConnectionRefused,
                format!("no route to {}", request.url),
            )))),
        }
    }

    fn name(&self) -> &str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_serves_canned_pages() {
        let mock = MockFetcher::new()
            .with_html("https://example.com", "<h1>Hello</h1>")
            .with_status("https://example.com/missing", 404);

        let page = mock
            .fetch(&FetchRequest::new("https://example.com"))
            .await
            .unwrap();
        assert_eq!(page.body, "<h1>Hello</h1>");
        assert!(page.is_document());

        let err = mock
            .fetch(&FetchRequest::new("https://example.com/missing"))
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Status { status: 404, .. }));

        let err = mock
            .fetch(&FetchRequest::new("https://unknown.test"))
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Http(_)));
    }

    #[tokio::test]
    async fn test_mock_tracks_calls_across_clones() {
        let mock = MockFetcher::new().with_html("https://example.com", "");
        let clone = mock.clone();

        let _ = clone.fetch(&FetchRequest::new("https://example.com")).await;
        let _ = clone.fetch(&FetchRequest::new("https://other.test")).await;

        assert_eq!(mock.call_count(), 2);
        assert_eq!(mock.calls()[1].url, "https://other.test");

        mock.reset_calls();
        assert_eq!(clone.call_count(), 0);
    }
}
