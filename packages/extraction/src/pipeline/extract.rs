//! The extraction orchestrator.

use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use super::document::read_document;
use super::{validate_target_url, FETCH_TIMEOUT, USER_AGENT};
use crate::error::{FetchError, Result};
use crate::pool::ProxyPool;
use crate::traits::fetcher::{FetchRequest, Fetcher, ProxyRoute};
use crate::types::locator::{ExtractionRequest, ExtractionResults};
use crate::types::proxy::Proxy;

/// Runs extraction requests against live pages.
///
/// # Example
///
/// ```rust,ignore
/// let extractor = Extractor::new(pool, Arc::new(HttpFetcher::new()?));
///
/// let request = ExtractionRequest::new("https://example.com", vec![Locator::css("h1")]);
/// let results = extractor.extract(&request).await?;
/// ```
#[derive(Clone)]
pub struct Extractor {
    pool: Arc<ProxyPool>,
    fetcher: Arc<dyn Fetcher>,
    timeout: Duration,
}

impl Extractor {
    pub fn new(pool: Arc<ProxyPool>, fetcher: Arc<dyn Fetcher>) -> Self {
        Self {
            pool,
            fetcher,
            timeout: FETCH_TIMEOUT,
        }
    }

    /// Override the fetch deadline.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn pool(&self) -> &Arc<ProxyPool> {
        &self.pool
    }

    /// Fetch the request's page and return one result per locator.
    ///
    /// When a proxy is used, the pool is told about the outcome exactly once:
    /// success records the latency and starts the cooldown, a fetch or parse
    /// failure bumps the failure count and returns the proxy to `available`.
    /// Dropping the returned future releases the proxy unchanged.
    pub async fn extract(&self, request: &ExtractionRequest) -> Result<ExtractionResults> {
        let url = validate_target_url(&request.url)?;

        if request.requires_javascript {
            info!(url = %url, "JavaScript rendering requested; fetching static HTML");
        }

        let lease = if request.use_proxy {
            let acquired = ProxyLease::acquire(&self.pool);
            if acquired.is_none() {
                warn!(url = %url, "No proxy available, fetching directly");
            }
            acquired
        } else {
            None
        };

        let mut fetch_request = FetchRequest::new(url.as_str()).with_header("User-Agent", USER_AGENT);
        if let Some(lease) = &lease {
            fetch_request = fetch_request.with_proxy(ProxyRoute::from(&lease.proxy));
        }

        let outcome = self.fetch_and_read(&fetch_request, request).await;

        let proxy_label = lease.as_ref().map(|l| l.proxy.key().to_string());
        if let Some(lease) = lease {
            lease.settle(&outcome);
        }

        match &outcome {
            Ok((results, latency)) => info!(
                url = %url,
                fetcher = self.fetcher.name(),
                proxy = proxy_label.as_deref(),
                latency_ms = millis(*latency),
                matched = results.iter().filter(|r| r.is_some()).count(),
                total = results.len(),
                "Extraction complete"
            ),
            Err(e) => warn!(url = %url, error = %e, "Extraction failed"),
        }

        outcome.map(|(results, _)| results)
    }

    /// Fetch under the deadline, then parse. Latency covers the fetch only.
    async fn fetch_and_read(
        &self,
        fetch_request: &FetchRequest,
        request: &ExtractionRequest,
    ) -> Result<(ExtractionResults, Duration)> {
        let started = Instant::now();
        let page = match tokio::time::timeout(self.timeout, self.fetcher.fetch(fetch_request)).await {
            Ok(fetched) => fetched?,
            Err(_) => {
                return Err(FetchError::Timeout {
                    url: fetch_request.url.clone(),
                    seconds: self.timeout.as_secs(),
                }
                .into())
            }
        };
        let latency = started.elapsed();

        debug!(url = %page.url, status = page.status, "Page fetched");
        let results = read_document(&page, &request.locators)?;
        Ok((results, latency))
    }
}

/// A proxy taken from the pool for one extraction.
///
/// The outcome is reported through [`ProxyLease::settle`]. A lease dropped
/// unsettled (the extraction future was cancelled) hands the proxy back as
/// `available` without touching its counters.
struct ProxyLease {
    pool: Arc<ProxyPool>,
    proxy: Proxy,
    settled: bool,
}

impl ProxyLease {
    fn acquire(pool: &Arc<ProxyPool>) -> Option<Self> {
        pool.acquire().map(|proxy| Self {
            pool: pool.clone(),
            proxy,
            settled: false,
        })
    }

    fn settle(mut self, outcome: &Result<(ExtractionResults, Duration)>) {
        self.settled = true;
        let key = self.proxy.key();
        let reported = match outcome {
            Ok((_, latency)) => self
                .pool
                .record_outcome(&key, Some(millis(*latency)), false)
                .and_then(|_| self.pool.mark_cooling_down(&key)),
            Err(e) if e.is_upstream() => self
                .pool
                .record_outcome(&key, None, true)
                .and_then(|_| self.pool.mark_available(&key)),
            Err(_) => self.pool.mark_available(&key),
        };

        if let Err(e) = reported {
            warn!(proxy = %key, error = %e, "Could not report proxy outcome");
        }
    }
}

impl Drop for ProxyLease {
    fn drop(&mut self) {
        if self.settled {
            return;
        }

        let key = self.proxy.key();
        warn!(proxy = %key, "Extraction cancelled, returning proxy to the pool");
        if let Err(e) = self.pool.mark_available(&key) {
            warn!(proxy = %key, error = %e, "Could not release proxy");
        }
    }
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
