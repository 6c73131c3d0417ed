//! Test harness for route-level integration testing.
//!
//! Each test gets a fresh pool, store, and mock fetcher wired into the real
//! router. Requests go through `tower::ServiceExt::oneshot`, so no socket is
//! bound.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::{to_bytes, Body},
    http::{header::CONTENT_TYPE, Method, Request, StatusCode},
    Router,
};
use extraction::{
    Extractor, FetchedPage, MemoryStore, MockFetcher, MockResponse, ProxyPool, ProxyProtocol,
};
use serde_json::Value;
use server_core::server::{build_app, AppState};
use test_context::AsyncTestContext;
use tower::ServiceExt;

/// Test harness that manages test infrastructure.
///
/// # Example using test-context
///
/// ```ignore
/// use test_context::test_context;
///
/// #[test_context(TestHarness)]
/// #[tokio::test]
/// async fn my_test(ctx: &TestHarness) {
///     let (status, body) = ctx.get("/health").await;
///     // ... test code
/// }
/// ```
pub struct TestHarness {
    pub pool: Arc<ProxyPool>,
    pub store: Arc<MemoryStore>,
    /// Shares its canned pages and call log with the fetcher inside the app.
    pub fetcher: MockFetcher,
    pub app: Router,
}

impl AsyncTestContext for TestHarness {
    async fn setup() -> Self {
        Self::new()
    }

    async fn teardown(self) {
        // Everything is in-memory and dropped with the harness
    }
}

impl TestHarness {
    pub fn new() -> Self {
        // Initialize tracing subscriber to respect RUST_LOG environment variable.
        // Uses try_init() to avoid panicking if already initialized.
        // Run tests with: RUST_LOG=debug cargo test -- --nocapture
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();

        let pool = Arc::new(ProxyPool::new());
        let store = Arc::new(MemoryStore::new());
        let fetcher = MockFetcher::new();

        let extractor = Extractor::new(pool.clone(), Arc::new(fetcher.clone()))
            .with_timeout(Duration::from_millis(200));
        let state = AppState::new(pool.clone(), Arc::new(fetcher.clone()), store.clone())
            .with_extractor(extractor);

        Self {
            pool,
            store,
            fetcher,
            app: build_app(state, &[]),
        }
    }

    /// Serve `html` at `url` from the mock fetcher.
    pub fn serve_html(&self, url: &str, html: &str) {
        self.fetcher
            .add_response(url, MockResponse::Page(FetchedPage::html(url, html)));
    }

    pub fn enroll(&self, lines: &[&str]) {
        self.pool
            .add_many(lines, ProxyProtocol::Http)
            .expect("valid proxy lines");
    }

    /// Send a request and decode the JSON response (`Value::Null` for empty bodies).
    pub async fn request(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(json) => builder
                .header(CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("valid request");

        self.send(request).await
    }

    /// Send a raw body with a JSON content type.
    pub async fn post_raw(&self, uri: &str, raw: &str) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(raw.to_string()))
            .expect("valid request");

        self.send(request).await
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.request(Method::GET, uri, None).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::POST, uri, Some(body)).await
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self
            .app
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");

        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("readable body");
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("JSON body")
        };

        (status, json)
    }
}
