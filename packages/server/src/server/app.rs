//! Application setup and server configuration.

use std::sync::Arc;

use axum::{
    extract::Extension,
    http::{header::CONTENT_TYPE, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use extraction::{Extractor, Fetcher, ProxyPool, WorkflowStore};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::server::routes::{
    bulk_add_proxies_handler, create_workflow_handler, delete_workflow_handler,
    get_settings_handler, get_workflow_handler, health_handler, list_proxies_handler,
    list_workflows_handler, run_workflow_handler, scrape_handler, update_settings_handler,
};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub pool: Arc<ProxyPool>,
    pub extractor: Arc<Extractor>,
    pub store: Arc<dyn WorkflowStore>,
}

impl AppState {
    pub fn new(
        pool: Arc<ProxyPool>,
        fetcher: Arc<dyn Fetcher>,
        store: Arc<dyn WorkflowStore>,
    ) -> Self {
        let extractor = Arc::new(Extractor::new(pool.clone(), fetcher));
        Self {
            pool,
            extractor,
            store,
        }
    }

    /// Replace the extractor, e.g. to shorten the fetch deadline.
    pub fn with_extractor(mut self, extractor: Extractor) -> Self {
        self.extractor = Arc::new(extractor);
        self
    }
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    let allow_origin = if origins.is_empty() {
        AllowOrigin::from(Any)
    } else {
        AllowOrigin::list(origins)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE])
        .allow_headers([CONTENT_TYPE])
}

/// Build the Axum application router
///
/// An empty `allowed_origins` allows any origin.
pub fn build_app(state: AppState, allowed_origins: &[String]) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/scrape", post(scrape_handler))
        .route("/proxies", get(list_proxies_handler))
        .route("/proxies/bulk", post(bulk_add_proxies_handler))
        .route(
            "/proxies/settings",
            get(get_settings_handler).patch(update_settings_handler),
        )
        .route(
            "/workflows",
            get(list_workflows_handler).post(create_workflow_handler),
        )
        .route(
            "/workflows/:id",
            get(get_workflow_handler).delete(delete_workflow_handler),
        )
        .route("/workflows/:id/run", post(run_workflow_handler))
        // Middleware layers (applied in reverse order - last added runs first)
        .layer(Extension(state))
        .layer(cors_layer(allowed_origins))
        .layer(TraceLayer::new_for_http())
}
