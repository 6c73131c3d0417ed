use axum::{extract::rejection::JsonRejection, extract::Extension, Json};
use extraction::{ExtractionRequest, ExtractionResults, Locator};
use serde::{Deserialize, Serialize};

use crate::server::app::AppState;
use crate::server::error::ApiError;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrapeRequest {
    pub url: String,
    pub selectors: Vec<Locator>,
    #[serde(default)]
    pub use_proxy: bool,
    #[serde(default, rename = "requiresJavaScript")]
    pub requires_javascript: bool,
}

impl From<ScrapeRequest> for ExtractionRequest {
    fn from(request: ScrapeRequest) -> Self {
        ExtractionRequest::new(request.url, request.selectors)
            .with_proxy(request.use_proxy)
            .with_javascript(request.requires_javascript)
    }
}

#[derive(Debug, Serialize)]
pub struct ScrapeResponse {
    pub results: ExtractionResults,
}

/// Run an ad-hoc extraction.
///
/// `results` holds one entry per selector, `null` where nothing matched.
pub async fn scrape_handler(
    Extension(state): Extension<AppState>,
    payload: Result<Json<ScrapeRequest>, JsonRejection>,
) -> Result<Json<ScrapeResponse>, ApiError> {
    let Json(request) = payload?;
    let results = state.extractor.extract(&request.into()).await?;

    Ok(Json(ScrapeResponse { results }))
}
