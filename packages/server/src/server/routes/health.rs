use axum::{extract::Extension, http::StatusCode, Json};
use extraction::PoolStats;
use serde::Serialize;

use crate::server::app::AppState;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    status: String,
    proxy_pool: ProxyPoolHealth,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProxyPoolHealth {
    enabled: bool,
    #[serde(flatten)]
    stats: PoolStats,
}

/// Health check endpoint
///
/// Reports pool size and how many proxies are currently eligible. The process
/// has no hard dependencies, so this always answers 200 OK.
pub async fn health_handler(
    Extension(state): Extension<AppState>,
) -> (StatusCode, Json<HealthResponse>) {
    let settings = state.pool.settings();

    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "healthy".to_string(),
            proxy_pool: ProxyPoolHealth {
                enabled: settings.enabled,
                stats: state.pool.stats(),
            },
        }),
    )
}
