use axum::{extract::rejection::JsonRejection, extract::Extension, http::StatusCode, Json};
use extraction::{PoolSettings, PoolSettingsPatch, Proxy, ProxyProtocol};
use serde::Deserialize;
use tracing::info;

use crate::server::app::AppState;
use crate::server::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct BulkProxyRequest {
    pub proxies: Vec<String>,
    #[serde(default, rename = "type")]
    pub protocol: Option<String>,
}

/// List every enrolled proxy. Passwords are never included.
pub async fn list_proxies_handler(Extension(state): Extension<AppState>) -> Json<Vec<Proxy>> {
    Json(state.pool.list())
}

/// Enroll proxies from `host:port[:username[:password]]` lines.
///
/// Responds with only the newly enrolled proxies; lines naming an already
/// enrolled host and port are skipped.
pub async fn bulk_add_proxies_handler(
    Extension(state): Extension<AppState>,
    payload: Result<Json<BulkProxyRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Vec<Proxy>>), ApiError> {
    let Json(request) = payload?;

    let protocol = match request.protocol.as_deref() {
        Some(raw) => raw.parse::<ProxyProtocol>()?,
        None => ProxyProtocol::default(),
    };

    let added = state.pool.add_many(&request.proxies, protocol)?;
    info!(
        requested = request.proxies.len(),
        added = added.len(),
        "Bulk proxy enrollment"
    );

    Ok((StatusCode::CREATED, Json(added)))
}

pub async fn get_settings_handler(Extension(state): Extension<AppState>) -> Json<PoolSettings> {
    Json(state.pool.settings())
}

/// Apply a partial settings update; omitted fields keep their values.
pub async fn update_settings_handler(
    Extension(state): Extension<AppState>,
    payload: Result<Json<PoolSettingsPatch>, JsonRejection>,
) -> Result<Json<PoolSettings>, ApiError> {
    let Json(patch) = payload?;
    Ok(Json(state.pool.update_settings(&patch)))
}
