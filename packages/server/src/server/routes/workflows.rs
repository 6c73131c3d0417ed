use axum::{
    extract::rejection::{JsonRejection, PathRejection},
    extract::{Extension, Path},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use extraction::{NewWorkflow, Workflow};
use tracing::info;
use uuid::Uuid;

use super::scrape::ScrapeResponse;
use crate::server::app::AppState;
use crate::server::error::ApiError;

async fn load(state: &AppState, id: Uuid) -> Result<Workflow, ApiError> {
    state
        .store
        .get_workflow(id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("workflow {id} not found")))
}

pub async fn list_workflows_handler(
    Extension(state): Extension<AppState>,
) -> Result<Json<Vec<Workflow>>, ApiError> {
    Ok(Json(state.store.list_workflows().await?))
}

/// Save a new workflow, stamping its id and `lastSaved`.
pub async fn create_workflow_handler(
    Extension(state): Extension<AppState>,
    payload: Result<Json<NewWorkflow>, JsonRejection>,
) -> Result<(StatusCode, Json<Workflow>), ApiError> {
    let Json(new_workflow) = payload?;
    new_workflow.validate()?;

    let workflow = new_workflow.into_workflow(Utc::now());
    state.store.save_workflow(&workflow).await?;
    info!(
        workflow_id = %workflow.id,
        selectors = workflow.selectors.len(),
        "Workflow saved"
    );

    Ok((StatusCode::CREATED, Json(workflow)))
}

pub async fn get_workflow_handler(
    Extension(state): Extension<AppState>,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<Workflow>, ApiError> {
    let Path(id) = id?;
    Ok(Json(load(&state, id).await?))
}

pub async fn delete_workflow_handler(
    Extension(state): Extension<AppState>,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<StatusCode, ApiError> {
    let Path(id) = id?;
    if state.store.delete_workflow(id).await? {
        info!(workflow_id = %id, "Workflow deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound(format!("workflow {id} not found")))
    }
}

/// Run a saved workflow against its live target page.
pub async fn run_workflow_handler(
    Extension(state): Extension<AppState>,
    id: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<ScrapeResponse>, ApiError> {
    let Path(id) = id?;
    let workflow = load(&state, id).await?;

    info!(workflow_id = %id, url = %workflow.target_url, "Running workflow");
    let results = state.extractor.extract(&workflow.to_request()).await?;

    Ok(Json(ScrapeResponse { results }))
}
