use axum::{
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use extraction::{ExtractionError, PoolError};
use serde_json::json;
use thiserror::Error;

/// Errors returned by HTTP handlers, rendered as `{"error": message}`.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    #[error(transparent)]
    Pool(#[from] PoolError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Extraction(e) => match e {
                ExtractionError::Validation { .. } => StatusCode::BAD_REQUEST,
                ExtractionError::Fetch(_) | ExtractionError::Parse { .. } => {
                    StatusCode::BAD_GATEWAY
                }
                ExtractionError::Pool(e) => pool_status(e),
                ExtractionError::Storage(_) | ExtractionError::Internal(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            Self::Pool(e) => pool_status(e),
        }
    }
}

fn pool_status(error: &PoolError) -> StatusCode {
    match error {
        PoolError::InvalidProxyLine { .. } | PoolError::UnknownProtocol(_) => {
            StatusCode::BAD_REQUEST
        }
        PoolError::NotFound(_) => StatusCode::NOT_FOUND,
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, status = status.as_u16(), "Request failed");
        } else {
            tracing::debug!(error = %self, status = status.as_u16(), "Request rejected");
        }

        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
