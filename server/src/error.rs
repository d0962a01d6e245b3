use axum::Json;
use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

use pipeline::{ErrorKind, PipelineError};

/// Everything a handler can fail with, mapped onto the HTTP contract.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    #[error("missing multipart field `{0}`")]
    MissingField(&'static str),

    #[error("malformed multipart body: {0}")]
    Multipart(#[from] MultipartError),

    #[error("worker task failed: {0}")]
    Worker(#[from] tokio::task::JoinError),
}

impl ApiError {
    /// Stable machine-readable label for the JSON error body.
    fn label(&self) -> &'static str {
        match self {
            ApiError::Pipeline(err) => err.kind().into(),
            ApiError::MissingField(_) | ApiError::Multipart(_) => "invalid_request",
            ApiError::Worker(_) => ErrorKind::Internal.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            // problems with the uploaded photos, not the service
            ApiError::Pipeline(err) if err.is_client_error() => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Pipeline(PipelineError::Timeout { .. }) => StatusCode::GATEWAY_TIMEOUT,
            ApiError::Pipeline(_) | ApiError::Worker(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::MissingField(_) | ApiError::Multipart(_) => StatusCode::UNPROCESSABLE_ENTITY,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self, "request failed");
        } else {
            warn!(error = %self, "request rejected");
        }

        let body = Json(json!({
            "error": self.label(),
            "message": self.to_string(),
        }));
        (status, body).into_response()
    }
}
