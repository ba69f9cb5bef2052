//! HTTP error mapping
//!
//! Core errors cross the HTTP boundary through one `ApiError` type so every
//! handler returns the same `{success: false, error}` body shape.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use recall_core::session::SessionError;
use recall_core::{PipelineError, StorageError};
use serde_json::json;

/// Error surface of every API handler
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Request body is missing required fields; all absent names are listed
    #[error("missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),
    /// Malformed request
    #[error("{0}")]
    BadRequest(String),
    /// Unknown resource id
    #[error("{0} not found")]
    NotFound(String),
    /// Review session state machine rejected the call
    #[error(transparent)]
    Session(#[from] SessionError),
    /// AI pipeline error
    #[error(transparent)]
    Pipeline(#[from] PipelineError),
    /// Persistence error
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::MissingFields(_) | ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Session(SessionError::NoActiveSession) => StatusCode::NOT_FOUND,
            ApiError::Session(SessionError::Resolve(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Session(_) => StatusCode::CONFLICT,
            ApiError::Pipeline(PipelineError::NotFound(_)) => StatusCode::NOT_FOUND,
            ApiError::Pipeline(PipelineError::InvalidTransition(_)) => StatusCode::CONFLICT,
            ApiError::Pipeline(PipelineError::AnswerCount { .. }) => StatusCode::BAD_REQUEST,
            ApiError::Pipeline(PipelineError::Storage(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Storage(StorageError::NotFound(_)) => StatusCode::NOT_FOUND,
            ApiError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("request failed: {}", self);
        }
        let body = Json(json!({
            "success": false,
            "error": self.to_string(),
        }));
        (status, body).into_response()
    }
}
