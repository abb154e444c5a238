//! Typed errors and HTTP mapping. Every failure leaves the service as `{"error": "<message>"}`.

use crate::storage::StorageError;
use crate::store::RecordStoreError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing setting: {0}")]
    MissingSetting(&'static str),
    #[error("invalid setting {name}: {reason}")]
    InvalidSetting { name: &'static str, reason: String },
    #[error("resource '{resource}': file field '{field}' has no bucket")]
    MissingBucket { resource: String, field: String },
    #[error("duplicate path segment: {0}")]
    DuplicatePathSegment(String),
    #[error("reserved path segment: {0}")]
    ReservedPathSegment(String),
    #[error("config load: {0}")]
    Load(String),
    #[error("validation: {0}")]
    Validation(String),
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("unknown resource: {0}")]
    UnknownResource(String),
    /// Field-level rejection; the message is returned verbatim.
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    BadRequest(String),
    #[error(transparent)]
    Store(#[from] RecordStoreError),
    /// Object store rejected an upload. Carries the resource's client-facing message.
    #[error("{message}")]
    Upload {
        message: String,
        #[source]
        source: StorageError,
    },
    #[error("request body too large: {0}")]
    PayloadTooLarge(String),
    #[error("no route for {0}")]
    NoRoute(String),
    #[error("method not allowed")]
    MethodNotAllowed,
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::UnknownResource(_) | AppError::NoRoute(_) => StatusCode::NOT_FOUND,
            AppError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            AppError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::Validation(_) | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            // Missing rows included: existing clients expect 400 here.
            AppError::Store(_) => StatusCode::BAD_REQUEST,
            AppError::Upload { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Serialize)]
pub struct ErrorBody {
    pub error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        match &self {
            AppError::Upload { message, source } => {
                tracing::error!(error = %source, "{}", message);
            }
            AppError::Store(e) => tracing::warn!(error = %e, "record store rejected request"),
            AppError::Config(_) => tracing::error!(error = %self, "request failed"),
            _ => tracing::debug!(error = %self, status = %status, "request rejected"),
        }
        let body = ErrorBody {
            error: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}
