//! HTTP-facing errors.
//!
//! DESIGN
//! ======
//! Every module error exposes a stable machine code through [`ErrorCode`].
//! Handlers convert them into [`ApiError`], which renders the JSON envelope
//! `{"error": {"code", "message", "retryable", "fields"}}` with a matching
//! status code.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::Serialize;

use crate::rate_limit::RateLimitError;
use crate::services::generation::GenerationError;

/// Stable error code + retry hint shared by all module errors.
pub trait ErrorCode: std::fmt::Display {
    fn error_code(&self) -> &'static str;

    fn retryable(&self) -> bool {
        false
    }
}

// =============================================================================
// FIELD ERRORS
// =============================================================================

/// A single failed form field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    #[must_use]
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self { field, message: message.into() }
    }
}

// =============================================================================
// API ERROR
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("validation failed")]
    Validation(Vec<FieldError>),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error(transparent)]
    Generation(#[from] GenerationError),

    #[error(transparent)]
    RateLimited(#[from] RateLimitError),

    #[error("generative-text service not configured")]
    LlmNotConfigured,

    #[error("document store not configured")]
    StoreNotConfigured,
}

impl ApiError {
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Generation(_) => StatusCode::BAD_GATEWAY,
            Self::RateLimited(_) => StatusCode::TOO_MANY_REQUESTS,
            Self::LlmNotConfigured | Self::StoreNotConfigured => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl ErrorCode for ApiError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "E_VALIDATION",
            Self::BadRequest(_) => "E_BAD_REQUEST",
            Self::NotFound(_) => "E_NOT_FOUND",
            Self::Generation(e) => e.error_code(),
            Self::RateLimited(_) => "E_RATE_LIMITED",
            Self::LlmNotConfigured => "E_LLM_NOT_CONFIGURED",
            Self::StoreNotConfigured => "E_STORE_NOT_CONFIGURED",
        }
    }

    fn retryable(&self) -> bool {
        match self {
            Self::Generation(e) => e.retryable(),
            Self::RateLimited(_) => true,
            _ => false,
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: &'static str,
    message: String,
    retryable: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    fields: Vec<FieldError>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.error_code();
        let retryable = self.retryable();
        let message = self.to_string();
        let fields = match self {
            Self::Validation(fields) => fields,
            _ => Vec::new(),
        };
        let body = ErrorBody { error: ErrorDetail { code, message, retryable, fields } };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
#[path = "error_test.rs"]
mod tests;
