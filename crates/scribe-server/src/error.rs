//! Application error types and Axum response conversion.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use scribe_core::AgentError;
use serde::Serialize;

/// Errors surfaced by the analyze endpoint, with HTTP status code mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppError {
    /// Body is not valid JSON or not a JSON object.
    InvalidRequest(String),
    /// `ocr_text` is absent or empty.
    MissingField(String),
    /// The model-provider credential is unavailable.
    Configuration(String),
    /// Anything that went wrong while running the conversation.
    Orchestration(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::InvalidRequest(_) | AppError::MissingField(_) => StatusCode::BAD_REQUEST,
            AppError::Configuration(_) | AppError::Orchestration(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            AppError::InvalidRequest(msg)
            | AppError::MissingField(msg)
            | AppError::Configuration(msg)
            | AppError::Orchestration(msg) => msg,
        }
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl From<AgentError> for AppError {
    fn from(err: AgentError) -> Self {
        AppError::Orchestration(err.to_string())
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let error = ErrorResponse { error: self.message().to_string() };
        (self.status(), Json(error)).into_response()
    }
}
