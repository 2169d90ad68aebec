//! `POST /analyze`: OCR text in, formatted event details out.

use std::sync::Arc;

use axum::{body::Bytes, extract::State, Json};
use tracing::{error, info, warn};

use crate::dto::AnalyzeResponse;
use crate::error::AppError;
use crate::services::analyze::{analyze as run_analysis, parse_request};
use crate::ServerState;

/// Validates the body, runs the chat and returns the cleaned answer.
///
/// The body is read as raw bytes so malformed JSON maps to
/// [`AppError::InvalidRequest`] rather than an extractor rejection.
pub async fn analyze(
    State(state): State<Arc<ServerState>>,
    body: Bytes,
) -> Result<Json<AnalyzeResponse>, AppError> {
    info!("Starting analyze endpoint ({} bytes)", body.len());

    let ocr_text = parse_request(&body).inspect_err(|e| warn!("Rejected analyze request: {}", e))?;

    let result = run_analysis(&state, &ocr_text)
        .await
        .inspect_err(|e| error!("Error in analyze endpoint: {}", e))?;

    info!("Analysis complete: {} chars", result.chars().count());
    Ok(Json(AnalyzeResponse { result }))
}
