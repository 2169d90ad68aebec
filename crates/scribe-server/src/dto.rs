//! Data transfer objects for the analyze endpoint.

use serde::{Deserialize, Serialize};

/// Body of `POST /analyze`.
///
/// `ocr_text` is kept as raw JSON so a missing field and a wrongly typed
/// one can be reported separately from a body that is not JSON at all.
#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    #[serde(default)]
    pub ocr_text: Option<serde_json::Value>,
}

/// Successful analysis.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct AnalyzeResponse {
    pub result: String,
}
