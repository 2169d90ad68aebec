//! OCR analysis: request parsing, chat orchestration and answer extraction.

use scribe_chat::GroupChat;
use scribe_core::{AgentError, LlmConfig};
use serde_json::Value;
use tracing::{info, warn};

use crate::dto::AnalyzeRequest;
use crate::error::AppError;
use crate::ServerState;

/// Parses the request body and returns the non-empty `ocr_text`.
pub fn parse_request(body: &[u8]) -> Result<String, AppError> {
    let req: AnalyzeRequest = serde_json::from_slice(body).map_err(|e| {
        warn!("JSON parsing error: {}", e);
        AppError::InvalidRequest("Invalid JSON in request body".into())
    })?;

    match req.ocr_text {
        Some(Value::String(text)) if !text.is_empty() => Ok(text),
        Some(Value::String(_)) | Some(Value::Null) | None => {
            Err(AppError::MissingField("ocr_text is required".into()))
        }
        Some(_) => Err(AppError::MissingField("ocr_text must be a string".into())),
    }
}

/// Strips every occurrence of `sentinel` and trims, if the sentinel is present.
///
/// Content without the sentinel is returned untouched.
pub fn extract_result(content: &str, sentinel: &str) -> String {
    match content.contains(sentinel) {
        true => content.replace(sentinel, "").trim().to_string(),
        false => content.to_string(),
    }
}

/// Runs the configured chat over `ocr_text` and returns the final speaker's answer.
pub async fn analyze(state: &ServerState, ocr_text: &str) -> Result<String, AppError> {
    let api_key = state.credentials.api_key().ok_or_else(|| {
        AppError::Configuration(format!("{} is not set", state.credentials.name()))
    })?;

    let llm = LlmConfig::new(state.model.clone(), api_key);
    let chat = GroupChat::from_config(&state.chat, &llm)?;
    let message = state.chat.seed_message(ocr_text);

    info!(
        "Analyzing {} chars with {} (chat: {})",
        ocr_text.chars().count(),
        state.model.name,
        state.chat.name
    );

    let transcript = state
        .orchestrator
        .run(chat, &state.chat.initiator, &message)
        .await?;

    let last = transcript
        .last_message(&state.chat.final_speaker)
        .ok_or_else(|| AgentError::NoFinalMessage(state.chat.final_speaker.clone()))?;

    Ok(extract_result(&last.content, &state.chat.sentinel))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SENTINEL: &str = "FINAL_RESPONSE:";

    #[test]
    fn accepts_text() {
        let text = parse_request(br#"{"ocr_text": "Conference June 5 9am Room A"}"#).unwrap();
        assert_eq!(text, "Conference June 5 9am Room A");
    }

    #[test]
    fn ignores_unknown_fields() {
        let text = parse_request(br#"{"ocr_text": "Expo", "lang": "en"}"#).unwrap();
        assert_eq!(text, "Expo");
    }

    #[test]
    fn malformed_json_is_invalid_request() {
        let err = parse_request(b"{\"ocr_text\": ").unwrap_err();
        assert_eq!(err, AppError::InvalidRequest("Invalid JSON in request body".into()));
    }

    #[test]
    fn non_object_body_is_invalid_request() {
        assert!(matches!(parse_request(b"[1, 2]"), Err(AppError::InvalidRequest(_))));
        assert!(matches!(parse_request(b"\"text\""), Err(AppError::InvalidRequest(_))));
    }

    #[test]
    fn missing_empty_or_null_text_is_missing_field() {
        let bodies: [&[u8]; 3] = [b"{}", br#"{"ocr_text": ""}"#, br#"{"ocr_text": null}"#];
        for body in bodies {
            assert_eq!(
                parse_request(body).unwrap_err(),
                AppError::MissingField("ocr_text is required".into())
            );
        }
    }

    #[test]
    fn non_string_text_is_missing_field() {
        assert!(matches!(parse_request(br#"{"ocr_text": 42}"#), Err(AppError::MissingField(_))));
    }

    #[test]
    fn strips_sentinel_and_whitespace() {
        assert_eq!(
            extract_result("FINAL_RESPONSE: {date: 2024-06-05, time: 09:00, room: A}", SENTINEL),
            "{date: 2024-06-05, time: 09:00, room: A}"
        );
        assert_eq!(extract_result("  Here it is\nFINAL_RESPONSE:\n  x \n", SENTINEL), "Here it is\n\n  x");
    }

    #[test]
    fn strips_every_sentinel_occurrence() {
        assert_eq!(extract_result("FINAL_RESPONSE: a FINAL_RESPONSE: b", SENTINEL), "a  b");
    }

    #[test]
    fn leaves_content_without_sentinel_untouched() {
        assert_eq!(extract_result("  plain answer \n", SENTINEL), "  plain answer \n");
    }
}
