//! Anthropic Claude API client.

use async_trait::async_trait;
use reqwest::Client;
use scribe_core::{AgentError, ChatMessage};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{llm_err, ChatModel, LlmMetrics, LlmResponse};

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";
const MAX_TOKENS: u32 = 8192;

/// Stand-in first turn; the API requires conversations to open with `user`.
const OPENING_TURN: &str = "(conversation start)";

#[derive(Debug, Serialize, PartialEq, Eq)]
struct AnthropicMessage {
    role: &'static str,
    content: String,
}

#[derive(Serialize)]
struct AnthropicRequest {
    model: String,
    max_tokens: u32,
    system: String,
    messages: Vec<AnthropicMessage>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    input_tokens: Option<u32>,
    output_tokens: Option<u32>,
}

#[derive(Deserialize)]
#[serde(tag = "type")]
enum ResponseBlock {
    #[serde(rename = "text")]
    Text { text: String },
    #[serde(other)]
    Other,
}

#[derive(Deserialize)]
struct MessagesResponse {
    content: Vec<ResponseBlock>,
    usage: Usage,
}

/// Decodes a Messages API body into its joined text and token usage.
fn parse_response(body: &str) -> Result<(String, Usage), AgentError> {
    let resp: MessagesResponse = serde_json::from_str(body)?;

    let content = resp
        .content
        .into_iter()
        .filter_map(|block| match block {
            ResponseBlock::Text { text } => Some(text),
            ResponseBlock::Other => None,
        })
        .collect::<Vec<_>>()
        .join("");

    Ok((content, resp.usage))
}

/// Maps a transcript onto strictly alternating user/assistant messages.
///
/// Other agents' messages are prefixed with the sender's name since the API
/// has no per-message name field. Consecutive turns of the same role are
/// joined with a blank line.
fn build_messages(speaker: &str, transcript: &[ChatMessage]) -> Vec<AnthropicMessage> {
    let mut messages: Vec<AnthropicMessage> = Vec::new();

    for msg in transcript {
        let (role, content) = if msg.name == speaker {
            ("assistant", msg.content.clone())
        } else {
            ("user", format!("{}: {}", msg.name, msg.content))
        };

        match messages.last_mut() {
            Some(last) if last.role == role => {
                last.content.push_str("\n\n");
                last.content.push_str(&content);
            }
            _ => messages.push(AnthropicMessage { role, content }),
        }
    }

    if !matches!(messages.first(), Some(m) if m.role == "user") {
        messages.insert(0, AnthropicMessage { role: "user", content: OPENING_TURN.to_string() });
    }

    messages
}

/// Client for Anthropic's Claude API.
pub struct AnthropicClient {
    client: Client,
    model: String,
    api_key: String,
}

impl AnthropicClient {
    /// Creates a new Anthropic client for `model` using `api_key`.
    pub fn new(model: &str, api_key: &str) -> Self {
        Self {
            client: Client::new(),
            model: model.to_string(),
            api_key: api_key.to_string(),
        }
    }
}

#[async_trait]
impl ChatModel for AnthropicClient {
    async fn complete(
        &self,
        system_prompt: &str,
        speaker: &str,
        transcript: &[ChatMessage],
    ) -> Result<LlmResponse, AgentError> {
        let start = std::time::Instant::now();

        let request = AnthropicRequest {
            model: self.model.clone(),
            max_tokens: MAX_TOKENS,
            system: system_prompt.to_string(),
            messages: build_messages(speaker, transcript),
        };

        let response = self
            .client
            .post(ANTHROPIC_API_URL)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(llm_err)?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AgentError::LlmError(format!(
                "Anthropic API error {}: {}",
                status, body
            )));
        }

        let body = response.text().await.map_err(llm_err)?;
        let (content, usage) = parse_response(&body)?;

        let metrics = LlmMetrics {
            input_tokens: usage.input_tokens.unwrap_or(0),
            output_tokens: usage.output_tokens.unwrap_or(0),
            elapsed_ms: start.elapsed().as_millis() as u64,
        };

        info!(
            "Anthropic: {}ms, tokens: {}/{}, content: {} chars",
            metrics.elapsed_ms,
            metrics.input_tokens,
            metrics.output_tokens,
            content.chars().count()
        );

        Ok(LlmResponse { content, metrics })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merges_consecutive_user_turns() {
        let transcript = vec![
            ChatMessage::new("user_proxy", "Process this event text: Gala 8pm"),
            ChatMessage::new("data_validator", "Text is clean."),
        ];

        let messages = build_messages("data_formatter", &transcript);

        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].role, "user");
        assert_eq!(
            messages[0].content,
            "user_proxy: Process this event text: Gala 8pm\n\ndata_validator: Text is clean."
        );
    }

    #[test]
    fn alternates_with_own_turns() {
        let transcript = vec![
            ChatMessage::new("user_proxy", "seed"),
            ChatMessage::new("data_validator", "first pass"),
            ChatMessage::new("data_formatter", "FINAL_RESPONSE: draft"),
            ChatMessage::new("data_validator", "second pass"),
        ];

        let messages = build_messages("data_validator", &transcript);
        let roles: Vec<_> = messages.iter().map(|m| m.role).collect();
        assert_eq!(roles, vec!["user", "assistant", "user", "assistant"]);
        assert_eq!(messages[1].content, "first pass");
    }

    #[test]
    fn leading_assistant_turn_gets_opening_user_turn() {
        let transcript = vec![ChatMessage::new("data_formatter", "hello")];
        let messages = build_messages("data_formatter", &transcript);
        assert_eq!(messages[0], AnthropicMessage { role: "user", content: OPENING_TURN.to_string() });
        assert_eq!(messages[1].role, "assistant");
    }

    #[test]
    fn parses_text_blocks_and_skips_others() {
        let json = r#"{
            "content": [
                { "type": "text", "text": "FINAL_RESPONSE: " },
                { "type": "thinking", "thinking": "..." },
                { "type": "text", "text": "{room: A}" }
            ],
            "usage": { "input_tokens": 12, "output_tokens": 5 }
        }"#;

        let (content, usage) = parse_response(json).unwrap();
        assert_eq!(content, "FINAL_RESPONSE: {room: A}");
        assert_eq!(usage.input_tokens, Some(12));
        assert_eq!(usage.output_tokens, Some(5));
    }

    #[test]
    fn undecodable_body_is_a_parse_error() {
        let err = parse_response(r#"{"content": "not a list"}"#).unwrap_err();
        assert!(matches!(err, AgentError::ParseError(_)));
        assert!(err.to_string().starts_with("Failed to parse response"));
    }
}
