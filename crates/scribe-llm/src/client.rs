//! OpenAI-compatible chat client.
//!
//! Works with the OpenAI API and any compatible endpoint selected through
//! `api_base`.

use std::time::Instant;

use async_openai::{
    config::OpenAIConfig,
    types::{
        ChatCompletionRequestAssistantMessageArgs, ChatCompletionRequestMessage,
        ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs, CreateChatCompletionResponse,
    },
    Client,
};
use async_trait::async_trait;
use scribe_core::{AgentError, ChatMessage};
use tracing::info;

use crate::{llm_err, ChatModel, LlmMetrics, LlmResponse};

/// Maps an agent name onto the characters OpenAI accepts in `name`.
fn sanitize_name(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' || c == '-' { c } else { '_' })
        .take(64)
        .collect()
}

/// Builds the request messages for `speaker`: system prompt, then the transcript.
pub(crate) fn build_messages(
    system_prompt: &str,
    speaker: &str,
    transcript: &[ChatMessage],
) -> Result<Vec<ChatCompletionRequestMessage>, AgentError> {
    let mut messages = vec![ChatCompletionRequestMessage::System(
        ChatCompletionRequestSystemMessageArgs::default()
            .content(system_prompt)
            .build()
            .map_err(llm_err)?,
    )];

    for msg in transcript {
        let role_msg = if msg.name == speaker {
            ChatCompletionRequestMessage::Assistant(
                ChatCompletionRequestAssistantMessageArgs::default()
                    .content(&*msg.content)
                    .build()
                    .map_err(llm_err)?,
            )
        } else {
            ChatCompletionRequestMessage::User(
                ChatCompletionRequestUserMessageArgs::default()
                    .content(&*msg.content)
                    .name(sanitize_name(&msg.name))
                    .build()
                    .map_err(llm_err)?,
            )
        };
        messages.push(role_msg);
    }

    Ok(messages)
}

/// Extracts content and metrics from a completion response.
fn extract_response(response: CreateChatCompletionResponse, elapsed_ms: u64) -> Result<LlmResponse, AgentError> {
    let content = response
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .ok_or_else(|| AgentError::LlmError("No response content".into()))?;

    let (input_tokens, output_tokens) = response
        .usage
        .map(|u| (u.prompt_tokens, u.completion_tokens))
        .unwrap_or((0, 0));

    info!(
        "LLM: {}ms, tokens: {}/{} (in/out)",
        elapsed_ms, input_tokens, output_tokens
    );

    Ok(LlmResponse {
        content,
        metrics: LlmMetrics { input_tokens, output_tokens, elapsed_ms },
    })
}

/// Client for OpenAI-compatible chat completion APIs.
pub struct LlmClient {
    client: Client<OpenAIConfig>,
    default_model: String,
}

impl LlmClient {
    /// Creates a client for `model` using `api_key`, optionally against another endpoint.
    pub fn new(model: &str, api_base: Option<&str>, api_key: &str) -> Self {
        let mut config = OpenAIConfig::new().with_api_key(api_key);
        if let Some(base) = api_base {
            config = config.with_api_base(base);
        }

        Self {
            client: Client::with_config(config),
            default_model: model.to_string(),
        }
    }
}

#[async_trait]
impl ChatModel for LlmClient {
    async fn complete(
        &self,
        system_prompt: &str,
        speaker: &str,
        transcript: &[ChatMessage],
    ) -> Result<LlmResponse, AgentError> {
        let start = Instant::now();
        let messages = build_messages(system_prompt, speaker, transcript)?;

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.default_model)
            .messages(messages)
            .build()
            .map_err(llm_err)?;

        let response = self.client.chat().create(request).await.map_err(llm_err)?;
        extract_response(response, start.elapsed().as_millis() as u64)
    }
}
