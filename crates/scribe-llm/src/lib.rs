//! LLM client abstractions for OpenAI and Anthropic APIs.
//!
//! This crate provides the model side of a group chat:
//!
//! - [`ChatModel`] — Trait every agent model implements
//! - [`UnifiedLlmClient`] — Recommended: auto-routes to the correct provider
//! - [`LlmClient`] — OpenAI-compatible client
//! - [`AnthropicClient`] — Claude models via the Anthropic API
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use scribe_core::{ChatMessage, LlmConfig, ModelConfig};
//! use scribe_llm::{ChatModel, UnifiedLlmClient};
//!
//! let llm = LlmConfig::new(ModelConfig::from_model("gpt-4", None), api_key);
//! let client = UnifiedLlmClient::new(&llm);
//!
//! let transcript = vec![ChatMessage::new("user_proxy", "Process this event text: ...")];
//! let reply = client
//!     .complete("Validate and clean the input data.", "data_validator", &transcript)
//!     .await?;
//! println!("{}", reply.content);
//! ```
//!
//! # Transcript Mapping
//!
//! A transcript is attributed to agent names, not roles. When an agent speaks,
//! its own earlier messages are sent as `assistant` turns and every other
//! agent's messages as `user` turns tagged with the sender's name.

mod anthropic;
mod client;
mod unified;

pub use anthropic::AnthropicClient;
pub use client::LlmClient;
pub use unified::{Provider, UnifiedLlmClient};

use async_trait::async_trait;
use scribe_core::{AgentError, ChatMessage};

/// Token usage and timing metrics from an LLM call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LlmMetrics {
    pub input_tokens: u32,
    pub output_tokens: u32,
    pub elapsed_ms: u64,
}

/// Complete response from an LLM call.
#[derive(Debug, Clone)]
pub struct LlmResponse {
    pub content: String,
    pub metrics: LlmMetrics,
}

impl LlmResponse {
    /// A response with zeroed metrics, mainly for stubs.
    pub fn text(content: impl Into<String>) -> Self {
        Self { content: content.into(), metrics: LlmMetrics::default() }
    }
}

/// A model that can take one turn in a group chat.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Produces the next message for `speaker` given the transcript so far.
    async fn complete(
        &self,
        system_prompt: &str,
        speaker: &str,
        transcript: &[ChatMessage],
    ) -> Result<LlmResponse, AgentError>;
}

/// Converts any error into an AgentError::LlmError.
pub(crate) fn llm_err(e: impl ToString) -> AgentError {
    AgentError::LlmError(e.to_string())
}
