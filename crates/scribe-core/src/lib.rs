//! Core domain types and error definitions for scribe.
//!
//! This crate provides the types shared across the scribe workspace:
//!
//! - [`AgentError`] — Error type for chat orchestration and LLM operations
//! - [`ChatMessage`] — A transcript entry attributed to a named agent
//! - [`ModelConfig`] — LLM model configuration
//! - [`LlmConfig`] — A model bound to the credential used to call it
//!
//! # Example
//!
//! ```rust
//! use scribe_core::{ChatMessage, LlmConfig, ModelConfig};
//!
//! let msg = ChatMessage::new("user_proxy", "Process this event text: ...");
//! assert_eq!(msg.name, "user_proxy");
//!
//! let llm = LlmConfig::new(ModelConfig::from_model("gpt-4", None), "sk-test");
//! assert_eq!(llm.model.model, "gpt-4");
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur while running a chat or calling an LLM.
#[derive(Error, Debug)]
pub enum AgentError {
    /// LLM API request failed.
    #[error("LLM request failed: {0}")]
    LlmError(String),

    /// Failed to parse output from an LLM or provider.
    #[error("Failed to parse response: {0}")]
    ParseError(String),

    /// The chat definition cannot be executed as given.
    #[error("Invalid chat: {0}")]
    InvalidChat(String),

    /// An agent name was referenced that is not part of the chat.
    #[error("Unknown agent: {0}")]
    UnknownAgent(String),

    /// The conversation ended without a message from the expected agent.
    #[error("No message from '{0}' in conversation")]
    NoFinalMessage(String),
}

impl From<serde_json::Error> for AgentError {
    fn from(err: serde_json::Error) -> Self {
        AgentError::ParseError(err.to_string())
    }
}

/// A single message in a group chat transcript.
///
/// Unlike a provider message, the sender is an agent name rather than a
/// role; each model client maps names to roles from its own point of view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Name of the agent that produced this message.
    pub name: String,
    /// The content of the message.
    pub content: String,
}

impl ChatMessage {
    /// Creates a message attributed to `name`.
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self { name: name.into(), content: content.into() }
    }
}

/// Configuration for an LLM model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Unique identifier for this model configuration.
    pub id: String,
    /// Human-readable display name.
    pub name: String,
    /// The actual model identifier (e.g., "gpt-4", "claude-sonnet-4-5-20250929").
    pub model: String,
    /// Optional API base URL for self-hosted or alternative endpoints.
    pub api_base: Option<String>,
}

impl ModelConfig {
    /// Builds a config whose id and name are the model identifier itself.
    pub fn from_model(model: impl Into<String>, api_base: Option<String>) -> Self {
        let model = model.into();
        Self {
            id: model.clone(),
            name: model.clone(),
            model,
            api_base,
        }
    }
}

/// A model configuration bound to an API key.
///
/// Model-backed agents in the same chat usually share one `LlmConfig`.
#[derive(Clone, PartialEq, Eq)]
pub struct LlmConfig {
    pub model: ModelConfig,
    pub api_key: String,
}

impl LlmConfig {
    pub fn new(model: ModelConfig, api_key: impl Into<String>) -> Self {
        Self { model, api_key: api_key.into() }
    }
}

impl fmt::Debug for LlmConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LlmConfig")
            .field("model", &self.model)
            .field("api_key", &"[redacted]")
            .finish()
    }
}
