//! Unified LLM client that routes to the appropriate provider based on model name.

use async_trait::async_trait;
use scribe_core::{AgentError, ChatMessage, LlmConfig};

use crate::anthropic::AnthropicClient;
use crate::client::LlmClient;
use crate::{ChatModel, LlmResponse};

/// Model provider, determined from the model name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    OpenAI,
    Anthropic,
}

impl Provider {
    /// `claude-*` models go to Anthropic, everything else to OpenAI.
    pub fn from_model(model: &str) -> Self {
        match model.starts_with("claude-") {
            true => Provider::Anthropic,
            false => Provider::OpenAI,
        }
    }

    /// Environment variable holding this provider's API key.
    pub fn api_key_var(&self) -> &'static str {
        match self {
            Provider::OpenAI => "OPENAI_API_KEY",
            Provider::Anthropic => "ANTHROPIC_API_KEY",
        }
    }
}

enum Inner {
    OpenAI(LlmClient),
    Anthropic(AnthropicClient),
}

/// Unified client that routes requests to OpenAI or Anthropic based on model name.
pub struct UnifiedLlmClient {
    provider: Provider,
    inner: Inner,
}

impl UnifiedLlmClient {
    /// Creates a new unified client, detecting the provider from the model name.
    pub fn new(config: &LlmConfig) -> Self {
        let model = &config.model;
        let provider = Provider::from_model(&model.model);
        let inner = match provider {
            Provider::OpenAI => Inner::OpenAI(LlmClient::new(
                &model.model,
                model.api_base.as_deref(),
                &config.api_key,
            )),
            Provider::Anthropic => Inner::Anthropic(AnthropicClient::new(&model.model, &config.api_key)),
        };

        Self { provider, inner }
    }

    pub fn provider(&self) -> Provider {
        self.provider
    }
}

#[async_trait]
impl ChatModel for UnifiedLlmClient {
    async fn complete(
        &self,
        system_prompt: &str,
        speaker: &str,
        transcript: &[ChatMessage],
    ) -> Result<LlmResponse, AgentError> {
        match &self.inner {
            Inner::OpenAI(client) => client.complete(system_prompt, speaker, transcript).await,
            Inner::Anthropic(client) => client.complete(system_prompt, speaker, transcript).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use scribe_core::ModelConfig;

    use super::*;

    #[test]
    fn detects_provider_from_model_name() {
        assert_eq!(Provider::from_model("gpt-4"), Provider::OpenAI);
        assert_eq!(Provider::from_model("llama3.2:3b"), Provider::OpenAI);
        assert_eq!(Provider::from_model("claude-haiku-4-5-20251001"), Provider::Anthropic);
    }

    #[test]
    fn key_variable_follows_provider() {
        assert_eq!(Provider::OpenAI.api_key_var(), "OPENAI_API_KEY");
        assert_eq!(Provider::Anthropic.api_key_var(), "ANTHROPIC_API_KEY");
    }

    #[test]
    fn client_routes_by_model() {
        let claude = LlmConfig::new(ModelConfig::from_model("claude-opus-4-5-20251101", None), "k");
        assert_eq!(UnifiedLlmClient::new(&claude).provider(), Provider::Anthropic);

        let gpt = LlmConfig::new(ModelConfig::from_model("gpt-4", None), "k");
        assert_eq!(UnifiedLlmClient::new(&gpt).provider(), Provider::OpenAI);
    }
}
