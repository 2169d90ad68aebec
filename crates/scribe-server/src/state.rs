//! Server state shared by all handlers.

use std::sync::Arc;

use scribe_chat::{GroupChatManager, Orchestrator};
use scribe_config::{ChatConfig, ConfigError, CredentialProvider, EnvCredentials, ServerSettings};
use scribe_core::ModelConfig;
use scribe_llm::Provider;

/// Everything a request needs, built once at startup.
///
/// Nothing in here is mutated by requests; each request builds its own chat.
pub struct ServerState {
    /// Model bound to every model-backed agent.
    pub model: ModelConfig,
    pub chat: ChatConfig,
    pub credentials: Arc<dyn CredentialProvider>,
    pub orchestrator: Arc<dyn Orchestrator>,
}

impl ServerState {
    pub fn new(
        model: ModelConfig,
        chat: ChatConfig,
        credentials: Arc<dyn CredentialProvider>,
        orchestrator: Arc<dyn Orchestrator>,
    ) -> Self {
        Self { model, chat, credentials, orchestrator }
    }

    /// Production state: env credentials for the model's provider and a
    /// [`GroupChatManager`] without a model of its own.
    pub fn from_settings(settings: &ServerSettings) -> Result<Self, ConfigError> {
        let chat = match &settings.chat_config {
            Some(path) => ChatConfig::from_file(path)?,
            None => ChatConfig::analyze(),
        };

        let model = ModelConfig::from_model(&settings.model, settings.api_base.clone());
        let key_var = Provider::from_model(&model.model).api_key_var();

        Ok(Self::new(
            model,
            chat,
            Arc::new(EnvCredentials::new(key_var)),
            Arc::new(GroupChatManager::new()),
        ))
    }
}

#[cfg(test)]
mod tests {
    use std::net::SocketAddr;

    use super::*;

    fn settings(model: &str) -> ServerSettings {
        ServerSettings {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 5000)),
            model: model.to_string(),
            api_base: None,
            chat_config: None,
        }
    }

    #[test]
    fn defaults_to_builtin_chat() {
        let state = ServerState::from_settings(&settings("gpt-4")).unwrap();
        assert_eq!(state.chat, ChatConfig::analyze());
        assert_eq!(state.model.model, "gpt-4");
        assert_eq!(state.credentials.name(), "OPENAI_API_KEY");
    }

    #[test]
    fn claude_models_read_anthropic_key() {
        let state = ServerState::from_settings(&settings("claude-sonnet-4-5-20250929")).unwrap();
        assert_eq!(state.credentials.name(), "ANTHROPIC_API_KEY");
    }

    #[test]
    fn missing_chat_file_is_an_error() {
        let mut s = settings("gpt-4");
        s.chat_config = Some("does/not/exist.json".into());
        assert!(matches!(ServerState::from_settings(&s), Err(ConfigError::Io { .. })));
    }
}
