//! Chat participants.

use scribe_config::{AgentKind, AgentSpec};
use scribe_core::LlmConfig;

/// A participant in a group chat.
#[derive(Debug, Clone)]
pub struct AgentRole {
    pub name: String,
    pub system_message: String,
    pub kind: AgentKind,
    /// Model used for this agent's turns. Coordinators never have one.
    pub llm: Option<LlmConfig>,
}

impl AgentRole {
    /// An agent that only relays messages.
    pub fn coordinator(name: impl Into<String>, system_message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            system_message: system_message.into(),
            kind: AgentKind::Coordinator,
            llm: None,
        }
    }

    /// A model-backed agent.
    pub fn assistant(name: impl Into<String>, system_message: impl Into<String>, llm: LlmConfig) -> Self {
        Self {
            name: name.into(),
            system_message: system_message.into(),
            kind: AgentKind::Assistant,
            llm: Some(llm),
        }
    }

    /// Builds a role from its definition; assistants are bound to `llm`.
    pub fn from_spec(spec: &AgentSpec, llm: &LlmConfig) -> Self {
        match spec.kind {
            AgentKind::Coordinator => Self::coordinator(&spec.name, &spec.system_message),
            AgentKind::Assistant => Self::assistant(&spec.name, &spec.system_message, llm.clone()),
        }
    }

    /// Returns `true` if this agent takes turns in rounds.
    pub fn takes_turns(&self) -> bool {
        self.kind.requires_llm()
    }
}
