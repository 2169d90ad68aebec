//! Chat definition schema, server settings and credential providers.
//!
//! This crate defines the data structures scribe is configured with:
//!
//! - [`ChatConfig`] — A group chat definition: agents, rounds, termination
//! - [`ChatBuilder`] — Fluent API for building chat definitions
//! - [`AgentSpec`], [`AgentKind`], [`SpeakerSelection`] — Chat building blocks
//! - [`ServerSettings`] — Process-level settings read from the environment
//! - [`CredentialProvider`] — Where API keys come from
//!
//! # Loading from JSON
//!
//! ```rust,ignore
//! use scribe_config::ChatConfig;
//!
//! let config = ChatConfig::from_file("chat.json")?;
//! ```
//!
//! # Builder API
//!
//! ```rust
//! use scribe_config::{AgentKind, ChatConfig};
//!
//! let config = ChatConfig::builder("review", "Review chat")
//!     .agent("user_proxy", AgentKind::Coordinator)
//!         .system_message("Relays the request.")
//!         .done()
//!     .agent("reviewer", AgentKind::Assistant)
//!         .system_message("Review the text. Prefix the answer with 'FINAL_RESPONSE:'")
//!         .done()
//!     .initiator("user_proxy")
//!     .final_speaker("reviewer")
//!     .max_round(1)
//!     .build();
//!
//! assert!(config.validate().is_ok());
//! assert_eq!(config.agents.len(), 2);
//! ```

mod settings;

pub use settings::{
    CredentialProvider, EnvCredentials, ServerSettings, StaticCredentials, DEFAULT_BIND_ADDR,
    DEFAULT_MODEL,
};

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Marker the final speaker puts in front of its authoritative answer.
pub const FINAL_RESPONSE_SENTINEL: &str = "FINAL_RESPONSE:";

/// Placeholder replaced by the request text in [`ChatConfig::seed_template`].
pub const OCR_TEXT_PLACEHOLDER: &str = "{ocr_text}";

/// Errors that can occur when loading or validating configuration.
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// Failed to read a configuration file.
    #[error("Failed to read config file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse JSON configuration.
    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    /// Chat definition validation failed.
    #[error("Invalid chat '{chat_id}': {message}")]
    Validation { chat_id: String, message: String },

    /// An environment setting has a value that cannot be used.
    #[error("Invalid value for {var}: {message}")]
    InvalidSetting { var: String, message: String },
}

impl ConfigError {
    /// Creates an IO error with path context.
    pub fn io(path: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io { path: path.into(), source }
    }

    /// Creates a validation error.
    pub fn validation(chat_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            chat_id: chat_id.into(),
            message: message.into(),
        }
    }
}

/// Kinds of agents that can take part in a chat.
///
/// | Kind | Description |
/// |------|-------------|
/// | `Coordinator` | Opens the conversation, never calls a model |
/// | `Assistant` | Model-backed participant that takes turns |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentKind {
    /// Relays messages without calling a model.
    Coordinator,
    /// Answers each turn with a model call.
    Assistant,
}

impl std::fmt::Display for AgentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Coordinator => "coordinator",
            Self::Assistant => "assistant",
        };
        write!(f, "{}", s)
    }
}

impl AgentKind {
    /// Returns `true` if agents of this kind make LLM calls.
    pub fn requires_llm(&self) -> bool {
        matches!(self, AgentKind::Assistant)
    }
}

/// How the next speaker is chosen within a round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SpeakerSelection {
    /// Declaration order (default).
    #[default]
    RoundRobin,
    /// The manager's model picks among agents that have not spoken this round.
    Auto,
}

/// Configuration for a single agent in a chat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentSpec {
    /// Unique name of the agent within the chat.
    pub name: String,
    /// Whether the agent is model-backed.
    #[serde(rename = "type")]
    pub kind: AgentKind,
    /// Natural-language instructions for the agent.
    #[serde(default)]
    pub system_message: String,
}

fn default_max_round() -> usize {
    2
}

fn default_seed_template() -> String {
    format!("Process this event text: {}", OCR_TEXT_PLACEHOLDER)
}

fn default_sentinel() -> String {
    FINAL_RESPONSE_SENTINEL.to_string()
}

fn default_terminate() -> bool {
    true
}

/// Complete group chat definition.
///
/// The `initiator` opens the conversation with [`seed_message`](Self::seed_message);
/// the other agents then take turns for at most `max_round` rounds. The answer
/// is the last message of `final_speaker`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatConfig {
    /// Unique identifier for this chat definition.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Participants in declaration order.
    pub agents: Vec<AgentSpec>,
    /// Agent that sends the seed message.
    pub initiator: String,
    /// Agent whose last message is the chat's answer.
    pub final_speaker: String,
    /// Upper bound on rounds; one round gives every non-coordinator one turn.
    #[serde(default = "default_max_round")]
    pub max_round: usize,
    #[serde(default)]
    pub speaker_selection: SpeakerSelection,
    /// Seed message; `{ocr_text}` is replaced with the request text.
    #[serde(default = "default_seed_template")]
    pub seed_template: String,
    #[serde(default = "default_sentinel")]
    pub sentinel: String,
    /// End the chat as soon as the final speaker emits the sentinel.
    #[serde(default = "default_terminate")]
    pub terminate_on_sentinel: bool,
}

impl ChatConfig {
    /// Creates a new builder for constructing a chat definition.
    pub fn builder(id: impl Into<String>, name: impl Into<String>) -> ChatBuilder {
        ChatBuilder::new(id, name)
    }

    /// The built-in OCR analysis chat: a relaying proxy, a validator and a formatter.
    pub fn analyze() -> Self {
        Self::builder("analyze", "OCR event analysis")
            .description("Validates and formats event details extracted from an image")
            .agent("user_proxy", AgentKind::Coordinator)
                .system_message("A proxy for the user to help coordinate the data processing task.")
                .done()
            .agent("data_validator", AgentKind::Assistant)
                .system_message("Validate and clean the input data, checking for any inconsistencies or errors.")
                .done()
            .agent("data_formatter", AgentKind::Assistant)
                .system_message("Format the validated data into the required structure. Prefix the final response with 'FINAL_RESPONSE:'")
                .done()
            .initiator("user_proxy")
            .final_speaker("data_formatter")
            .max_round(2)
            .build()
    }

    /// Loads a chat definition from a JSON file and validates it.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| ConfigError::io(path.display().to_string(), e))?;
        Self::from_json(&content)
    }

    /// Parses a chat definition from a JSON string and validates it.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Serializes this definition to a JSON string.
    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Finds an agent by name.
    pub fn agent(&self, name: &str) -> Option<&AgentSpec> {
        self.agents.iter().find(|a| a.name == name)
    }

    /// Renders the seed message for the given request text.
    pub fn seed_message(&self, ocr_text: &str) -> String {
        self.seed_template.replace(OCR_TEXT_PLACEHOLDER, ocr_text)
    }

    /// Checks the structural invariants of the definition.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut seen = HashSet::new();
        for agent in &self.agents {
            if agent.name.is_empty() {
                return Err(ConfigError::validation(&self.id, "agent name must not be empty"));
            }
            if !seen.insert(agent.name.as_str()) {
                return Err(ConfigError::validation(
                    &self.id,
                    format!("duplicate agent name '{}'", agent.name),
                ));
            }
        }

        if self.max_round == 0 {
            return Err(ConfigError::validation(&self.id, "max_round must be at least 1"));
        }

        if self.agent(&self.initiator).is_none() {
            return Err(ConfigError::validation(
                &self.id,
                format!("initiator '{}' is not an agent", self.initiator),
            ));
        }

        match self.agent(&self.final_speaker) {
            Some(a) if a.kind.requires_llm() => {}
            Some(_) => {
                return Err(ConfigError::validation(
                    &self.id,
                    format!("final speaker '{}' must be an assistant", self.final_speaker),
                ))
            }
            None => {
                return Err(ConfigError::validation(
                    &self.id,
                    format!("final speaker '{}' is not an agent", self.final_speaker),
                ))
            }
        }

        if self.sentinel.is_empty() {
            return Err(ConfigError::validation(&self.id, "sentinel must not be empty"));
        }

        Ok(())
    }
}

// ============================================================================
// Builder API
// ============================================================================

/// Builder for constructing [`ChatConfig`] programmatically.
///
/// Use [`ChatConfig::builder()`] to create a new builder. Unset fields take
/// the same defaults as JSON deserialization.
#[derive(Debug)]
pub struct ChatBuilder {
    id: String,
    name: String,
    description: String,
    agents: Vec<AgentSpec>,
    initiator: String,
    final_speaker: String,
    max_round: usize,
    speaker_selection: SpeakerSelection,
    seed_template: String,
    sentinel: String,
    terminate_on_sentinel: bool,
}

impl ChatBuilder {
    fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            agents: Vec::new(),
            initiator: String::new(),
            final_speaker: String::new(),
            max_round: default_max_round(),
            speaker_selection: SpeakerSelection::default(),
            seed_template: default_seed_template(),
            sentinel: default_sentinel(),
            terminate_on_sentinel: default_terminate(),
        }
    }

    pub fn description(mut self, desc: impl Into<String>) -> Self {
        self.description = desc.into();
        self
    }

    /// Starts building a new agent with the given name and kind.
    pub fn agent(self, name: impl Into<String>, kind: AgentKind) -> AgentBuilder {
        AgentBuilder {
            chat: self,
            name: name.into(),
            kind,
            system_message: String::new(),
        }
    }

    pub fn initiator(mut self, name: impl Into<String>) -> Self {
        self.initiator = name.into();
        self
    }

    pub fn final_speaker(mut self, name: impl Into<String>) -> Self {
        self.final_speaker = name.into();
        self
    }

    pub fn max_round(mut self, rounds: usize) -> Self {
        self.max_round = rounds;
        self
    }

    pub fn speaker_selection(mut self, selection: SpeakerSelection) -> Self {
        self.speaker_selection = selection;
        self
    }

    pub fn seed_template(mut self, template: impl Into<String>) -> Self {
        self.seed_template = template.into();
        self
    }

    pub fn sentinel(mut self, sentinel: impl Into<String>) -> Self {
        self.sentinel = sentinel.into();
        self
    }

    pub fn terminate_on_sentinel(mut self, terminate: bool) -> Self {
        self.terminate_on_sentinel = terminate;
        self
    }

    /// Builds the final [`ChatConfig`]. Call [`ChatConfig::validate`] to check it.
    pub fn build(self) -> ChatConfig {
        ChatConfig {
            id: self.id,
            name: self.name,
            description: self.description,
            agents: self.agents,
            initiator: self.initiator,
            final_speaker: self.final_speaker,
            max_round: self.max_round,
            speaker_selection: self.speaker_selection,
            seed_template: self.seed_template,
            sentinel: self.sentinel,
            terminate_on_sentinel: self.terminate_on_sentinel,
        }
    }
}

/// Builder for a single agent within a chat.
///
/// Created via [`ChatBuilder::agent()`].
#[derive(Debug)]
pub struct AgentBuilder {
    chat: ChatBuilder,
    name: String,
    kind: AgentKind,
    system_message: String,
}

impl AgentBuilder {
    pub fn system_message(mut self, message: impl Into<String>) -> Self {
        self.system_message = message.into();
        self
    }

    /// Finishes building this agent and returns to the chat builder.
    pub fn done(self) -> ChatBuilder {
        let mut chat = self.chat;
        chat.agents.push(AgentSpec {
            name: self.name,
            kind: self.kind,
            system_message: self.system_message,
        });
        chat
    }
}
