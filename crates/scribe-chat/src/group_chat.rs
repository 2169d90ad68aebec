//! Group chat definition and transcript.

use std::collections::HashSet;

use scribe_config::{ChatConfig, SpeakerSelection};
use scribe_core::{AgentError, ChatMessage, LlmConfig};
use scribe_llm::LlmMetrics;

use crate::role::AgentRole;

/// A bounded conversation among named agents.
#[derive(Debug, Clone)]
pub struct GroupChat {
    agents: Vec<AgentRole>,
    max_round: usize,
    speaker_selection: SpeakerSelection,
    termination: Option<(String, String)>,
}

impl GroupChat {
    /// Creates a chat capped at `max_round` rounds.
    ///
    /// Agent names must be unique and `max_round` at least 1.
    pub fn new(agents: Vec<AgentRole>, max_round: usize) -> Result<Self, AgentError> {
        let mut seen = HashSet::new();
        if let Some(dup) = agents.iter().find(|a| !seen.insert(a.name.as_str())) {
            return Err(AgentError::InvalidChat(format!("duplicate agent name '{}'", dup.name)));
        }
        if max_round == 0 {
            return Err(AgentError::InvalidChat("max_round must be at least 1".into()));
        }

        Ok(Self {
            agents,
            max_round,
            speaker_selection: SpeakerSelection::RoundRobin,
            termination: None,
        })
    }

    /// Builds a chat from its definition, binding every assistant to `llm`.
    pub fn from_config(config: &ChatConfig, llm: &LlmConfig) -> Result<Self, AgentError> {
        let agents = config
            .agents
            .iter()
            .map(|spec| AgentRole::from_spec(spec, llm))
            .collect();

        let mut chat = Self::new(agents, config.max_round)?
            .with_speaker_selection(config.speaker_selection);
        if config.terminate_on_sentinel {
            chat = chat.terminate_when(&config.final_speaker, &config.sentinel);
        }
        Ok(chat)
    }

    pub fn with_speaker_selection(mut self, selection: SpeakerSelection) -> Self {
        self.speaker_selection = selection;
        self
    }

    /// Ends the chat early once `speaker` sends a message containing `sentinel`.
    pub fn terminate_when(mut self, speaker: impl Into<String>, sentinel: impl Into<String>) -> Self {
        self.termination = Some((speaker.into(), sentinel.into()));
        self
    }

    pub fn agents(&self) -> &[AgentRole] {
        &self.agents
    }

    pub fn agent(&self, name: &str) -> Option<&AgentRole> {
        self.agents.iter().find(|a| a.name == name)
    }

    pub fn max_round(&self) -> usize {
        self.max_round
    }

    pub fn speaker_selection(&self) -> SpeakerSelection {
        self.speaker_selection
    }

    /// Agents that take turns, in declaration order.
    pub fn speakers(&self) -> Vec<&AgentRole> {
        self.agents.iter().filter(|a| a.takes_turns()).collect()
    }

    /// Returns `true` if `message` from `speaker` ends the chat.
    pub fn is_termination(&self, speaker: &str, message: &str) -> bool {
        match &self.termination {
            Some((name, sentinel)) => name == speaker && message.contains(sentinel.as_str()),
            None => false,
        }
    }
}

/// Ordered record of a finished conversation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transcript {
    messages: Vec<ChatMessage>,
    rounds: usize,
    usage: LlmMetrics,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a transcript from existing messages, e.g. for stubs.
    pub fn from_messages(messages: Vec<ChatMessage>, rounds: usize) -> Self {
        Self { messages, rounds, usage: LlmMetrics::default() }
    }

    pub fn push(&mut self, message: ChatMessage) {
        self.messages.push(message);
    }

    pub(crate) fn set_rounds(&mut self, rounds: usize) {
        self.rounds = rounds;
    }

    pub(crate) fn record_usage(&mut self, metrics: &LlmMetrics) {
        self.usage.input_tokens += metrics.input_tokens;
        self.usage.output_tokens += metrics.output_tokens;
        self.usage.elapsed_ms += metrics.elapsed_ms;
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Number of rounds started before the chat ended.
    pub fn rounds(&self) -> usize {
        self.rounds
    }

    /// Token usage and model time summed over every call in the chat,
    /// speaker selection included.
    pub fn usage(&self) -> &LlmMetrics {
        &self.usage
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// The last message attributed to `agent`, if it spoke at all.
    pub fn last_message(&self, agent: &str) -> Option<&ChatMessage> {
        self.messages.iter().rev().find(|m| m.name == agent)
    }
}

#[cfg(test)]
mod tests {
    use scribe_core::ModelConfig;

    use super::*;

    fn llm() -> LlmConfig {
        LlmConfig::new(ModelConfig::from_model("gpt-4", None), "sk-test")
    }

    #[test]
    fn from_config_binds_assistants_to_shared_model() {
        let chat = GroupChat::from_config(&ChatConfig::analyze(), &llm()).unwrap();

        assert_eq!(chat.max_round(), 2);
        assert!(chat.agent("user_proxy").unwrap().llm.is_none());
        let validator = chat.agent("data_validator").unwrap().llm.clone();
        let formatter = chat.agent("data_formatter").unwrap().llm.clone();
        assert_eq!(validator, Some(llm()));
        assert_eq!(validator, formatter);

        let speakers: Vec<_> = chat.speakers().iter().map(|a| a.name.as_str()).collect();
        assert_eq!(speakers, vec!["data_validator", "data_formatter"]);
    }

    #[test]
    fn termination_requires_final_speaker_and_sentinel() {
        let chat = GroupChat::from_config(&ChatConfig::analyze(), &llm()).unwrap();

        assert!(chat.is_termination("data_formatter", "FINAL_RESPONSE: {room: A}"));
        assert!(!chat.is_termination("data_validator", "FINAL_RESPONSE: {room: A}"));
        assert!(!chat.is_termination("data_formatter", "{room: A}"));
    }

    #[test]
    fn disabled_termination_never_fires() {
        let mut config = ChatConfig::analyze();
        config.terminate_on_sentinel = false;
        let chat = GroupChat::from_config(&config, &llm()).unwrap();
        assert!(!chat.is_termination("data_formatter", "FINAL_RESPONSE: x"));
    }

    #[test]
    fn rejects_duplicates_and_zero_rounds() {
        let dup = vec![AgentRole::coordinator("a", ""), AgentRole::coordinator("a", "")];
        assert!(matches!(GroupChat::new(dup, 1), Err(AgentError::InvalidChat(_))));

        let ok = vec![AgentRole::coordinator("a", "")];
        assert!(matches!(GroupChat::new(ok, 0), Err(AgentError::InvalidChat(_))));
    }

    #[test]
    fn last_message_picks_latest_by_agent() {
        let transcript = Transcript::from_messages(
            vec![
                ChatMessage::new("data_formatter", "draft"),
                ChatMessage::new("data_validator", "check"),
                ChatMessage::new("data_formatter", "FINAL_RESPONSE: done"),
            ],
            2,
        );

        assert_eq!(transcript.last_message("data_formatter").unwrap().content, "FINAL_RESPONSE: done");
        assert_eq!(transcript.last_message("data_validator").unwrap().content, "check");
        assert!(transcript.last_message("user_proxy").is_none());
    }
}
