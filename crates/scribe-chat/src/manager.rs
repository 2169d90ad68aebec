//! Group chat manager: turn-taking, speaker selection and termination.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use scribe_config::SpeakerSelection;
use scribe_core::{AgentError, ChatMessage, LlmConfig};
use scribe_llm::{ChatModel, UnifiedLlmClient};
use tracing::{debug, info, warn};

use crate::group_chat::{GroupChat, Transcript};
use crate::role::AgentRole;
use crate::Orchestrator;

/// Name the manager uses when it asks its own model for the next speaker.
pub const MANAGER_NAME: &str = "chat_manager";

/// Creates chat models from model configurations.
pub trait ModelFactory: Send + Sync {
    fn model_for(&self, config: &LlmConfig) -> Arc<dyn ChatModel>;
}

/// Builds [`UnifiedLlmClient`]s.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnifiedModelFactory;

impl ModelFactory for UnifiedModelFactory {
    fn model_for(&self, config: &LlmConfig) -> Arc<dyn ChatModel> {
        Arc::new(UnifiedLlmClient::new(config))
    }
}

/// Runs group chats.
///
/// The manager holds no model of its own unless one is set with
/// [`with_llm`](Self::with_llm); it is only consulted for
/// [`SpeakerSelection::Auto`].
pub struct GroupChatManager {
    factory: Arc<dyn ModelFactory>,
    llm: Option<LlmConfig>,
}

impl Default for GroupChatManager {
    fn default() -> Self {
        Self::new()
    }
}

impl GroupChatManager {
    pub fn new() -> Self {
        Self::with_factory(Arc::new(UnifiedModelFactory))
    }

    pub fn with_factory(factory: Arc<dyn ModelFactory>) -> Self {
        Self { factory, llm: None }
    }

    /// Gives the manager a model for automatic speaker selection.
    pub fn with_llm(mut self, llm: LlmConfig) -> Self {
        self.llm = Some(llm);
        self
    }

    /// Resolves a model for every agent that takes turns.
    fn bind_models(&self, speakers: &[&AgentRole]) -> Result<HashMap<String, Arc<dyn ChatModel>>, AgentError> {
        speakers
            .iter()
            .map(|agent| {
                let llm = agent.llm.as_ref().ok_or_else(|| {
                    AgentError::InvalidChat(format!("agent '{}' has no model configuration", agent.name))
                })?;
                Ok((agent.name.clone(), self.factory.model_for(llm)))
            })
            .collect()
    }

    /// Model for automatic selection, or `None` to go round-robin.
    fn selector(&self, selection: SpeakerSelection) -> Option<Arc<dyn ChatModel>> {
        if selection != SpeakerSelection::Auto {
            return None;
        }
        match &self.llm {
            Some(llm) => Some(self.factory.model_for(llm)),
            None => {
                warn!("║ ⚠ Auto speaker selection without a manager model, using round-robin");
                None
            }
        }
    }
}

#[async_trait]
impl Orchestrator for GroupChatManager {
    async fn run(&self, chat: GroupChat, initiator: &str, message: &str) -> Result<Transcript, AgentError> {
        if chat.agent(initiator).is_none() {
            return Err(AgentError::UnknownAgent(initiator.to_string()));
        }

        let speakers = chat.speakers();
        if speakers.is_empty() {
            return Err(AgentError::InvalidChat("no agents to take turns".into()));
        }

        let models = self.bind_models(&speakers)?;
        let selector = self.selector(chat.speaker_selection());

        info!("╔══════════════════════════════════════════════════════════════");
        info!("║ GROUP CHAT: {} agents, max {} rounds", chat.agents().len(), chat.max_round());
        info!("║ {}: {}...", initiator, message.chars().take(50).collect::<String>());
        info!("╠══════════════════════════════════════════════════════════════");

        let mut transcript = Transcript::new();
        transcript.push(ChatMessage::new(initiator, message));

        for round in 1..=chat.max_round() {
            transcript.set_rounds(round);
            let mut remaining = speakers.clone();

            while !remaining.is_empty() {
                let idx = match &selector {
                    Some(model) => select_speaker(model.as_ref(), &remaining, &mut transcript).await?,
                    None => 0,
                };
                let agent = remaining.remove(idx);

                let Some(model) = models.get(&agent.name) else {
                    return Err(AgentError::UnknownAgent(agent.name.clone()));
                };

                info!("╠──────────────────────────────────────────────────────────────");
                info!("║ [round {}] {}", round, agent.name);

                let start = Instant::now();
                let reply = model
                    .complete(&agent.system_message, &agent.name, transcript.messages())
                    .await?;
                info!(
                    "║     ✓ {} chars in {:?}, tokens: {}/{}",
                    reply.content.chars().count(),
                    start.elapsed(),
                    reply.metrics.input_tokens,
                    reply.metrics.output_tokens
                );
                debug!("║     Reply: {}...", reply.content.chars().take(100).collect::<String>());

                transcript.record_usage(&reply.metrics);
                let done = chat.is_termination(&agent.name, &reply.content);
                transcript.push(ChatMessage::new(&agent.name, reply.content));

                if done {
                    info!("║ Termination message from {}", agent.name);
                    log_usage(&transcript);
                    info!("╚══════════════════════════════════════════════════════════════");
                    return Ok(transcript);
                }
            }
        }

        info!("║ Round limit reached ({} messages)", transcript.len());
        log_usage(&transcript);
        info!("╚══════════════════════════════════════════════════════════════");
        Ok(transcript)
    }
}

fn log_usage(transcript: &Transcript) {
    let usage = transcript.usage();
    info!(
        "║ Tokens: {} in / {} out, model time {}ms",
        usage.input_tokens, usage.output_tokens, usage.elapsed_ms
    );
}

/// Asks the manager's model which of `candidates` speaks next.
///
/// Falls back to the first candidate when the answer names none of them.
async fn select_speaker(
    model: &dyn ChatModel,
    candidates: &[&AgentRole],
    transcript: &mut Transcript,
) -> Result<usize, AgentError> {
    if candidates.len() == 1 {
        return Ok(0);
    }

    let roles = candidates
        .iter()
        .map(|a| format!("{}: {}", a.name, a.system_message))
        .collect::<Vec<_>>()
        .join("\n");
    let names = candidates.iter().map(|a| a.name.as_str()).collect::<Vec<_>>().join(", ");

    let prompt = format!(
        "You are in a role play game. The following roles are available:\n{}\n\n\
        Read the conversation, then select the next role from [{}] to play.\n\
        IMPORTANT: Respond with ONLY the role name, nothing else.",
        roles, names
    );

    let response = model.complete(&prompt, MANAGER_NAME, transcript.messages()).await?;
    transcript.record_usage(&response.metrics);
    let decision = response.content.trim().to_lowercase();

    match candidates.iter().position(|a| a.name.to_lowercase() == decision) {
        Some(idx) => {
            info!("║ Selected speaker: {}", candidates[idx].name);
            Ok(idx)
        }
        None => {
            warn!("║ ⚠ No exact match for '{}' in [{}], defaulting to first", decision, names);
            Ok(0)
        }
    }
}
