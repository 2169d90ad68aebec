//! Bounded multi-agent group chat.
//!
//! This crate runs the short conversations scribe delegates its analysis to:
//!
//! - [`AgentRole`] — A named participant with instructions and an optional model
//! - [`GroupChat`] — Participants plus round limit, speaker selection and termination
//! - [`GroupChatManager`] — Runs a [`GroupChat`] and returns its [`Transcript`]
//! - [`Orchestrator`] — The seam callers depend on; stub it in tests
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use scribe_chat::{GroupChat, GroupChatManager, Orchestrator};
//! use scribe_config::ChatConfig;
//!
//! let config = ChatConfig::analyze();
//! let chat = GroupChat::from_config(&config, &llm)?;
//!
//! let transcript = GroupChatManager::new()
//!     .run(chat, &config.initiator, &config.seed_message(ocr_text))
//!     .await?;
//! let answer = transcript.last_message(&config.final_speaker);
//! ```
//!
//! # Execution Model
//!
//! 1. The initiator's seed message opens the transcript
//! 2. Each round gives every non-coordinator agent one turn
//! 3. Each turn sends the agent's system message and the full transcript to its model
//! 4. The chat ends after `max_round` rounds, or as soon as the final speaker
//!    emits the termination sentinel

mod group_chat;
mod manager;
mod role;

pub use group_chat::{GroupChat, Transcript};
pub use manager::{GroupChatManager, ModelFactory, UnifiedModelFactory, MANAGER_NAME};
pub use role::AgentRole;
pub use scribe_config::{AgentKind, SpeakerSelection};

use async_trait::async_trait;
use scribe_core::AgentError;

/// Runs bounded conversations.
///
/// Implementations own the whole conversation: the caller hands over a
/// configured [`GroupChat`] and receives the finished transcript.
#[async_trait]
pub trait Orchestrator: Send + Sync {
    /// Seeds `chat` with `message` from `initiator` and runs it to completion.
    async fn run(&self, chat: GroupChat, initiator: &str, message: &str) -> Result<Transcript, AgentError>;
}
