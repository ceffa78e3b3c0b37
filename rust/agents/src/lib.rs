//! # arena-agents: Move-Generating Agents
//!
//! The capability contract every move source satisfies — remote models,
//! local models, scripted test doubles, and a human waiting on input — plus
//! the response/metrics types the match orchestrator forwards to its event
//! sink.
//!
//! ## Core Components
//!
//! - [`MoveAgent`] - Trait defining the move-generation interface
//! - [`AgentResponse`] / [`AgentMetrics`] - One call's content and usage data
//! - [`human`] - Agent that blocks on a move delivered from another thread
//! - [`scripted`] - Deterministic queued agent for tests and demos
//!
//! ## Contract
//!
//! `generate` must not panic for ordinary provider failures: a failing
//! agent returns content beginning with `"ERROR: "` and zero metrics, and
//! the orchestrator handles it like any other move text. Only unrecoverable
//! construction-time problems (missing credentials) are reported through
//! [`AgentError`], before a match ever starts.

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod human;
pub mod scripted;

pub use human::{HumanAgent, HumanMoveHandle};
pub use scripted::ScriptedAgent;

/// Usage data collected from one `generate` call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AgentMetrics {
    pub latency_ms: f64,
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// Full response from a move agent, including the prompts that produced it
/// so spectators can inspect exactly what the agent saw.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentResponse {
    pub content: String,
    /// Reasoning text separated by the provider, when it supplies one.
    pub thinking: Option<String>,
    pub metrics: AgentMetrics,
    pub model_name: String,
    pub system_prompt: Option<String>,
    pub user_prompt: Option<String>,
}

impl AgentResponse {
    /// Response with no thinking and zeroed metrics — the shape human and
    /// scripted agents produce.
    pub fn plain(
        content: impl Into<String>,
        model_name: impl Into<String>,
        system_prompt: &str,
        user_prompt: &str,
    ) -> Self {
        Self {
            content: content.into(),
            thinking: None,
            metrics: AgentMetrics::default(),
            model_name: model_name.into(),
            system_prompt: Some(system_prompt.to_string()),
            user_prompt: Some(user_prompt.to_string()),
        }
    }
}

/// Construction-time agent failures. Ordinary generation failures are
/// returned in-band as `"ERROR: ..."` content instead.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AgentError {
    #[error("Missing credentials for provider '{0}'")]
    MissingCredentials(String),
    #[error("Unknown agent type: {0}")]
    UnknownAgentType(String),
}

/// Trait defining the interface for move-generating agents.
///
/// The orchestrator calls `generate` once per turn with the match's system
/// prompt and the per-seat rendered game state; the call may block
/// arbitrarily long (network latency, a human deciding).
pub trait MoveAgent: Send {
    fn generate(&self, system_prompt: &str, user_prompt: &str) -> AgentResponse;

    /// Display identifier of the underlying model or input source.
    fn model_name(&self) -> &str;
}
