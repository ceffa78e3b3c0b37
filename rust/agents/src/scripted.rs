//! Deterministic queued agent for tests, demos, and benchmarking matches.

use std::collections::VecDeque;
use std::sync::Mutex;

use crate::{AgentResponse, MoveAgent};

/// Plays back a fixed list of responses, one per `generate` call, then
/// returns empty moves once the script runs out. Stands in for a remote
/// model wherever the orchestrator needs a predictable opponent.
pub struct ScriptedAgent {
    model_name: String,
    script: Mutex<VecDeque<String>>,
}

impl ScriptedAgent {
    pub fn new<I, S>(moves: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::named("scripted", moves)
    }

    pub fn named<I, S>(model_name: impl Into<String>, moves: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            model_name: model_name.into(),
            script: Mutex::new(moves.into_iter().map(Into::into).collect()),
        }
    }

    /// Agent that answers every call with the same move.
    pub fn repeating(model_name: impl Into<String>, mv: impl Into<String>) -> RepeatingAgent {
        RepeatingAgent {
            model_name: model_name.into(),
            mv: mv.into(),
        }
    }
}

impl MoveAgent for ScriptedAgent {
    fn generate(&self, system_prompt: &str, user_prompt: &str) -> AgentResponse {
        let mv = self
            .script
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .pop_front()
            .unwrap_or_default();
        AgentResponse::plain(mv, self.model_name.clone(), system_prompt, user_prompt)
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }
}

/// See [`ScriptedAgent::repeating`].
pub struct RepeatingAgent {
    model_name: String,
    mv: String,
}

impl MoveAgent for RepeatingAgent {
    fn generate(&self, system_prompt: &str, user_prompt: &str) -> AgentResponse {
        AgentResponse::plain(
            self.mv.clone(),
            self.model_name.clone(),
            system_prompt,
            user_prompt,
        )
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }
}
