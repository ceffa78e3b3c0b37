use arena_agents::{AgentResponse, MoveAgent};

/// Binds a display identity and board symbol to a move-generating agent
/// for the lifetime of one match.
pub struct Player {
    pub name: String,
    pub symbol: String,
    agent: Box<dyn MoveAgent>,
}

impl Player {
    pub fn new(
        name: impl Into<String>,
        symbol: impl Into<String>,
        agent: Box<dyn MoveAgent>,
    ) -> Self {
        Self {
            name: name.into(),
            symbol: symbol.into(),
            agent,
        }
    }

    /// Ask the agent for the next move given the rendered game state. May
    /// block for as long as the agent needs (network latency, human wait).
    pub fn get_move(&self, game_state: &str, system_prompt: &str) -> AgentResponse {
        self.agent.generate(system_prompt, game_state)
    }

    pub fn model_name(&self) -> &str {
        self.agent.model_name()
    }
}

impl std::fmt::Debug for Player {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Player")
            .field("name", &self.name)
            .field("symbol", &self.symbol)
            .field("agent", &self.agent.model_name())
            .finish()
    }
}
