use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use arena_agents::AgentResponse;
use arena_engine::game::Game;
use chrono::{SecondsFormat, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::events::{EventBus, UpdateEvent};
use crate::player::Player;
use crate::report::{MatchReport, SeatStats};

#[derive(Debug, Error)]
pub enum MatchError {
    #[error("Match thread panicked")]
    ThreadPanicked,
    #[error("Match command channel closed")]
    CommandChannelClosed,
}

/// Parses an agent response to find the action on the last line. A line
/// containing `action` and a colon yields the text after the last colon;
/// otherwise the last non-empty line is the action verbatim.
pub fn extract_action(text: &str) -> String {
    let last_line = match text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .next_back()
    {
        Some(line) => line,
        None => return String::new(),
    };

    let lower = last_line.to_lowercase();
    if lower.contains("action") && lower.contains(':') {
        if let Some(after) = last_line.rsplit(':').next() {
            return after.trim().to_string();
        }
    }
    last_line.to_string()
}

/// When the provider separated no reasoning block but the content is
/// materially longer than the extracted action, the whole content counts
/// as the agent's thinking for display purposes.
pub(crate) fn thinking_for_display(
    response: &AgentResponse,
    action: &str,
    margin: usize,
) -> Option<String> {
    if let Some(thinking) = &response.thinking {
        if !thinking.is_empty() {
            return Some(thinking.clone());
        }
    }
    let content = response.content.trim();
    if content.len() > action.trim().len() + margin {
        return Some(response.content.clone());
    }
    None
}

/// State and machinery shared by the generic loop and the poker
/// specialization: seat roster, event emission, and report accumulation.
pub(crate) struct MatchCore {
    pub match_id: String,
    pub players: Vec<Player>,
    pub system_prompt: String,
    pub current_idx: usize,
    pub turn: u32,
    pub running: Arc<AtomicBool>,
    bus: EventBus,
    stats: Vec<SeatStats>,
    log: Vec<UpdateEvent>,
    pub winner: Option<String>,
    pub winner_index: Option<usize>,
    pub error_by: Option<String>,
}

impl MatchCore {
    pub fn new(players: Vec<Player>, system_prompt: String, bus: EventBus) -> Self {
        let stats = players
            .iter()
            .map(|p| SeatStats::new(p.name.clone(), p.model_name()))
            .collect();
        Self {
            match_id: Uuid::new_v4().to_string(),
            players,
            system_prompt,
            current_idx: 0,
            turn: 0,
            running: Arc::new(AtomicBool::new(true)),
            bus,
            stats,
            log: Vec::new(),
            winner: None,
            winner_index: None,
            error_by: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Event attributed to the acting seat.
    pub fn seat_event(&self, board: serde_json::Value, message: impl Into<String>) -> UpdateEvent {
        let player = &self.players[self.current_idx];
        self.event_with(
            board,
            message,
            player.name.clone(),
            self.current_idx as i64,
            player.symbol.clone(),
        )
    }

    /// Event attributed to no seat (match lifecycle messages), so the sink
    /// does not color it as the previous player's.
    pub fn system_event(
        &self,
        board: serde_json::Value,
        message: impl Into<String>,
    ) -> UpdateEvent {
        self.event_with(board, message, "System".to_string(), -1, "S".to_string())
    }

    fn event_with(
        &self,
        board: serde_json::Value,
        message: impl Into<String>,
        current_player: String,
        current_player_idx: i64,
        current_symbol: String,
    ) -> UpdateEvent {
        UpdateEvent {
            board,
            turn: self.turn,
            message: message.into(),
            current_player,
            current_player_idx,
            current_symbol,
            is_thinking: false,
            game_over: false,
            winner: None,
            winner_index: None,
            metrics: None,
            raw_response: None,
            thinking: None,
            system_prompt: None,
            user_prompt: None,
            error_by: None,
            extra: BTreeMap::new(),
        }
    }

    /// Attach the full response payload (metrics, raw text, thinking,
    /// echoed prompts) to an event and fold the metrics into the seat's
    /// aggregates.
    pub fn attach_response(
        &mut self,
        event: &mut UpdateEvent,
        response: &AgentResponse,
        thinking: Option<String>,
    ) {
        event.metrics = Some(response.metrics.clone());
        event.raw_response = Some(response.content.clone());
        event.thinking = thinking;
        event.system_prompt = response.system_prompt.clone();
        event.user_prompt = response.user_prompt.clone();

        if let Some(stats) = self.stats.get_mut(self.current_idx) {
            stats.latency_ms_sum += response.metrics.latency_ms;
            stats.total_tokens += u64::from(response.metrics.total_tokens);
        }
    }

    pub fn record_invalid(&mut self, idx: usize) {
        if let Some(stats) = self.stats.get_mut(idx) {
            stats.invalid_moves += 1;
        }
    }

    /// Append to the ordered log and forward to the sink. Exactly one call
    /// per completed orchestrator step.
    pub fn emit(&mut self, event: UpdateEvent) {
        self.log.push(event.clone());
        self.bus.broadcast(&self.match_id, event);
    }

    pub fn into_report(self) -> MatchReport {
        MatchReport {
            match_id: self.match_id,
            winner: self.winner,
            winner_index: self.winner_index,
            error_by: self.error_by,
            turns: self.turn,
            seats: self.stats,
            events: self.log,
            finished_at: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
        }
    }
}

/// Generic turn-based match orchestrator: alternates seats, requests moves
/// from each seat's agent, applies them to the game, and emits one update
/// event per step. An invalid move is fatal to the match and credits the
/// other seat.
pub struct Match {
    core: MatchCore,
    game: Box<dyn Game>,
}

impl Match {
    pub fn new(
        game: Box<dyn Game>,
        players: Vec<Player>,
        system_prompt: impl Into<String>,
        bus: EventBus,
    ) -> Self {
        Self {
            core: MatchCore::new(players, system_prompt.into(), bus),
            game,
        }
    }

    pub fn id(&self) -> &str {
        &self.core.match_id
    }

    /// Flag the transport layer flips to request a stop; the loop exits
    /// after finishing its current iteration.
    pub fn stop_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.core.running)
    }

    /// Run the match on a dedicated background thread.
    pub fn spawn(self) -> MatchHandle {
        let id = self.core.match_id.clone();
        let stop = self.stop_flag();
        let join = thread::spawn(move || self.run());
        MatchHandle { id, stop, join }
    }

    /// Drive the match to completion on the calling thread and return the
    /// report for the persistence collaborator.
    pub fn run(mut self) -> MatchReport {
        let core = &mut self.core;
        let roster = core
            .players
            .iter()
            .map(|p| p.name.as_str())
            .collect::<Vec<_>>()
            .join(" vs ");
        tracing::info!(match_id = %core.match_id, %roster, "match starting");

        let ev = core.system_event(self.game.board_state(), "Game started");
        core.emit(ev);

        while !self.game.is_game_over() && core.is_running() {
            let player_name = core.players[core.current_idx].name.clone();
            let symbol = core.players[core.current_idx].symbol.clone();

            let mut ev = core.seat_event(
                self.game.board_state(),
                format!("{player_name} is thinking..."),
            );
            ev.is_thinking = true;
            core.emit(ev);

            let state = self.game.state_for_player(core.current_idx);
            let response =
                core.players[core.current_idx].get_move(&state, &core.system_prompt);
            let action = extract_action(&response.content);
            let thinking = thinking_for_display(&response, &action, 5);

            if self.game.make_move(&action, &symbol) {
                let mut ev = core.seat_event(
                    self.game.board_state(),
                    format!("{player_name} played {action}"),
                );
                core.attach_response(&mut ev, &response, thinking);
                core.emit(ev);

                core.current_idx = (core.current_idx + 1) % core.players.len();
                core.turn += 1;
                tracing::info!(
                    match_id = %core.match_id,
                    turn = core.turn,
                    player = %player_name,
                    action = %action,
                    "move accepted"
                );
            } else {
                // Fatal for simple turn-based games: the opponent wins
                tracing::warn!(
                    match_id = %core.match_id,
                    player = %player_name,
                    action = %action,
                    "invalid move ends the match"
                );
                let winner_idx = (core.current_idx + 1) % core.players.len();
                let winner_name = core.players[winner_idx].name.clone();

                core.record_invalid(core.current_idx);
                let mut ev = core.seat_event(
                    self.game.board_state(),
                    format!("Invalid move by {player_name}. Game over."),
                );
                core.attach_response(&mut ev, &response, thinking);
                ev.game_over = true;
                ev.winner = Some(winner_name.clone());
                ev.winner_index = Some(winner_idx);
                ev.error_by = Some(player_name.clone());
                core.emit(ev);

                core.winner = Some(winner_name);
                core.winner_index = Some(winner_idx);
                core.error_by = Some(player_name);
                return self.core.into_report();
            }
        }

        // Natural termination: resolve the winner by symbol lookup
        let winner_symbol = self.game.winner();
        let (winner_name, winner_idx) = match winner_symbol {
            Some(symbol) => core
                .players
                .iter()
                .enumerate()
                .find(|(_, p)| p.symbol == symbol)
                .map(|(i, p)| (Some(p.name.clone()), Some(i)))
                .unwrap_or((None, None)),
            None => (None, None),
        };

        let message = match &winner_name {
            Some(name) => format!("Winner: {name}"),
            None => "Draw!".to_string(),
        };
        let mut ev = core.system_event(self.game.board_state(), message);
        ev.game_over = true;
        ev.winner = winner_name.clone();
        ev.winner_index = winner_idx;
        core.emit(ev);

        core.winner = winner_name;
        core.winner_index = winner_idx;
        self.core.into_report()
    }
}

/// Handle to a match running on its own thread.
pub struct MatchHandle {
    id: String,
    stop: Arc<AtomicBool>,
    join: JoinHandle<MatchReport>,
}

impl MatchHandle {
    pub(crate) fn from_parts(
        id: String,
        stop: Arc<AtomicBool>,
        join: JoinHandle<MatchReport>,
    ) -> Self {
        Self { id, stop, join }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Request the loop to exit after its current iteration. No in-flight
    /// agent request is cancelled.
    pub fn stop(&self) {
        self.stop.store(false, Ordering::Release);
    }

    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }

    pub fn join(self) -> Result<MatchReport, MatchError> {
        self.join.join().map_err(|_| MatchError::ThreadPanicked)
    }
}
