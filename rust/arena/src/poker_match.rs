use std::sync::mpsc::{sync_channel, Receiver, RecvTimeoutError, SyncSender};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use arena_engine::game::Game;
use arena_engine::poker::{PokerEngine, SeatStatus, Stage};
use serde_json::json;

use crate::events::EventBus;
use crate::match_loop::{extract_action, thinking_for_display, MatchCore, MatchError, MatchHandle};
use crate::player::Player;
use crate::report::MatchReport;

/// Commands the transport can inject into a running poker match.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum MatchCommand {
    /// Leave the HAND_OVER pause and deal the next hand.
    NextHand,
}

// Poll interval while paused at HAND_OVER, so the loop stays responsive to
// the stop flag even with no inbound command.
const COMMAND_POLL: Duration = Duration::from_millis(500);
const COMMAND_QUEUE_DEPTH: usize = 16;

/// Poker specialization of the match orchestrator.
///
/// Differs from the generic loop in four ways: the engine's current-actor
/// index is authoritative and re-read every iteration, non-active seats are
/// skipped, an invalid move forces a fold instead of ending the match, and
/// the loop pauses at HAND_OVER until the transport sends
/// [`MatchCommand::NextHand`].
pub struct PokerMatch {
    core: MatchCore,
    engine: PokerEngine,
    commands: Receiver<MatchCommand>,
    command_tx: SyncSender<MatchCommand>,
}

impl PokerMatch {
    pub fn new(
        engine: PokerEngine,
        players: Vec<Player>,
        system_prompt: impl Into<String>,
        bus: EventBus,
    ) -> Self {
        let (command_tx, commands) = sync_channel(COMMAND_QUEUE_DEPTH);
        Self {
            core: MatchCore::new(players, system_prompt.into(), bus),
            engine,
            commands,
            command_tx,
        }
    }

    pub fn id(&self) -> &str {
        &self.core.match_id
    }

    /// Thread-safe sender for commands from the transport layer.
    pub fn command_sender(&self) -> SyncSender<MatchCommand> {
        self.command_tx.clone()
    }

    pub fn spawn(self) -> PokerMatchHandle {
        let id = self.core.match_id.clone();
        let stop = Arc::clone(&self.core.running);
        let commands = self.command_tx.clone();
        let join = thread::spawn(move || self.run());
        PokerMatchHandle {
            inner: MatchHandle::from_parts(id, stop, join),
            commands,
        }
    }

    pub fn run(mut self) -> MatchReport {
        tracing::info!(
            match_id = %self.core.match_id,
            seats = self.core.players.len(),
            "poker match starting"
        );

        // The engine seats the opening action on UTG, not on seat 0
        self.core.current_idx = self.engine.current_idx();
        let ev = self
            .core
            .system_event(self.engine.board_state(), "Poker Game started");
        self.core.emit(ev);

        while !self.engine.is_game_over() && self.core.is_running() {
            // Between hands: wait for the explicit next-hand command,
            // polling so the stop flag is still honored
            if self.engine.stage() == Stage::HandOver {
                match self.commands.recv_timeout(COMMAND_POLL) {
                    Ok(MatchCommand::NextHand) => {
                        if let Err(e) = self.engine.start_new_hand() {
                            tracing::error!(
                                match_id = %self.core.match_id,
                                error = %e,
                                "failed to start next hand"
                            );
                            break;
                        }
                        self.core.current_idx = self.engine.current_idx();
                        let ev = self
                            .core
                            .system_event(self.engine.board_state(), "New hand started");
                        self.core.emit(ev);
                    }
                    Err(RecvTimeoutError::Timeout) => {}
                    Err(RecvTimeoutError::Disconnected) => {
                        tracing::warn!(
                            match_id = %self.core.match_id,
                            "command channel closed, stopping match"
                        );
                        break;
                    }
                }
                continue;
            }

            let stage_before = self.engine.stage();

            // The engine may have moved the action (stage change, forced
            // fold); always resynchronize before selecting a player
            self.core.current_idx = self.engine.current_idx();
            let mut hops = 0;
            while self.engine.seats()[self.core.current_idx].status != SeatStatus::Active {
                self.core.current_idx = (self.core.current_idx + 1) % self.core.players.len();
                hops += 1;
                if hops > self.core.players.len() {
                    tracing::error!(
                        match_id = %self.core.match_id,
                        "no active seat found, stopping match"
                    );
                    return self.core.into_report();
                }
            }
            self.engine.set_current_idx(self.core.current_idx);

            let acting_idx = self.core.current_idx;
            let player_name = self.core.players[acting_idx].name.clone();
            let symbol = self.core.players[acting_idx].symbol.clone();

            let mut ev = self.core.seat_event(
                self.engine.board_state(),
                format!("{player_name} is thinking..."),
            );
            ev.is_thinking = true;
            self.core.emit(ev);

            let state = self.engine.state_for_player(acting_idx);
            let response = self.core.players[acting_idx].get_move(&state, &self.core.system_prompt);
            let action = extract_action(&response.content);
            let thinking = thinking_for_display(&response, &action, 10);

            if self.engine.make_move(&action, &symbol) {
                let mut ev = self.core.seat_event(
                    self.engine.board_state(),
                    format!("{player_name} played {action}"),
                );
                self.core.attach_response(&mut ev, &response, thinking);
                // Spectators get to see what a folding seat threw away
                if action.to_lowercase().contains("fold") {
                    ev.extra
                        .insert("folded_cards".to_string(), self.folded_cards(acting_idx));
                }
                self.core.emit(ev);
                self.core.turn += 1;
                tracing::info!(
                    match_id = %self.core.match_id,
                    turn = self.core.turn,
                    player = %player_name,
                    action = %action,
                    stage = self.engine.stage().as_str(),
                    "move accepted"
                );
            } else {
                // Invalid move is not fatal in poker: force the fold and
                // keep the table running
                tracing::warn!(
                    match_id = %self.core.match_id,
                    player = %player_name,
                    action = %action,
                    "invalid move, forcing fold"
                );
                let folded = self.folded_cards(acting_idx);
                self.engine.force_fold(acting_idx);

                self.core.record_invalid(acting_idx);
                let mut ev = self.core.seat_event(
                    self.engine.board_state(),
                    format!("Invalid move '{action}' by {player_name}. Forced Fold."),
                );
                self.core.attach_response(&mut ev, &response, thinking);
                ev.error_by = Some(player_name.clone());
                ev.extra.insert("folded_cards".to_string(), folded);
                self.core.emit(ev);
                self.core.turn += 1;
            }

            // Announce stage transitions caused by the move or forced fold
            let stage_after = self.engine.stage();
            if stage_after != stage_before {
                tracing::info!(
                    match_id = %self.core.match_id,
                    from = stage_before.as_str(),
                    to = stage_after.as_str(),
                    "stage changed"
                );
                if stage_after == Stage::HandOver {
                    self.emit_hand_summary();
                } else {
                    let ev = self.core.system_event(
                        self.engine.board_state(),
                        format!("--- {} ---", stage_after.as_str()),
                    );
                    self.core.emit(ev);
                }
            }
        }

        let winner_name = self.engine.winner();
        let winner_idx = self.engine.winner_idx();
        let message = match &winner_name {
            Some(name) => format!("Winner: {name}"),
            None => "Match stopped".to_string(),
        };
        let mut ev = self.core.system_event(self.engine.board_state(), message);
        ev.game_over = self.engine.is_game_over();
        ev.winner = winner_name.clone();
        ev.winner_index = winner_idx;
        self.core.emit(ev);

        self.core.winner = winner_name;
        self.core.winner_index = winner_idx;
        self.core.into_report()
    }

    fn folded_cards(&self, idx: usize) -> serde_json::Value {
        let cards: Vec<String> = self.engine.seats()[idx]
            .hole
            .iter()
            .map(|c| c.to_string())
            .collect();
        json!(cards)
    }

    fn emit_hand_summary(&mut self) {
        match self.engine.last_hand_result() {
            Some(result) => {
                let winners = result.winners.join(", ");
                let pot = result.pot;
                let result_json = json!(result);
                let mut ev = self.core.system_event(
                    self.engine.board_state(),
                    format!("Hand Finished. Winner: {winners} (${pot})"),
                );
                ev.extra.insert("hand_result".to_string(), result_json);
                ev.extra.insert("is_hand_summary".to_string(), json!(true));
                self.core.emit(ev);
            }
            None => {
                let ev = self.core.system_event(
                    self.engine.board_state(),
                    "--- HAND OVER (No Result Data) ---",
                );
                self.core.emit(ev);
            }
        }
    }
}

/// Handle to a poker match running on its own thread; adds the inbound
/// command channel to the generic handle.
pub struct PokerMatchHandle {
    inner: MatchHandle,
    commands: SyncSender<MatchCommand>,
}

impl PokerMatchHandle {
    pub fn id(&self) -> &str {
        self.inner.id()
    }

    /// Request the loop to exit after its current iteration. No in-flight
    /// agent request is cancelled.
    pub fn stop(&self) {
        self.inner.stop();
    }

    pub fn is_finished(&self) -> bool {
        self.inner.is_finished()
    }

    /// Deliver a command from the transport. Fails once the match thread
    /// has exited and dropped its receiver, or when the bounded queue is
    /// full.
    pub fn send_command(&self, cmd: MatchCommand) -> Result<(), MatchError> {
        self.commands
            .try_send(cmd)
            .map_err(|_| MatchError::CommandChannelClosed)
    }

    pub fn join(self) -> Result<MatchReport, MatchError> {
        // Drop our sender first so a match paused at HAND_OVER observes the
        // channel closing instead of waiting forever
        drop(self.commands);
        self.inner.join()
    }

    pub fn stop_and_join(self) -> Result<MatchReport, MatchError> {
        self.stop();
        self.join()
    }
}
