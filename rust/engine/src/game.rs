use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::GameError;
use crate::grid::{TicTacToe, TicTacToePlus};
use crate::poker::{PokerConfig, PokerEngine};

/// Capability contract every playable game implements. The match
/// orchestrator drives games exclusively through this interface.
pub trait Game: Send {
    /// Read-only copy of the public board state. Implementations must
    /// return a fresh value on every call so history buffers never alias
    /// live state.
    fn board_state(&self) -> serde_json::Value;

    /// Currently legal move descriptors.
    fn available_moves(&self) -> Vec<String>;

    /// Parse and validate `mv` for the acting seat. Returns false on any
    /// invalid, malformed, or illegal move without mutating state; on
    /// success mutates state and advances internal turn bookkeeping.
    fn make_move(&mut self, mv: &str, symbol: &str) -> bool;

    fn is_game_over(&self) -> bool;

    /// Winning symbol/name once decided; None while running or on a draw.
    fn winner(&self) -> Option<String>;

    /// Natural-language description of the game from one seat's point of
    /// view, hiding other seats' hidden information.
    fn state_for_player(&self, idx: usize) -> String;
}

/// Tag selecting a concrete game variant at match construction time.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameKind {
    TicTacToe,
    TicTacToePlus,
    Poker,
}

impl FromStr for GameKind {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "tictactoe" => Ok(GameKind::TicTacToe),
            "tictactoe_plus" | "tictactoeplus" => Ok(GameKind::TicTacToePlus),
            "poker" => Ok(GameKind::Poker),
            other => Err(GameError::UnknownGameKind(other.to_string())),
        }
    }
}

/// Construct a game variant. `seat_names` is used by poker to label seats;
/// grid games ignore it. `seed` makes poker decks reproducible.
pub fn create_game(
    kind: GameKind,
    seat_names: &[String],
    seed: Option<u64>,
) -> Result<Box<dyn Game>, GameError> {
    match kind {
        GameKind::TicTacToe => Ok(Box::new(TicTacToe::new())),
        GameKind::TicTacToePlus => Ok(Box::new(TicTacToePlus::new())),
        GameKind::Poker => {
            let engine = PokerEngine::new(seat_names.to_vec(), PokerConfig::default(), seed)?;
            Ok(Box::new(engine))
        }
    }
}
