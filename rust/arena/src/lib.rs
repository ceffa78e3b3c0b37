//! # arena-match: Match Orchestration
//!
//! Drives turn-based matches between move-generating agents: the generic
//! [`Match`] loop for two-player grid games, the [`PokerMatch`]
//! specialization for multi-seat poker, and the [`EventBus`] that carries
//! one ordered [`UpdateEvent`] per orchestrator step to the external
//! transport.
//!
//! Each match runs on a dedicated background thread, fully isolated from
//! every other match. The transport talks to a running match through three
//! thread-safe seams only: the event bus subscription, the stop flag on the
//! match handle, and (poker) the bounded inbound command channel.
//!
//! ```no_run
//! use arena_agents::ScriptedAgent;
//! use arena_engine::grid::TicTacToe;
//! use arena_match::{EventBus, Match, Player};
//!
//! let bus = EventBus::new();
//! let players = vec![
//!     Player::new("Alice", "X", Box::new(ScriptedAgent::new(["0,0", "0,1", "0,2"]))),
//!     Player::new("Bob", "O", Box::new(ScriptedAgent::new(["1,0", "1,1"]))),
//! ];
//! let game = Box::new(TicTacToe::new());
//! let m = Match::new(game, players, "You are playing Tic-Tac-Toe.", bus.clone());
//! let _sub = bus.subscribe(m.id().to_string());
//! let report = m.run();
//! assert_eq!(report.winner.as_deref(), Some("Alice"));
//! ```

pub mod events;
pub mod match_loop;
pub mod player;
pub mod poker_match;
pub mod report;

pub use events::{EventBus, EventSubscription, MatchId, UpdateEvent};
pub use match_loop::{extract_action, Match, MatchError, MatchHandle};
pub use player::Player;
pub use poker_match::{MatchCommand, PokerMatch, PokerMatchHandle};
pub use report::{MatchReport, SeatStats};
