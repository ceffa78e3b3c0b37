//! # arena-engine: Game Engines for Agent Matches
//!
//! Game state machines for turn-based agent-vs-agent matches: two grid
//! games (3x3 Tic-Tac-Toe and 9x9 Connect-5) and a multi-seat No-Limit
//! Hold'em table, all behind one [`game::Game`] capability trait the match
//! orchestrator drives.
//!
//! ## Core Modules
//!
//! - [`cards`] - Card representation (Suit, Rank, Card) and deck construction
//! - [`deck`] - Deterministic deck shuffling with ChaCha20 RNG
//! - [`hand`] - Poker hand evaluation over 5-7 cards with core/kicker split
//! - [`game`] - The `Game` capability trait and the variant factory
//! - [`grid`] - TicTacToe and TicTacToePlus engines
//! - [`poker`] - Multi-seat betting-round state machine
//! - [`errors`] - Error types for game operations
//!
//! ## Quick Start
//!
//! ```rust
//! use arena_engine::game::{create_game, GameKind};
//!
//! let names = vec!["Alice".to_string(), "Bob".to_string()];
//! let mut game = create_game(GameKind::TicTacToe, &names, None).unwrap();
//! assert!(game.make_move("1,1", "X"));
//! assert!(!game.is_game_over());
//! ```
//!
//! ## Deterministic Gameplay
//!
//! Poker decks are seedable, so a seeded engine replays the same hands:
//!
//! ```rust
//! use arena_engine::poker::{PokerConfig, PokerEngine};
//!
//! let names = vec!["Alice".to_string(), "Bob".to_string()];
//! let a = PokerEngine::new(names.clone(), PokerConfig::default(), Some(42)).unwrap();
//! let b = PokerEngine::new(names, PokerConfig::default(), Some(42)).unwrap();
//! assert_eq!(a.seats()[0].hole, b.seats()[0].hole);
//! ```

pub mod cards;
pub mod deck;
pub mod errors;
pub mod game;
pub mod grid;
pub mod hand;
pub mod poker;
