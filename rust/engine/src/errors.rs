use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GameError {
    #[error("Deck exhausted: requested {requested} cards, {remaining} remaining")]
    DeckExhausted { requested: usize, remaining: usize },
    #[error("Not enough players: need at least 2, got {0}")]
    NotEnoughPlayers(usize),
    #[error("Too many players: {0} (a 52-card deck seats at most 23)")]
    TooManyPlayers(usize),
    #[error("Unknown game kind: {0}")]
    UnknownGameKind(String),
}
