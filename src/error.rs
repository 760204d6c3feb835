use std::fmt;

use crate::blackjack::{Card, Role};

// Errors raised while dealing or playing a single round.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GameError {
    UnknownRank(String),
    MissingPolicy(Role),
    // The undealt pool ran dry and the discard pool was too small to reshuffle.
    ShoeExhausted { discarded: usize, minimum: usize },
    EmptyRefill,
    StackUnavailable(Card),
}

impl fmt::Display for GameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownRank(s) => write!(f, "unknown rank: {:?}", s),
            Self::MissingPolicy(role) => write!(f, "{} has no policy", role),
            Self::ShoeExhausted { discarded, minimum } => write!(
                f,
                "shoe exhausted: {} cards in the discard pool, more than {} required",
                discarded, minimum
            ),
            Self::EmptyRefill => write!(f, "cannot refill the shoe with no cards"),
            Self::StackUnavailable(card) => {
                write!(f, "no {} left in the deck to stack", card)
            }
        }
    }
}

impl std::error::Error for GameError {}

// A round failure, tagged with the index of the round that aborted the run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SimulationError {
    pub round: usize,
    pub source: GameError,
}

impl fmt::Display for SimulationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "round {} aborted: {}", self.round, self.source)
    }
}

impl std::error::Error for SimulationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.source)
    }
}
