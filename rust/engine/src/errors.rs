use thiserror::Error;

use crate::engine::RoundPhase;
use crate::player::PlayerAction;

/// Everything the engine can refuse to do.
///
/// A rejected call changes nothing: shoe, hands and balances are left as they
/// were. [`GameError::Interrupted`] is the one error that ends the round.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GameError {
    #[error("Invalid bet amount: {amount}, balance: {balance}")]
    InvalidBet { amount: u32, balance: u32 },
    #[error("Action {action:?} is not allowed for this hand")]
    IllegalAction { action: PlayerAction },
    #[error("Insufficient funds: need {needed}, have {available}")]
    InsufficientFunds { needed: u32, available: u32 },
    #[error("No players remain at the table")]
    NoPlayersRemain,
    #[error("No player at seat {0}")]
    UnknownPlayer(usize),
    #[error("Player {player} has no hand {hand}")]
    UnknownHand { player: usize, hand: usize },
    #[error("Expected phase {expected:?}, round is in {actual:?}")]
    WrongPhase {
        expected: RoundPhase,
        actual: RoundPhase,
    },
    #[error("It's not hand {actual:?}'s turn (expected {expected:?})")]
    NotPlayersTurn {
        expected: Option<(usize, usize)>,
        actual: (usize, usize),
    },
    #[error("Player {0} has not placed a bet")]
    MissingBet(usize),
    #[error("Player {0} already placed a bet this round")]
    BetAlreadyPlaced(usize),
    #[error("Insurance is not available for this hand")]
    InsuranceUnavailable,
    #[error("Table seats {min} to {max} players, got {actual}")]
    TableSize { min: usize, max: usize, actual: usize },
    #[error("Round interrupted")]
    Interrupted,
}

impl GameError {
    /// True for errors the caller should answer by asking the player again.
    pub fn is_reprompt(&self) -> bool {
        matches!(
            self,
            GameError::InvalidBet { .. }
                | GameError::IllegalAction { .. }
                | GameError::InsufficientFunds { .. }
                | GameError::InsuranceUnavailable
        )
    }
}
