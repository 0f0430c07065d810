use serde::{Deserialize, Serialize};

use crate::errors::GameError;
use crate::hand::Hand;
use crate::player::PlayerAction as A;
use crate::shoe::DEFAULT_DECKS;

/// Default cap on hands a player may hold after splitting.
pub const DEFAULT_MAX_HANDS: usize = 4;

/// House rules that are fixed for the lifetime of a table.
///
/// Dealer behaviour (stand on all 17s), the 3:2 blackjack payout and the ban
/// on surrendering a split hand are not configurable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableRules {
    /// Number of decks in the shoe
    pub num_decks: usize,
    /// Maximum hands per player, counting the original one
    pub max_hands: usize,
    /// Allow doubling on a hand produced by a split
    pub double_after_split: bool,
}

impl Default for TableRules {
    fn default() -> Self {
        Self {
            num_decks: DEFAULT_DECKS,
            max_hands: DEFAULT_MAX_HANDS,
            double_after_split: true,
        }
    }
}

/// Actions open to `hand` given the owner's `balance` and how many hands
/// the owner currently holds.
///
/// Hit and Stand are always offered to an unfinished hand. Double, Split and
/// Surrender are offered only on the first two cards.
///
/// # Examples
///
/// ```
/// use blackjack_engine::cards::{Card, Rank, Suit};
/// use blackjack_engine::hand::Hand;
/// use blackjack_engine::player::PlayerAction;
/// use blackjack_engine::rules::{legal_actions, TableRules};
///
/// let mut hand = Hand::new(100);
/// hand.add_card(Card::new(Rank::Eight, Suit::Clubs));
/// hand.add_card(Card::new(Rank::Eight, Suit::Diamonds));
///
/// let actions = legal_actions(&hand, 100, 1, &TableRules::default());
/// assert!(actions.contains(&PlayerAction::Split));
///
/// // Not enough left to fund a second wager
/// let actions = legal_actions(&hand, 99, 1, &TableRules::default());
/// assert_eq!(actions, vec![PlayerAction::Hit, PlayerAction::Stand, PlayerAction::Surrender]);
/// ```
pub fn legal_actions(hand: &Hand, balance: u32, hand_count: usize, rules: &TableRules) -> Vec<A> {
    if hand.finished || hand.state.is_terminal() {
        return Vec::new();
    }
    let mut actions = vec![A::Hit, A::Stand];
    if hand.cards.len() != 2 {
        return actions;
    }
    if hand.can_double(balance) && (!hand.from_split || rules.double_after_split) {
        actions.push(A::Double);
    }
    if hand.can_split(balance) && hand_count < rules.max_hands {
        actions.push(A::Split);
    }
    if hand.can_surrender() && !hand.from_split {
        actions.push(A::Surrender);
    }
    actions
}

/// Checks `action` against [`legal_actions`].
///
/// # Errors
///
/// - [`GameError::InsufficientFunds`] - Double or Split would be legal but the
///   balance cannot cover another wager
/// - [`GameError::IllegalAction`] - anything else outside the legal set
pub fn validate_action(
    hand: &Hand,
    balance: u32,
    hand_count: usize,
    rules: &TableRules,
    action: A,
) -> Result<A, GameError> {
    if legal_actions(hand, balance, hand_count, rules).contains(&action) {
        return Ok(action);
    }
    // Would the action be legal with unlimited chips?
    if matches!(action, A::Double | A::Split)
        && balance < hand.bet
        && legal_actions(hand, u32::MAX, hand_count, rules).contains(&action)
    {
        return Err(GameError::InsufficientFunds {
            needed: hand.bet,
            available: balance,
        });
    }
    Err(GameError::IllegalAction { action })
}
