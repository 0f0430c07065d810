use std::fmt;

use serde::{Deserialize, Serialize};

use crate::cards::Card;

/// Where a hand sits in the per-hand action state machine.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub enum HandState {
    /// Still awaiting a decision (or not yet evaluated)
    Active,
    /// Player stood, or reached 21 and stood automatically
    Stood,
    /// Total went over 21
    Busted,
    /// Two-card 21
    Blackjack,
    /// Wager doubled and the single extra card taken
    Doubled,
    /// Given up for half the wager back
    Surrendered,
}

impl HandState {
    /// True for every state that ends the hand's turn.
    pub fn is_terminal(self) -> bool {
        self != HandState::Active
    }
}

/// Blackjack total of `cards`: Aces start at 11 and drop to 1 one at a time
/// while the total is over 21.
pub fn hand_value(cards: &[Card]) -> u32 {
    let (total, _) = value_and_soft_aces(cards);
    total
}

fn value_and_soft_aces(cards: &[Card]) -> (u32, u32) {
    let mut total: u32 = cards.iter().map(Card::value).sum();
    let mut aces = cards.iter().filter(|c| c.is_ace()).count() as u32;
    while total > 21 && aces > 0 {
        total -= 10;
        aces -= 1;
    }
    (total, aces)
}

/// One set of cards with its wager.
///
/// The hand only answers value and eligibility questions; bets, flags and
/// state are changed by the [`crate::engine::Engine`].
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct Hand {
    pub cards: Vec<Card>,
    pub bet: u32,
    pub insurance_bet: u32,
    pub has_doubled: bool,
    pub finished: bool,
    /// Set on both hands produced by a split
    pub from_split: bool,
    pub state: HandState,
}

impl Hand {
    pub fn new(bet: u32) -> Self {
        Self {
            cards: Vec::with_capacity(2),
            bet,
            insurance_bet: 0,
            has_doubled: false,
            finished: false,
            from_split: false,
            state: HandState::Active,
        }
    }

    /// A one-card hand carved out of a split pair.
    pub fn split_from(card: Card, bet: u32) -> Self {
        let mut hand = Self::new(bet);
        hand.cards.push(card);
        hand.from_split = true;
        hand
    }

    pub fn add_card(&mut self, card: Card) {
        self.cards.push(card);
    }

    pub fn value(&self) -> u32 {
        hand_value(&self.cards)
    }

    /// True while at least one Ace is still counted as 11.
    pub fn is_soft(&self) -> bool {
        let (total, aces) = value_and_soft_aces(&self.cards);
        aces > 0 && total <= 21
    }

    pub fn is_busted(&self) -> bool {
        self.value() > 21
    }

    pub fn is_blackjack(&self) -> bool {
        self.cards.len() == 2 && self.value() == 21
    }

    pub fn can_split(&self, balance: u32) -> bool {
        self.cards.len() == 2 && self.cards[0].rank == self.cards[1].rank && balance >= self.bet
    }

    pub fn can_double(&self, balance: u32) -> bool {
        self.cards.len() == 2 && balance >= self.bet
    }

    pub fn can_surrender(&self) -> bool {
        self.cards.len() == 2
    }

    pub(crate) fn finish(&mut self, state: HandState) {
        self.state = state;
        self.finished = true;
    }
}

impl Default for Hand {
    fn default() -> Self {
        Self::new(0)
    }
}

impl fmt::Display for Hand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cards: Vec<String> = self.cards.iter().map(ToString::to_string).collect();
        write!(f, "{}", cards.join(" "))
    }
}
