use serde::{Deserialize, Serialize};

use crate::cards::Card;
use crate::errors::GameError;
use crate::hand::Hand;

/// A decision a player can make for the current hand.
/// Which of these are legal at any moment is decided by [`crate::rules`].
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum PlayerAction {
    /// Take one more card
    Hit,
    /// Keep the current total
    Stand,
    /// Double the wager, take exactly one card, then stop
    Double,
    /// Turn a pair into two hands with equal wagers
    Split,
    /// Give up the hand for half the wager back
    Surrender,
}

/// Default starting balance for each player in chips
pub const STARTING_BALANCE: u32 = 5_000;

/// A seated player with a chip balance and the hands of the current round.
/// Every balance change goes through [`Player::debit`] or [`Player::credit`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    name: String,
    balance: u32,
    /// Hands for this round; more than one only after a split
    hands: Vec<Hand>,
}

impl Player {
    pub fn new(name: impl Into<String>, balance: u32) -> Self {
        Self {
            name: name.into(),
            balance,
            hands: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn balance(&self) -> u32 {
        self.balance
    }

    pub fn hands(&self) -> &[Hand] {
        &self.hands
    }

    pub fn hand(&self, index: usize) -> Option<&Hand> {
        self.hands.get(index)
    }

    pub(crate) fn hands_mut(&mut self) -> &mut Vec<Hand> {
        &mut self.hands
    }

    /// Removes `amount` from the balance, refusing to go below zero.
    pub fn debit(&mut self, amount: u32) -> Result<(), GameError> {
        if amount > self.balance {
            return Err(GameError::InsufficientFunds {
                needed: amount,
                available: self.balance,
            });
        }
        self.balance -= amount;
        Ok(())
    }

    pub fn credit(&mut self, amount: u32) {
        self.balance = self.balance.saturating_add(amount);
    }

    /// Debits the wager and opens a fresh hand for the round.
    pub fn start_hand(&mut self, bet: u32) -> Result<(), GameError> {
        if bet == 0 || bet > self.balance {
            return Err(GameError::InvalidBet {
                amount: bet,
                balance: self.balance,
            });
        }
        self.debit(bet)?;
        self.hands = vec![Hand::new(bet)];
        Ok(())
    }

    pub fn clear_hands(&mut self) {
        self.hands.clear();
    }

    pub fn all_hands_finished(&self) -> bool {
        self.hands.iter().all(|h| h.finished)
    }

    pub fn is_broke(&self) -> bool {
        self.balance == 0
    }
}

/// The house. Holds exactly one hand and no balance.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Dealer {
    hand: Hand,
}

impl Dealer {
    pub fn new() -> Self {
        Self { hand: Hand::new(0) }
    }

    pub fn hand(&self) -> &Hand {
        &self.hand
    }

    pub(crate) fn receive_card(&mut self, card: Card) {
        self.hand.add_card(card);
    }

    pub fn clear_hand(&mut self) {
        self.hand = Hand::new(0);
    }

    /// The face-up card: the second one dealt.
    pub fn upcard(&self) -> Option<Card> {
        self.hand.cards.get(1).copied()
    }

    /// Stands on every 17, soft or hard.
    pub fn should_hit(&self) -> bool {
        self.hand.value() < 17
    }
}
