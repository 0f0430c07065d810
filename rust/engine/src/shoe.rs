use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use tracing::debug;

use crate::cards::{full_deck, Card};

/// Default number of decks in a shoe.
pub const DEFAULT_DECKS: usize = 6;

/// A multi-deck supply of cards that never runs dry.
///
/// Cards are drawn from the end of the sequence. When the sequence is empty
/// the shoe is rebuilt from `num_decks` fresh decks and reshuffled before the
/// draw completes, so [`Shoe::draw`] is total.
///
/// # Examples
///
/// ```
/// use blackjack_engine::shoe::Shoe;
///
/// let mut shoe = Shoe::new_with_seed(6, 42);
/// assert_eq!(shoe.size(), 6 * 52);
/// let _card = shoe.draw();
/// assert_eq!(shoe.size(), 6 * 52 - 1);
/// ```
#[derive(Debug)]
pub struct Shoe {
    /// Remaining cards; the last element is the top of the shoe
    cards: Vec<Card>,
    /// Number of 52-card decks used on every rebuild
    num_decks: usize,
    rng: ChaCha20Rng,
    /// How many times an empty shoe has been rebuilt
    reshuffles: usize,
}

impl Shoe {
    /// Builds and shuffles a shoe of `num_decks` decks.
    pub fn new_with_seed(num_decks: usize, seed: u64) -> Self {
        let mut shoe = Self {
            cards: Vec::new(),
            num_decks: num_decks.max(1),
            rng: ChaCha20Rng::seed_from_u64(seed),
            reshuffles: 0,
        };
        shoe.build();
        shoe.shuffle();
        shoe
    }

    /// A shoe that deals `cards` in the given order before falling back to
    /// normal rebuild-on-empty behaviour.
    pub fn stacked(num_decks: usize, seed: u64, cards: Vec<Card>) -> Self {
        let mut cards = cards;
        cards.reverse();
        Self {
            cards,
            num_decks: num_decks.max(1),
            rng: ChaCha20Rng::seed_from_u64(seed),
            reshuffles: 0,
        }
    }

    /// Refills the shoe with `num_decks` decks in suit × rank order.
    pub fn build(&mut self) {
        let deck = full_deck();
        self.cards = Vec::with_capacity(deck.len() * self.num_decks);
        for _ in 0..self.num_decks {
            self.cards.extend_from_slice(&deck);
        }
    }

    pub fn shuffle(&mut self) {
        self.cards.shuffle(&mut self.rng);
    }

    pub fn draw(&mut self) -> Card {
        loop {
            if let Some(card) = self.cards.pop() {
                return card;
            }
            self.build();
            self.shuffle();
            self.reshuffles += 1;
            debug!(
                decks = self.num_decks,
                reshuffles = self.reshuffles,
                "shoe exhausted, rebuilt"
            );
        }
    }

    pub fn size(&self) -> usize {
        self.cards.len()
    }

    pub fn num_decks(&self) -> usize {
        self.num_decks
    }

    pub fn reshuffles(&self) -> usize {
        self.reshuffles
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::{Rank, Suit};

    #[test]
    fn build_is_deterministic_before_shuffle() {
        let mut shoe = Shoe::stacked(2, 0, Vec::new());
        shoe.build();
        assert_eq!(shoe.size(), 104);
        // top of the shoe is the last card of the second deck
        assert_eq!(shoe.draw(), Card::new(Rank::Ace, Suit::Spades));
        assert_eq!(shoe.reshuffles(), 0);
    }

    #[test]
    fn stacked_cards_come_out_in_order() {
        let a = Card::new(Rank::Ace, Suit::Hearts);
        let k = Card::new(Rank::King, Suit::Clubs);
        let mut shoe = Shoe::stacked(1, 7, vec![a, k]);
        assert_eq!(shoe.draw(), a);
        assert_eq!(shoe.draw(), k);
        assert_eq!(shoe.size(), 0);
        let _ = shoe.draw();
        assert_eq!(shoe.reshuffles(), 1);
        assert_eq!(shoe.size(), 51);
    }
}
