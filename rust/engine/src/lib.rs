//! # blackjack-engine: Casino Blackjack Round Engine
//!
//! A turn-based Blackjack engine for one dealer and one to seven players.
//! Handles soft/hard hand values, the per-hand action state machine (hit,
//! stand, double, split, surrender), insurance, dealer play and payouts,
//! with a seedable multi-deck shoe for reproducible rounds.
//!
//! ## Core Modules
//!
//! - [`cards`] - Card representation (Suit, Rank, Card) and deck construction
//! - [`shoe`] - Multi-deck shoe that rebuilds itself when empty
//! - [`hand`] - Hand value, blackjack detection and split/double eligibility
//! - [`player`] - Players, the dealer, the chip ledger and [`player::PlayerAction`]
//! - [`rules`] - Table rules and action legality
//! - [`engine`] - Round state machine and payout resolution
//! - [`round`] - Full-round driver over a [`round::Decider`]
//! - [`config`] - Table configuration from TOML and environment
//! - [`logger`] - RoundRecord JSONL audit log
//! - [`errors`] - Error types for game operations
//!
//! ## Quick Start
//!
//! ```rust
//! use blackjack_engine::cards::{Card, Rank, Suit};
//! use blackjack_engine::hand::Hand;
//!
//! let mut hand = Hand::new(100);
//! hand.add_card(Card::new(Rank::Ace, Suit::Spades));
//! hand.add_card(Card::new(Rank::Ace, Suit::Hearts));
//! hand.add_card(Card::new(Rank::Nine, Suit::Clubs));
//!
//! // One Ace counts 11, the other 1
//! assert_eq!(hand.value(), 21);
//! assert!(!hand.is_blackjack());
//! ```
//!
//! ## Deterministic Rounds
//!
//! The shoe is shuffled with a seeded ChaCha20 RNG, so the same seed and the
//! same decisions replay the same round:
//!
//! ```rust
//! use blackjack_engine::shoe::Shoe;
//!
//! let mut a = Shoe::new_with_seed(6, 42);
//! let mut b = Shoe::new_with_seed(6, 42);
//! assert_eq!(a.draw(), b.draw());
//! ```

pub mod cards;
pub mod config;
pub mod engine;
pub mod errors;
pub mod hand;
pub mod logger;
pub mod player;
pub mod round;
pub mod rules;
pub mod shoe;
