#![allow(dead_code)]

use blackjack_engine::cards::{Card, Rank, Suit};
use blackjack_engine::engine::Engine;
use blackjack_engine::player::Player;
use blackjack_engine::rules::TableRules;
use blackjack_engine::shoe::Shoe;

pub fn c(rank: Rank, suit: Suit) -> Card {
    Card::new(rank, suit)
}

/// Table whose shoe deals `cards` in order, one player per balance.
pub fn stacked_table(balances: &[u32], cards: Vec<Card>) -> Engine {
    stacked_table_with_rules(balances, cards, TableRules::default())
}

pub fn stacked_table_with_rules(balances: &[u32], cards: Vec<Card>, rules: TableRules) -> Engine {
    let players = balances
        .iter()
        .enumerate()
        .map(|(i, &b)| Player::new(format!("p{}", i), b))
        .collect();
    Engine::with_shoe(players, Shoe::stacked(rules.num_decks, 99, cards), rules)
        .expect("table size is valid")
}

/// Opens a round and places one bet per player.
pub fn bet_all(engine: &mut Engine, bets: &[u32]) {
    engine.new_round().expect("players remain");
    for (i, &b) in bets.iter().enumerate() {
        engine.place_bet(i, b).expect("bet should be valid");
    }
}
