mod common;

use blackjack_engine::cards::{Card, Rank as R, Suit as S};
use blackjack_engine::engine::{settle_hand, HandResult, RoundPhase};
use blackjack_engine::hand::{Hand, HandState};
use blackjack_engine::player::PlayerAction as A;
use common::{bet_all, c, stacked_table};

fn hand(cards: &[Card], bet: u32) -> Hand {
    let mut h = Hand::new(bet);
    for &card in cards {
        h.add_card(card);
    }
    h
}

/// Deals player (p1, p2) against dealer (hole, up), stands, plays out.
fn stand_round(p: [Card; 2], dealer: [Card; 2], extra: Vec<Card>) -> (HandResult, u32, u32) {
    let mut cards = vec![p[0], dealer[0], p[1], dealer[1]];
    cards.extend(extra);
    let mut eng = stacked_table(&[1_000], cards);
    bet_all(&mut eng, &[100]);
    eng.deal_initial().unwrap();
    if eng.phase() == RoundPhase::Insurance {
        eng.close_insurance().unwrap();
    }
    if eng.current_turn().is_some() {
        eng.player_action(0, 0, A::Stand).unwrap();
    }
    if eng.phase() == RoundPhase::DealerTurn {
        eng.dealer_play().unwrap();
    }
    let out = eng.resolve().unwrap();
    (out[0].result, out[0].amount_won, eng.player(0).unwrap().balance())
}

#[test]
fn twenty_beats_nineteen_pays_double() {
    let (result, won, balance) = stand_round(
        [c(R::King, S::Clubs), c(R::Queen, S::Diamonds)],
        [c(R::Ten, S::Spades), c(R::Nine, S::Hearts)],
        vec![],
    );
    assert_eq!(result, HandResult::Win);
    assert_eq!(won, 200);
    assert_eq!(balance, 1_100);
}

#[test]
fn equal_totals_push() {
    let (result, won, balance) = stand_round(
        [c(R::King, S::Clubs), c(R::Nine, S::Diamonds)],
        [c(R::Ten, S::Spades), c(R::Nine, S::Hearts)],
        vec![],
    );
    assert_eq!(result, HandResult::Push);
    assert_eq!(won, 100);
    assert_eq!(balance, 1_000);
}

#[test]
fn natural_pays_three_to_two() {
    let (result, won, balance) = stand_round(
        [c(R::Ace, S::Clubs), c(R::King, S::Diamonds)],
        [c(R::Ten, S::Spades), c(R::Nine, S::Hearts)],
        vec![],
    );
    assert_eq!(result, HandResult::Blackjack);
    assert_eq!(won, 250);
    assert_eq!(balance, 1_150);
}

#[test]
fn dealer_bust_pays_standing_hand() {
    let (result, won, _) = stand_round(
        [c(R::King, S::Clubs), c(R::Seven, S::Diamonds)],
        [c(R::Ten, S::Spades), c(R::Six, S::Hearts)],
        vec![c(R::Nine, S::Clubs)],
    );
    assert_eq!(result, HandResult::Win);
    assert_eq!(won, 200);
}

#[test]
fn dealer_stands_on_soft_seventeen() {
    let (result, _, _) = stand_round(
        [c(R::King, S::Clubs), c(R::Seven, S::Diamonds)],
        [c(R::Six, S::Spades), c(R::Ace, S::Hearts)],
        vec![],
    );
    // 17 vs soft 17: push, and the dealer drew nothing
    assert_eq!(result, HandResult::Push);
}

#[test]
fn dealer_natural_ends_round_before_player_acts() {
    let mut eng = stacked_table(
        &[1_000],
        vec![
            c(R::Ace, S::Clubs),
            c(R::Ace, S::Spades),
            c(R::King, S::Diamonds),
            c(R::King, S::Hearts),
        ],
    );
    bet_all(&mut eng, &[100]);
    eng.deal_initial().unwrap();
    // ten-value upcard: no insurance, straight to settlement
    assert_eq!(eng.phase(), RoundPhase::Settlement);
    assert!(eng.is_dealer_blackjack());
    assert_eq!(eng.current_turn(), None);

    let out = eng.resolve().unwrap();
    // player natural still loses to a dealer natural
    assert_eq!(out[0].state, HandState::Blackjack);
    assert_eq!(out[0].result, HandResult::DealerBlackjack);
    assert_eq!(out[0].amount_won, 0);
    assert_eq!(eng.player(0).unwrap().balance(), 900);
}

#[test]
fn settle_hand_follows_precedence() {
    let ten = c(R::Ten, S::Spades);
    let dealer_19 = hand(&[ten, c(R::Nine, S::Hearts)], 0);
    let dealer_bust = hand(&[ten, c(R::Six, S::Hearts), c(R::Eight, S::Clubs)], 0);

    let bust = hand(&[ten, c(R::Six, S::Clubs), c(R::King, S::Clubs)], 100);
    assert_eq!(settle_hand(&bust, &dealer_bust), (HandResult::Bust, 0));

    let low = hand(&[ten, c(R::Seven, S::Clubs)], 100);
    assert_eq!(settle_hand(&low, &dealer_19), (HandResult::Loss, 0));
    assert_eq!(settle_hand(&low, &dealer_bust), (HandResult::Win, 200));

    let odd_natural = hand(&[c(R::Ace, S::Clubs), ten], 25);
    assert_eq!(settle_hand(&odd_natural, &dealer_19), (HandResult::Blackjack, 62));

    let mut surrendered = hand(&[ten, c(R::Six, S::Clubs)], 0);
    surrendered.state = HandState::Surrendered;
    assert_eq!(
        settle_hand(&surrendered, &dealer_bust),
        (HandResult::Surrendered, 0)
    );
}
