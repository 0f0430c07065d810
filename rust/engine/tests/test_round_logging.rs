mod common;

use std::fs;

use blackjack_engine::cards::{Rank as R, Suit as S};
use blackjack_engine::engine::HandResult;
use blackjack_engine::hand::HandState;
use blackjack_engine::logger::{RoundLogger, RoundRecord};
use blackjack_engine::player::PlayerAction as A;
use common::{bet_all, c, stacked_table};
use tempfile::TempDir;

fn settled_engine() -> blackjack_engine::engine::Engine {
    let mut eng = stacked_table(
        &[1_000, 1_000],
        vec![
            c(R::King, S::Clubs),
            c(R::Nine, S::Hearts),
            c(R::Ten, S::Spades),
            c(R::Queen, S::Diamonds),
            c(R::Six, S::Clubs),
            c(R::Eight, S::Hearts),
        ],
    );
    bet_all(&mut eng, &[100, 40]);
    eng.deal_initial().unwrap();
    eng.player_action(0, 0, A::Stand).unwrap();
    eng.player_action(1, 0, A::Surrender).unwrap();
    eng.dealer_play().unwrap();
    eng.resolve().unwrap();
    eng
}

#[test]
fn record_reflects_settled_round() {
    let eng = settled_engine();
    let outcomes = eng.outcomes();
    assert_eq!(outcomes.len(), 2);
    assert_eq!(outcomes[0].result, HandResult::Win);
    assert_eq!(outcomes[1].bet, 0);

    let rec = eng.round_record("20260101-000001".to_string()).unwrap();
    assert_eq!(rec.round, 1);
    assert_eq!(rec.hands.len(), 2);
    // hole card first
    assert_eq!(
        rec.dealer,
        vec![c(R::Ten, S::Spades), c(R::Eight, S::Hearts)]
    );

    let first = &rec.hands[0];
    assert_eq!(first.player, "p0");
    assert_eq!(first.result, HandResult::Win);
    assert_eq!(first.amount_won, 200);
    assert_eq!(first.balance, 1_100);

    let second = &rec.hands[1];
    assert_eq!(second.state, HandState::Surrendered);
    assert_eq!(second.result, HandResult::Surrendered);
    assert_eq!(second.balance, 980);
}

#[test]
fn record_needs_a_settled_round() {
    let mut eng = stacked_table(&[1_000], vec![]);
    bet_all(&mut eng, &[100]);
    assert!(eng.round_record("x".to_string()).is_err());
}

#[test]
fn writes_jsonl_with_timestamp() {
    let dir = TempDir::new().expect("tempdir");
    let path = dir.path().join("logs").join("rounds.jsonl");
    let mut logger = RoundLogger::create(&path).expect("create logger");

    let eng = settled_engine();
    let id = logger.next_id();
    let rec = eng.round_record(id.clone()).unwrap();
    logger.write(&rec).expect("write");
    logger.write(&rec).expect("write");

    let body = fs::read_to_string(&path).expect("read log");
    assert!(!body.contains('\r'));
    let lines: Vec<&str> = body.lines().collect();
    assert_eq!(lines.len(), 2);

    let parsed: RoundRecord = serde_json::from_str(lines[0]).expect("valid json");
    assert_eq!(parsed.round_id, id);
    assert!(parsed.ts.is_some());
    assert_eq!(parsed.hands, rec.hands);
}

#[test]
fn existing_timestamp_is_kept() {
    let dir = TempDir::new().expect("tempdir");
    let path = dir.path().join("rounds.jsonl");
    let mut logger = RoundLogger::create(&path).expect("create logger");

    let mut rec = settled_engine().round_record("20260101-000002".into()).unwrap();
    rec.ts = Some("2026-01-01T00:00:00Z".to_string());
    logger.write(&rec).expect("write");

    let body = fs::read_to_string(&path).expect("read log");
    let parsed: RoundRecord = serde_json::from_str(body.trim_end()).expect("valid json");
    assert_eq!(parsed.ts.as_deref(), Some("2026-01-01T00:00:00Z"));
}

#[test]
fn append_keeps_earlier_rounds() {
    let dir = TempDir::new().expect("tempdir");
    let path = dir.path().join("rounds.jsonl");
    let rec = settled_engine().round_record("20260101-000003".into()).unwrap();

    RoundLogger::create(&path).unwrap().write(&rec).unwrap();
    RoundLogger::append(&path).unwrap().write(&rec).unwrap();

    let body = fs::read_to_string(&path).expect("read log");
    assert_eq!(body.lines().count(), 2);
}

#[test]
fn sequential_ids_increment() {
    let mut logger = RoundLogger::with_seq_for_test("20261231");
    assert_eq!(logger.next_id(), "20261231-000001");
    assert_eq!(logger.next_id(), "20261231-000002");
}
