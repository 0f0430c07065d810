use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::cards::{Card, Rank};
use crate::config::TableConfig;
use crate::errors::GameError;
use crate::hand::{Hand, HandState};
use crate::logger::{HandEntry, RoundRecord};
use crate::player::{Dealer, Player, PlayerAction, STARTING_BALANCE};
use crate::rules::{self, TableRules};
use crate::shoe::Shoe;

/// Most players a single table seats.
pub const MAX_PLAYERS: usize = 7;

/// Stage of the current round. Each engine operation is only valid in one.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub enum RoundPhase {
    /// No round started yet
    Idle,
    /// Waiting for every player's wager
    Betting,
    /// Dealer shows an Ace; insurance may be taken
    Insurance,
    /// Players act on their hands in seat order
    PlayerTurns,
    /// All player hands finished; dealer draws next
    DealerTurn,
    /// Dealer's hand is final; bets can be paid
    Settlement,
    /// Payouts done
    Settled,
}

/// How a hand's main wager ended.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub enum HandResult {
    /// Natural paid 3:2
    Blackjack,
    /// Beat the dealer or the dealer busted; paid 1:1
    Win,
    /// Tied the dealer; wager returned
    Push,
    /// Lower total than the dealer
    Loss,
    /// Lost to a dealer natural
    DealerBlackjack,
    /// Went over 21
    Bust,
    /// Given up during the player's turn
    Surrendered,
}

/// Per-hand settlement report returned by [`Engine::resolve`].
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct HandOutcome {
    pub player: usize,
    pub hand: usize,
    pub state: HandState,
    pub result: HandResult,
    /// Main wager at settlement time (zero after a surrender)
    pub bet: u32,
    /// Chips credited for the main wager, stake included
    pub amount_won: u32,
    /// Chips credited for insurance, stake included
    pub insurance_won: u32,
}

/// What the dealer ended the round with.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct DealerResult {
    /// False when every player hand had already busted
    pub played: bool,
    pub value: u32,
    pub busted: bool,
}

/// Settles one hand's main wager against the dealer's final hand.
///
/// Returns the result and the amount to credit, stake included. A
/// surrendered hand carries a zero bet, so it is reported as
/// [`HandResult::Surrendered`] and credited nothing.
pub fn settle_hand(hand: &Hand, dealer: &Hand) -> (HandResult, u32) {
    let bet = hand.bet;
    let dealer_blackjack = dealer.is_blackjack();
    let dealer_value = dealer.value();
    let value = hand.value();

    let (result, amount) = if hand.is_blackjack() && !dealer_blackjack {
        let paid = u32::try_from(u64::from(bet) * 5 / 2).unwrap_or(u32::MAX);
        (HandResult::Blackjack, paid)
    } else if dealer_blackjack {
        (HandResult::DealerBlackjack, 0)
    } else if value > 21 {
        (HandResult::Bust, 0)
    } else if dealer_value > 21 || value > dealer_value {
        (HandResult::Win, bet.saturating_mul(2))
    } else if value == dealer_value {
        (HandResult::Push, bet)
    } else {
        (HandResult::Loss, 0)
    };

    if hand.state == HandState::Surrendered {
        (HandResult::Surrendered, amount)
    } else {
        (result, amount)
    }
}

/// Round engine for one dealer and up to [`MAX_PLAYERS`] players.
///
/// The engine owns the shoe, the players and the dealer, and walks a round
/// through [`RoundPhase`]s. Player hands are visited with an explicit
/// `(player, hand)` cursor because splits insert hands mid-traversal.
///
/// # Examples
///
/// ```
/// use blackjack_engine::engine::{Engine, RoundPhase};
/// use blackjack_engine::player::PlayerAction;
///
/// let mut engine = Engine::new(&["Ada"], Some(7)).expect("one seat is fine");
/// engine.new_round().expect("players remain");
/// engine.place_bet(0, 100).expect("valid bet");
/// engine.deal_initial().expect("all bets in");
///
/// if engine.phase() == RoundPhase::Insurance {
///     engine.close_insurance().expect("insurance window open");
/// }
/// while let Some((player, hand)) = engine.current_turn() {
///     engine
///         .player_action(player, hand, PlayerAction::Stand)
///         .expect("stand is always legal");
/// }
/// if engine.phase() == RoundPhase::DealerTurn {
///     engine.dealer_play().expect("dealer's turn");
/// }
/// let outcomes = engine.resolve().expect("round settles");
/// assert_eq!(outcomes.len(), 1);
/// ```
#[derive(Debug)]
pub struct Engine {
    /// Card supply; rebuilt automatically when empty
    shoe: Shoe,
    /// Seated players in seat order
    players: Vec<Player>,
    dealer: Dealer,
    rules: TableRules,
    /// Seed the shoe was shuffled with, if known
    seed: Option<u64>,
    phase: RoundPhase,
    /// Hand awaiting a decision during [`RoundPhase::PlayerTurns`]
    cursor: Option<(usize, usize)>,
    round: u32,
    outcomes: Vec<HandOutcome>,
}

impl Engine {
    /// Seats `names` with the default rules and starting balance.
    pub fn new<S: AsRef<str>>(names: &[S], seed: Option<u64>) -> Result<Self, GameError> {
        Self::with_rules(names, TableRules::default(), STARTING_BALANCE, seed)
    }

    pub fn from_config<S: AsRef<str>>(
        config: &TableConfig,
        names: &[S],
    ) -> Result<Self, GameError> {
        Self::with_rules(names, config.rules(), config.starting_balance, config.seed)
    }

    pub fn with_rules<S: AsRef<str>>(
        names: &[S],
        rules: TableRules,
        starting_balance: u32,
        seed: Option<u64>,
    ) -> Result<Self, GameError> {
        let seed = seed.unwrap_or_else(rand::random);
        let players = names
            .iter()
            .enumerate()
            .map(|(i, name)| {
                let name = name.as_ref().trim();
                if name.is_empty() {
                    Player::new(format!("Player{}", i + 1), starting_balance)
                } else {
                    Player::new(name, starting_balance)
                }
            })
            .collect();
        let shoe = Shoe::new_with_seed(rules.num_decks, seed);
        let mut engine = Self::with_shoe(players, shoe, rules)?;
        engine.seed = Some(seed);
        Ok(engine)
    }

    /// Seats already-built players against a caller-supplied shoe.
    pub fn with_shoe(
        players: Vec<Player>,
        shoe: Shoe,
        rules: TableRules,
    ) -> Result<Self, GameError> {
        if players.is_empty() || players.len() > MAX_PLAYERS {
            return Err(GameError::TableSize {
                min: 1,
                max: MAX_PLAYERS,
                actual: players.len(),
            });
        }
        Ok(Self {
            shoe,
            players,
            dealer: Dealer::new(),
            rules,
            seed: None,
            phase: RoundPhase::Idle,
            cursor: None,
            round: 0,
            outcomes: Vec::new(),
        })
    }

    pub fn phase(&self) -> RoundPhase {
        self.phase
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn player(&self, index: usize) -> Option<&Player> {
        self.players.get(index)
    }

    pub fn dealer(&self) -> &Dealer {
        &self.dealer
    }

    pub fn rules(&self) -> &TableRules {
        &self.rules
    }

    pub fn shoe(&self) -> &Shoe {
        &self.shoe
    }

    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    pub fn round_number(&self) -> u32 {
        self.round
    }

    /// Outcomes of the last settled round.
    pub fn outcomes(&self) -> &[HandOutcome] {
        &self.outcomes
    }

    /// Clears the table for a new round and drops players with no chips.
    ///
    /// # Errors
    ///
    /// - [`GameError::WrongPhase`] - a round is still in progress
    /// - [`GameError::NoPlayersRemain`] - every player is broke
    pub fn new_round(&mut self) -> Result<(), GameError> {
        if !matches!(self.phase, RoundPhase::Idle | RoundPhase::Settled) {
            return Err(self.wrong_phase(RoundPhase::Settled));
        }
        self.dealer.clear_hand();
        self.players.retain(|p| {
            if p.is_broke() {
                warn!(player = p.name(), "out of chips, leaving the table");
            }
            !p.is_broke()
        });
        for p in &mut self.players {
            p.clear_hands();
        }
        self.cursor = None;
        self.outcomes.clear();
        if self.players.is_empty() {
            self.phase = RoundPhase::Idle;
            return Err(GameError::NoPlayersRemain);
        }
        self.round += 1;
        self.phase = RoundPhase::Betting;
        info!(
            round = self.round,
            players = self.players.len(),
            "round started"
        );
        Ok(())
    }

    /// Takes `amount` from the player's balance and opens their hand.
    pub fn place_bet(&mut self, player: usize, amount: u32) -> Result<(), GameError> {
        self.expect_phase(RoundPhase::Betting)?;
        let p = self
            .players
            .get_mut(player)
            .ok_or(GameError::UnknownPlayer(player))?;
        if !p.hands().is_empty() {
            return Err(GameError::BetAlreadyPlaced(player));
        }
        p.start_hand(amount)?;
        debug!(player = p.name(), amount, balance = p.balance(), "bet placed");
        Ok(())
    }

    /// Deals two passes: one card to each player, then one to the dealer.
    ///
    /// Opens the insurance window when the dealer's upcard is an Ace;
    /// otherwise the dealer checks for blackjack straight away.
    pub fn deal_initial(&mut self) -> Result<(), GameError> {
        self.expect_phase(RoundPhase::Betting)?;
        if let Some(i) = self.players.iter().position(|p| p.hands().is_empty()) {
            return Err(GameError::MissingBet(i));
        }
        for _ in 0..2 {
            for p in &mut self.players {
                let card = self.shoe.draw();
                p.hands_mut()[0].add_card(card);
            }
            let card = self.shoe.draw();
            self.dealer.receive_card(card);
        }
        debug!(upcard = ?self.dealer.upcard(), "initial cards dealt");

        if self.dealer_upcard().map(|c| c.rank) == Some(Rank::Ace) {
            self.phase = RoundPhase::Insurance;
            info!("dealer shows an Ace, insurance open");
        } else {
            self.peek();
        }
        Ok(())
    }

    /// The dealer's face-up card. The first card stays hidden.
    pub fn dealer_upcard(&self) -> Option<Card> {
        self.dealer.upcard()
    }

    pub fn is_dealer_blackjack(&self) -> bool {
        self.dealer.hand().is_blackjack()
    }

    /// Whether insurance may be taken on this hand right now.
    pub fn offer_insurance(&self, player: usize, hand: usize) -> Result<bool, GameError> {
        self.expect_phase(RoundPhase::Insurance)?;
        let (p, h) = self.lookup(player, hand)?;
        let amount = h.bet / 2;
        Ok(h.insurance_bet == 0 && amount > 0 && p.balance() >= amount)
    }

    /// Moves half the hand's bet into its insurance wager.
    /// Returns the amount insured.
    pub fn accept_insurance(&mut self, player: usize, hand: usize) -> Result<u32, GameError> {
        if !self.offer_insurance(player, hand)? {
            let (p, h) = self.lookup(player, hand)?;
            let amount = h.bet / 2;
            if amount > p.balance() {
                return Err(GameError::InsufficientFunds {
                    needed: amount,
                    available: p.balance(),
                });
            }
            return Err(GameError::InsuranceUnavailable);
        }
        let p = &mut self.players[player];
        let amount = p.hands()[hand].bet / 2;
        p.debit(amount)?;
        p.hands_mut()[hand].insurance_bet = amount;
        debug!(player = p.name(), amount, "insurance taken");
        Ok(amount)
    }

    /// Ends the insurance window and checks the dealer for blackjack.
    /// Returns true when the dealer has one.
    pub fn close_insurance(&mut self) -> Result<bool, GameError> {
        self.expect_phase(RoundPhase::Insurance)?;
        self.peek();
        Ok(self.is_dealer_blackjack())
    }

    /// The `(player, hand)` awaiting a decision, if any.
    pub fn current_turn(&self) -> Option<(usize, usize)> {
        if self.phase == RoundPhase::PlayerTurns {
            self.cursor
        } else {
            None
        }
    }

    pub fn legal_actions(
        &self,
        player: usize,
        hand: usize,
    ) -> Result<Vec<PlayerAction>, GameError> {
        let (p, h) = self.lookup(player, hand)?;
        if self.current_turn() != Some((player, hand)) {
            return Ok(Vec::new());
        }
        Ok(rules::legal_actions(h, p.balance(), p.hands().len(), &self.rules))
    }

    /// Applies `action` to the current hand and returns the state of the
    /// hand now at `(player, hand)`.
    ///
    /// After a split that is the first of the two new hands, which keeps the
    /// cursor unless it finished on its own (a natural or a 21).
    ///
    /// # Errors
    ///
    /// - [`GameError::NotPlayersTurn`] - `(player, hand)` is not current
    /// - [`GameError::IllegalAction`] / [`GameError::InsufficientFunds`] -
    ///   the action is not open to this hand; nothing changes
    pub fn player_action(
        &mut self,
        player: usize,
        hand: usize,
        action: PlayerAction,
    ) -> Result<HandState, GameError> {
        self.expect_phase(RoundPhase::PlayerTurns)?;
        self.lookup(player, hand)?;
        if self.cursor != Some((player, hand)) {
            return Err(GameError::NotPlayersTurn {
                expected: self.cursor,
                actual: (player, hand),
            });
        }

        let p = &mut self.players[player];
        let hand_count = p.hands().len();
        rules::validate_action(
            &p.hands()[hand],
            p.balance(),
            hand_count,
            &self.rules,
            action,
        )?;

        match action {
            PlayerAction::Hit => {
                let card = self.shoe.draw();
                p.hands_mut()[hand].add_card(card);
            }
            PlayerAction::Stand => p.hands_mut()[hand].finish(HandState::Stood),
            PlayerAction::Double => {
                let bet = p.hands()[hand].bet;
                p.debit(bet)?;
                let card = self.shoe.draw();
                let h = &mut p.hands_mut()[hand];
                h.bet += bet;
                h.has_doubled = true;
                h.add_card(card);
                h.finish(HandState::Doubled);
            }
            PlayerAction::Split => {
                let bet = p.hands()[hand].bet;
                p.debit(bet)?;
                let original = p.hands_mut().remove(hand);
                let mut first = Hand::split_from(original.cards[0], bet);
                let mut second = Hand::split_from(original.cards[1], bet);
                first.insurance_bet = original.insurance_bet;
                first.add_card(self.shoe.draw());
                second.add_card(self.shoe.draw());
                p.hands_mut().insert(hand, second);
                p.hands_mut().insert(hand, first);
            }
            PlayerAction::Surrender => {
                let refund = p.hands()[hand].bet / 2;
                p.credit(refund);
                let h = &mut p.hands_mut()[hand];
                h.bet = 0;
                h.finish(HandState::Surrendered);
            }
        }

        let h = &self.players[player].hands()[hand];
        let state = h.state;
        debug!(
            player = self.players[player].name(),
            hand,
            ?action,
            cards = %h,
            value = h.value(),
            ?state,
            "action applied"
        );
        self.advance();
        Ok(self.players[player].hands()[hand].state)
    }

    /// Plays the dealer's hand: hit below 17, stand on any 17.
    ///
    /// Skipped when no player hand is still at 21 or under.
    pub fn dealer_play(&mut self) -> Result<DealerResult, GameError> {
        self.expect_phase(RoundPhase::DealerTurn)?;
        let live = self
            .players
            .iter()
            .flat_map(|p| p.hands())
            .any(|h| h.value() <= 21);
        if live {
            while self.dealer.should_hit() {
                let card = self.shoe.draw();
                self.dealer.receive_card(card);
            }
        }
        self.phase = RoundPhase::Settlement;
        let hand = self.dealer.hand();
        info!(
            played = live,
            cards = %hand,
            value = hand.value(),
            "dealer done"
        );
        Ok(DealerResult {
            played: live,
            value: hand.value(),
            busted: hand.is_busted(),
        })
    }

    /// Pays insurance and main wagers for every hand and closes the round.
    pub fn resolve(&mut self) -> Result<Vec<HandOutcome>, GameError> {
        self.expect_phase(RoundPhase::Settlement)?;
        let dealer_blackjack = self.is_dealer_blackjack();
        let mut outcomes = Vec::new();

        for (pi, p) in self.players.iter_mut().enumerate() {
            let mut credit = 0u32;
            for (hi, h) in p.hands_mut().iter_mut().enumerate() {
                let insurance_won = if h.insurance_bet > 0 && dealer_blackjack {
                    h.insurance_bet.saturating_mul(2)
                } else {
                    0
                };
                h.insurance_bet = 0;
                let (result, amount_won) = settle_hand(h, self.dealer.hand());
                credit = credit.saturating_add(insurance_won).saturating_add(amount_won);
                outcomes.push(HandOutcome {
                    player: pi,
                    hand: hi,
                    state: h.state,
                    result,
                    bet: h.bet,
                    amount_won,
                    insurance_won,
                });
            }
            p.credit(credit);
            info!(player = p.name(), credit, balance = p.balance(), "settled");
        }

        self.phase = RoundPhase::Settled;
        self.outcomes = outcomes.clone();
        Ok(outcomes)
    }

    /// Snapshot of the settled round for the audit log.
    pub fn round_record(&self, round_id: String) -> Result<RoundRecord, GameError> {
        self.expect_phase(RoundPhase::Settled)?;
        let hands = self
            .outcomes
            .iter()
            .map(|o| {
                let p = &self.players[o.player];
                HandEntry {
                    player: p.name().to_string(),
                    cards: p.hands()[o.hand].cards.clone(),
                    bet: o.bet,
                    state: o.state,
                    result: o.result,
                    amount_won: o.amount_won,
                    insurance_won: o.insurance_won,
                    balance: p.balance(),
                }
            })
            .collect();
        Ok(RoundRecord {
            round_id,
            seed: self.seed,
            round: self.round,
            hands,
            dealer: self.dealer.hand().cards.clone(),
            ts: None,
            meta: None,
        })
    }

    /// Dealer checks the hole card. A natural ends the round before any
    /// player acts.
    fn peek(&mut self) {
        if self.is_dealer_blackjack() {
            info!(cards = %self.dealer.hand(), "dealer has blackjack");
            for p in &mut self.players {
                for h in p.hands_mut() {
                    let state = if h.is_blackjack() {
                        HandState::Blackjack
                    } else {
                        HandState::Stood
                    };
                    h.finish(state);
                }
            }
            self.cursor = None;
            self.phase = RoundPhase::Settlement;
        } else {
            self.cursor = Some((0, 0));
            self.phase = RoundPhase::PlayerTurns;
            self.advance();
        }
    }

    /// Moves the cursor to the next hand that needs a decision, finishing
    /// naturals, busts and 21s on the way.
    fn advance(&mut self) {
        while let Some((pi, hi)) = self.cursor {
            let Some(p) = self.players.get_mut(pi) else {
                self.cursor = None;
                break;
            };
            if p.all_hands_finished() {
                debug!(player = p.name(), "turn over");
                self.cursor = Some((pi + 1, 0));
                continue;
            }
            let Some(h) = p.hands_mut().get_mut(hi) else {
                self.cursor = Some((pi + 1, 0));
                continue;
            };
            if h.finished {
                self.cursor = Some((pi, hi + 1));
            } else if h.is_blackjack() {
                h.finish(HandState::Blackjack);
            } else if h.value() > 21 {
                h.finish(HandState::Busted);
            } else if h.value() == 21 {
                h.finish(HandState::Stood);
            } else {
                return;
            }
        }
        self.phase = RoundPhase::DealerTurn;
        debug!("all player hands finished");
    }

    fn lookup(&self, player: usize, hand: usize) -> Result<(&Player, &Hand), GameError> {
        let p = self
            .players
            .get(player)
            .ok_or(GameError::UnknownPlayer(player))?;
        let h = p
            .hand(hand)
            .ok_or(GameError::UnknownHand { player, hand })?;
        Ok((p, h))
    }

    fn expect_phase(&self, expected: RoundPhase) -> Result<(), GameError> {
        if self.phase == expected {
            Ok(())
        } else {
            Err(self.wrong_phase(expected))
        }
    }

    fn wrong_phase(&self, expected: RoundPhase) -> GameError {
        GameError::WrongPhase {
            expected,
            actual: self.phase,
        }
    }
}
