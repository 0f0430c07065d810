use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::engine::{DealerResult, Engine, HandOutcome, RoundPhase};
use crate::errors::GameError;
use crate::player::PlayerAction;

/// The source of player decisions for a round: a terminal prompt, a test
/// script, a strategy bot.
///
/// Every method may block. Returning [`GameError::Interrupted`] abandons the
/// round; [`play_round`] passes it straight back to its caller.
///
/// # Example Implementation
///
/// ```rust
/// use blackjack_engine::engine::Engine;
/// use blackjack_engine::errors::GameError;
/// use blackjack_engine::player::PlayerAction;
/// use blackjack_engine::round::Decider;
///
/// struct MinBetStander;
///
/// impl Decider for MinBetStander {
///     fn bet(&mut self, _engine: &Engine, _player: usize) -> Result<u32, GameError> {
///         Ok(10)
///     }
///
///     fn wants_insurance(
///         &mut self,
///         _engine: &Engine,
///         _player: usize,
///         _hand: usize,
///     ) -> Result<bool, GameError> {
///         Ok(false)
///     }
///
///     fn choose_action(
///         &mut self,
///         _engine: &Engine,
///         _player: usize,
///         _hand: usize,
///     ) -> Result<PlayerAction, GameError> {
///         Ok(PlayerAction::Stand)
///     }
/// }
/// ```
pub trait Decider {
    /// Wager for `player` at the start of the round.
    fn bet(&mut self, engine: &Engine, player: usize) -> Result<u32, GameError>;

    /// Asked once per eligible hand when the dealer shows an Ace.
    fn wants_insurance(
        &mut self,
        engine: &Engine,
        player: usize,
        hand: usize,
    ) -> Result<bool, GameError>;

    /// Next action for the hand under the cursor.
    /// [`Engine::legal_actions`] lists what will be accepted.
    fn choose_action(
        &mut self,
        engine: &Engine,
        player: usize,
        hand: usize,
    ) -> Result<PlayerAction, GameError>;

    /// Called with a rejected request before the decider is asked again.
    fn rejected(&mut self, _error: &GameError) {}
}

/// Everything that happened at the end of a round.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct RoundSummary {
    pub round: u32,
    /// `None` when the dealer's blackjack ended the round at the peek
    pub dealer: Option<DealerResult>,
    pub dealer_blackjack: bool,
    pub outcomes: Vec<HandOutcome>,
}

/// Plays one full round: bets, deal, insurance, player turns, dealer play
/// and payouts. Rejected bets and actions are handed to
/// [`Decider::rejected`] and asked again.
pub fn play_round<D: Decider>(
    engine: &mut Engine,
    decider: &mut D,
) -> Result<RoundSummary, GameError> {
    engine.new_round()?;

    for player in 0..engine.players().len() {
        loop {
            let amount = decider.bet(engine, player)?;
            match engine.place_bet(player, amount) {
                Ok(()) => break,
                Err(e) if e.is_reprompt() => decider.rejected(&e),
                Err(e) => return Err(e),
            }
        }
    }

    engine.deal_initial()?;

    if engine.phase() == RoundPhase::Insurance {
        for player in 0..engine.players().len() {
            if !engine.offer_insurance(player, 0)? {
                continue;
            }
            if decider.wants_insurance(engine, player, 0)? {
                if let Err(e) = engine.accept_insurance(player, 0) {
                    if !e.is_reprompt() {
                        return Err(e);
                    }
                    decider.rejected(&e);
                }
            }
        }
        engine.close_insurance()?;
    }

    while let Some((player, hand)) = engine.current_turn() {
        let action = decider.choose_action(engine, player, hand)?;
        match engine.player_action(player, hand, action) {
            Ok(state) => debug!(player, hand, ?action, ?state, "turn"),
            Err(e) if e.is_reprompt() => decider.rejected(&e),
            Err(e) => return Err(e),
        }
    }

    let dealer = if engine.phase() == RoundPhase::DealerTurn {
        Some(engine.dealer_play()?)
    } else {
        None
    };
    let dealer_blackjack = engine.is_dealer_blackjack();
    let outcomes = engine.resolve()?;

    Ok(RoundSummary {
        round: engine.round_number(),
        dealer,
        dealer_blackjack,
        outcomes,
    })
}
