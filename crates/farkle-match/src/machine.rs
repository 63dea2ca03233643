//! The host-side turn state machine.

use farkle_protocol::{Dice, Message, Side};

use crate::{
    DICE_PER_TURN, MatchConfig, MatchError, MatchState, Phase, ScoringOracle, validate_selection,
};

/// What a side does with the dice it keeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Keep rolling the remaining dice.
    Continue,
    /// End the turn and hand the dice over.
    Bank,
}

impl Decision {
    /// Maps the wire `bank` flag to a decision.
    pub fn from_bank(bank: bool) -> Self {
        if bank { Self::Bank } else { Self::Continue }
    }

    /// Returns `true` for [`Decision::Bank`].
    pub fn is_bank(self) -> bool {
        matches!(self, Self::Bank)
    }
}

/// The authoritative match, advanced one step at a time.
///
/// The caller alternates [`roll`](Self::roll) and, whenever the phase is
/// [`Phase::AwaitingDecision`], [`apply`](Self::apply). Both return the
/// messages to broadcast, already in send order. The loop ends when
/// [`winner`](Self::winner) returns a side.
pub struct TurnMachine<O: ScoringOracle> {
    config: MatchConfig,
    state: MatchState,
    oracle: O,
    last_roll: Dice,
}

impl<O: ScoringOracle> TurnMachine<O> {
    /// Starts a new match.
    pub fn new(config: MatchConfig, oracle: O) -> Self {
        Self {
            config,
            state: MatchState::new(),
            oracle,
            last_roll: Dice::new(),
        }
    }

    /// The match settings.
    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    /// Totals, round, and the turn in progress.
    pub fn state(&self) -> &MatchState {
        &self.state
    }

    /// The current phase.
    pub fn phase(&self) -> Phase {
        self.state.phase
    }

    /// The most recent roll, whichever side made it.
    pub fn last_roll(&self) -> &[u8] {
        &self.last_roll
    }

    /// The oracle used for rolls and scores.
    pub fn oracle(&self) -> &O {
        &self.oracle
    }

    /// The winner, once the match is over.
    pub fn winner(&self) -> Option<Side> {
        match self.state.phase {
            Phase::MatchOver(side) => Some(side),
            _ => None,
        }
    }

    /// Rolls for the active side.
    ///
    /// From [`Phase::RoundStart`] this first opens a new round and emits
    /// its `banner`. A roll that scores nothing emits `farkle` and hands
    /// the dice to the other side; otherwise the machine waits for that
    /// side's decision.
    ///
    /// # Errors
    /// [`MatchError::WrongPhase`] while a decision is pending or after
    /// the match is over.
    pub fn roll(&mut self) -> Result<Vec<Message>, MatchError> {
        let mut events = Vec::with_capacity(3);

        let side = match self.state.phase {
            Phase::RoundStart => {
                self.state.round += 1;
                tracing::debug!(round = self.state.round, "round started");
                events.push(Message::Banner {
                    round: self.state.round,
                    host_total: self.state.host_total,
                    peer_total: self.state.peer_total,
                    target: self.config.target(),
                });
                Side::Host
            }
            Phase::RollPending(side) => side,
            phase => return Err(MatchError::WrongPhase { action: "roll", phase }),
        };

        let dice = self.oracle.roll(self.state.turn.dice_remaining);
        events.push(Message::Roll {
            dice: dice.clone(),
            side,
        });

        if self.oracle.score(&dice) == 0 {
            tracing::debug!(%side, ?dice, "farkle");
            events.push(Message::Farkle { side });
            self.state.pass_turn();
        } else {
            self.state.phase = Phase::AwaitingDecision(side);
        }
        self.last_roll = dice;
        Ok(events)
    }

    /// Applies `side`'s kept dice and decision to the last roll.
    ///
    /// Emits `score`, then either `game_over` (terminal) or, when every
    /// rolled die was kept, `hot`. Hot dice reset the count to six; a
    /// `Continue` then rolls again for the same side and a `Bank` still
    /// ends the turn.
    ///
    /// # Errors
    /// [`MatchError::WrongPhase`] unless `side` is the one deciding, and
    /// [`MatchError::InvalidSelection`] if `kept` is not a scoring subset
    /// of the last roll. The state is unchanged on error.
    pub fn apply(
        &mut self,
        side: Side,
        kept: &[u8],
        decision: Decision,
    ) -> Result<Vec<Message>, MatchError> {
        if self.state.phase != Phase::AwaitingDecision(side) {
            return Err(MatchError::WrongPhase {
                action: "apply an action",
                phase: self.state.phase,
            });
        }
        let delta = validate_selection(&self.last_roll, kept, |dice| self.oracle.score(dice))?;

        let mut events = Vec::with_capacity(2);
        self.state.turn.turn_score += delta;
        let total = {
            let total = self.state.total_mut(side);
            *total += delta;
            *total
        };
        events.push(Message::Score { side, delta, total });

        if total >= self.config.target() {
            tracing::info!(winner = %side, total, "match over");
            events.push(Message::GameOver { winner: side });
            self.state.phase = Phase::MatchOver(side);
            return Ok(events);
        }

        let hot = kept.len() == self.state.turn.dice_remaining;
        if hot {
            events.push(Message::Hot { side });
            self.state.turn.dice_remaining = DICE_PER_TURN;
        }

        match decision {
            Decision::Continue => {
                if !hot {
                    self.state.turn.dice_remaining -= kept.len();
                }
                self.state.phase = Phase::RollPending(side);
            }
            Decision::Bank => self.state.pass_turn(),
        }
        Ok(events)
    }
}
