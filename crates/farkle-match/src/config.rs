//! Match configuration, turn context, and the phase state machine.

use std::fmt;

use farkle_protocol::Side;

/// Dice rolled at the start of every turn and after hot dice.
pub const DICE_PER_TURN: usize = 6;

/// Winning score used when none is requested.
pub const DEFAULT_TARGET: u32 = 1000;

/// Lowest accepted winning score.
pub const MIN_TARGET: u32 = 1000;

/// Highest accepted winning score.
pub const MAX_TARGET: u32 = 20_000;

// ---------------------------------------------------------------------------
// MatchConfig
// ---------------------------------------------------------------------------

/// Settings fixed for the whole match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchConfig {
    target: u32,
}

impl MatchConfig {
    /// Creates a config with the given winning score, clamped to
    /// [`MIN_TARGET`]`..=`[`MAX_TARGET`].
    pub fn new(target: u32) -> Self {
        let clamped = target.clamp(MIN_TARGET, MAX_TARGET);
        if clamped != target {
            tracing::warn!(requested = target, target = clamped, "winning score clamped");
        }
        Self { target: clamped }
    }

    /// The score a side must reach to win.
    pub fn target(&self) -> u32 {
        self.target
    }
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            target: DEFAULT_TARGET,
        }
    }
}

// ---------------------------------------------------------------------------
// Phase
// ---------------------------------------------------------------------------

/// Where the host is in the turn cycle.
///
/// ```text
/// RoundStart → RollPending(side) → AwaitingDecision(side)
///                   ↑                      │
///                   └── continue / hot ────┤
///                                          ├── bank / farkle → RollPending(other) | RoundStart
///                                          └── total ≥ target → MatchOver(side)
/// ```
///
/// Control returning to the host with six fresh dice always goes through
/// `RoundStart`, which is where round banners come from. A farkle is
/// detected during the roll itself, so it moves straight from
/// `RollPending` to the other side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// The host is about to start a new round.
    RoundStart,
    /// `side` is about to roll.
    RollPending(Side),
    /// `side` has rolled scoring dice and must choose what to keep.
    AwaitingDecision(Side),
    /// The match is over; `side` won. Terminal.
    MatchOver(Side),
}

impl Phase {
    /// Returns `true` once the match has a winner.
    pub fn is_over(&self) -> bool {
        matches!(self, Self::MatchOver(_))
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RoundStart => write!(f, "RoundStart"),
            Self::RollPending(side) => write!(f, "RollPending({side})"),
            Self::AwaitingDecision(side) => write!(f, "AwaitingDecision({side})"),
            Self::MatchOver(side) => write!(f, "MatchOver({side})"),
        }
    }
}

// ---------------------------------------------------------------------------
// TurnContext
// ---------------------------------------------------------------------------

/// The turn in progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TurnContext {
    /// Whose turn it is.
    pub active: Side,
    /// How many dice the next roll uses, in `0..=6`.
    pub dice_remaining: usize,
    /// Points kept so far this turn.
    pub turn_score: u32,
}

impl TurnContext {
    /// A fresh turn for `side`: six dice, nothing kept.
    pub fn fresh(side: Side) -> Self {
        Self {
            active: side,
            dice_remaining: DICE_PER_TURN,
            turn_score: 0,
        }
    }
}

// ---------------------------------------------------------------------------
// MatchState
// ---------------------------------------------------------------------------

/// Everything the host knows about the match.
///
/// Totals only ever grow. The peer keeps a mirror of the totals it has
/// been told about, but this struct is the only authority.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchState {
    /// Running total for the host.
    pub host_total: u32,
    /// Running total for the peer.
    pub peer_total: u32,
    /// Rounds started so far; the first banner announces round 1.
    pub round: u32,
    /// The turn in progress.
    pub turn: TurnContext,
    /// Current phase.
    pub phase: Phase,
}

impl MatchState {
    /// A new match: nothing scored, the host about to open round 1.
    pub fn new() -> Self {
        Self {
            host_total: 0,
            peer_total: 0,
            round: 0,
            turn: TurnContext::fresh(Side::Host),
            phase: Phase::RoundStart,
        }
    }

    /// Returns the running total for `side`.
    pub fn total(&self, side: Side) -> u32 {
        match side {
            Side::Host => self.host_total,
            Side::Peer => self.peer_total,
        }
    }

    pub(crate) fn total_mut(&mut self, side: Side) -> &mut u32 {
        match side {
            Side::Host => &mut self.host_total,
            Side::Peer => &mut self.peer_total,
        }
    }

    /// Hands the dice to the other side with a fresh turn.
    pub(crate) fn pass_turn(&mut self) {
        let next = self.turn.active.other();
        self.turn = TurnContext::fresh(next);
        self.phase = match next {
            Side::Host => Phase::RoundStart,
            Side::Peer => Phase::RollPending(Side::Peer),
        };
    }
}

impl Default for MatchState {
    fn default() -> Self {
        Self::new()
    }
}
