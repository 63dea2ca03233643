//! Scoring rules and the host-side turn state machine for Farkle.
//!
//! The host owns the only mutable copy of the match. It drives a
//! [`TurnMachine`] one step at a time: [`roll`](TurnMachine::roll) for
//! the active side, then [`apply`](TurnMachine::apply) the kept dice and
//! decision. Each step returns the protocol [`Message`]s to broadcast, in
//! order. Nothing here touches a socket, so the whole machine runs in
//! plain unit tests.
//!
//! # Key types
//!
//! - [`ScoringOracle`]: the dice source and scoring table (trait seam)
//! - [`MatchConfig`]: the winning threshold, clamped to the supported range
//! - [`MatchState`] / [`TurnContext`]: totals and the active turn
//! - [`Phase`]: where the machine is in the turn cycle
//!
//! [`Message`]: farkle_protocol::Message

mod config;
mod error;
mod machine;
mod oracle;

pub use config::{
    DEFAULT_TARGET, DICE_PER_TURN, MAX_TARGET, MIN_TARGET, MatchConfig, MatchState, Phase,
    TurnContext,
};
pub use error::MatchError;
pub use machine::{Decision, TurnMachine};
pub use oracle::{RandomDice, ScoringOracle, ScriptedDice, score, validate_selection};
