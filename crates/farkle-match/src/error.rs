//! Error types for the match layer.

use crate::Phase;

/// Errors raised by the turn state machine.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MatchError {
    /// A kept selection is not a scoring subset of the last roll.
    #[error("invalid selection: {0}")]
    InvalidSelection(String),

    /// The requested step does not fit the current phase, e.g. an
    /// action for the side that is not deciding, or a roll after the
    /// match is over.
    #[error("cannot {action} during {phase}")]
    WrongPhase {
        /// What the caller tried to do.
        action: &'static str,
        /// The phase the machine was in.
        phase: Phase,
    },
}
