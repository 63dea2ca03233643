//! How a finished match looks from each side.

use std::fmt;

use farkle_protocol::Side;

/// How a match ended, from the local side's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchOutcome {
    /// The local side reached the target first.
    Won,
    /// The other side reached the target first.
    Lost,
    /// The connection failed or the other side broke the protocol.
    Disconnected,
    /// The local player quit. Nothing more was sent.
    Quit,
}

impl MatchOutcome {
    /// The outcome for `local` once `winner` has won.
    pub fn for_winner(local: Side, winner: Side) -> Self {
        if local == winner { Self::Won } else { Self::Lost }
    }
}

impl fmt::Display for MatchOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Won => write!(f, "won"),
            Self::Lost => write!(f, "lost"),
            Self::Disconnected => write!(f, "disconnected"),
            Self::Quit => write!(f, "quit"),
        }
    }
}
