//! Message types for Farkle's wire format.
//!
//! Every record is a flat JSON object tagged by `t`. Fields that are
//! zero, empty, or false are left out, and a missing field reads back as
//! its zero value, so `{"t":"roll","dice":[2,3]}` is a roll for the host.
//! The field names are short because they are shared with earlier
//! clients of the same protocol.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Die faces, each in `1..=6`.
pub type Dice = Vec<u8>;

// ---------------------------------------------------------------------------
// Side
// ---------------------------------------------------------------------------

/// One of the two seats at the table.
///
/// On the wire a side is the integer `idx`: `0` for the host, `1` for
/// the peer. Because the host is `0`, host-side fields are omitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum Side {
    /// The authoritative side that listens, rolls, and scores.
    #[default]
    Host,
    /// The side that dialed in and reacts to the host.
    Peer,
}

impl Side {
    /// Returns the seat across the table.
    pub fn other(self) -> Self {
        match self {
            Self::Host => Self::Peer,
            Self::Peer => Self::Host,
        }
    }

    /// Returns `true` for [`Side::Host`].
    pub fn is_host(&self) -> bool {
        matches!(self, Self::Host)
    }
}

impl From<Side> for u8 {
    fn from(side: Side) -> Self {
        match side {
            Side::Host => 0,
            Side::Peer => 1,
        }
    }
}

impl TryFrom<u8> for Side {
    type Error = String;

    fn try_from(idx: u8) -> Result<Self, Self::Error> {
        match idx {
            0 => Ok(Self::Host),
            1 => Ok(Self::Peer),
            other => Err(format!("side index must be 0 or 1, got {other}")),
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Host => write!(f, "Host"),
            Self::Peer => write!(f, "Peer"),
        }
    }
}

// ---------------------------------------------------------------------------
// Message
// ---------------------------------------------------------------------------

/// A single protocol record.
///
/// The peer only ever sends [`Hello`](Message::Hello) and
/// [`Action`](Message::Action); everything else originates at the host.
/// A record whose `t` tag is not recognised decodes as
/// [`Unknown`](Message::Unknown) and is ignored by both ends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "t", rename_all = "snake_case")]
pub enum Message {
    /// Peer → Host: connection request.
    Hello {
        #[serde(default, skip_serializing_if = "String::is_empty")]
        name: String,
    },

    /// Host → Peer: handshake accepted. The peer adopts `target` as the
    /// winning threshold and sits in `seat`.
    Welcome {
        #[serde(default, skip_serializing_if = "is_zero")]
        target: u32,
        #[serde(rename = "idx", default, skip_serializing_if = "Side::is_host")]
        seat: Side,
    },

    /// Host → Peer: round-start snapshot.
    Banner {
        #[serde(default, skip_serializing_if = "is_zero")]
        round: u32,
        #[serde(rename = "htotal", default, skip_serializing_if = "is_zero")]
        host_total: u32,
        #[serde(rename = "ptotal", default, skip_serializing_if = "is_zero")]
        peer_total: u32,
        #[serde(default, skip_serializing_if = "is_zero")]
        target: u32,
    },

    /// Host → Peer: a fresh roll for `side`.
    Roll {
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        dice: Dice,
        #[serde(rename = "idx", default, skip_serializing_if = "Side::is_host")]
        side: Side,
    },

    /// Host → Peer: `side` rolled nothing that scores; its turn is over.
    Farkle {
        #[serde(rename = "idx", default, skip_serializing_if = "Side::is_host")]
        side: Side,
    },

    /// Host → Peer: choose what to keep from the last roll.
    YourTurn,

    /// Peer → Host: the dice kept, and whether the turn ends (`bank`).
    Action {
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        keep: Dice,
        #[serde(default, skip_serializing_if = "std::ops::Not::not")]
        bank: bool,
    },

    /// Host → Peer: authoritative score update for `side`.
    Score {
        #[serde(rename = "idx", default, skip_serializing_if = "Side::is_host")]
        side: Side,
        #[serde(default, skip_serializing_if = "is_zero")]
        delta: u32,
        #[serde(default, skip_serializing_if = "is_zero")]
        total: u32,
    },

    /// Host → Peer: every rolled die scored; six fresh dice follow.
    Hot {
        #[serde(rename = "idx", default, skip_serializing_if = "Side::is_host")]
        side: Side,
    },

    /// Host → Peer: the match is over. Nothing follows.
    GameOver {
        #[serde(rename = "idx", default, skip_serializing_if = "Side::is_host")]
        winner: Side,
    },

    /// Any record with an unrecognised `t` tag.
    #[serde(other)]
    Unknown,
}

impl Message {
    /// Returns the wire tag of this message, for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Hello { .. } => "hello",
            Self::Welcome { .. } => "welcome",
            Self::Banner { .. } => "banner",
            Self::Roll { .. } => "roll",
            Self::Farkle { .. } => "farkle",
            Self::YourTurn => "your_turn",
            Self::Action { .. } => "action",
            Self::Score { .. } => "score",
            Self::Hot { .. } => "hot",
            Self::GameOver { .. } => "game_over",
            Self::Unknown => "unknown",
        }
    }
}

fn is_zero(value: &u32) -> bool {
    *value == 0
}
