//! The seams to whoever sits at the keyboard.
//!
//! A session never reads a terminal or prints on its own. It asks a
//! [`DecisionSource`] what to keep and tells an [`OutputSink`] what
//! happened, so the same drivers run under a terminal UI or a test script.

use std::future::Future;

use farkle_match::Decision;
use farkle_protocol::Dice;

/// What the deciding side can see when it is asked to choose.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecisionPrompt<'a> {
    /// The roll to choose from.
    pub roll: &'a [u8],
    /// Points kept so far this turn.
    pub turn_score: u32,
    /// The deciding side's running total.
    pub own_total: u32,
    /// The other side's running total.
    pub opponent_total: u32,
    /// The winning score.
    pub target: u32,
}

/// A local player's answer to a [`DecisionPrompt`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Choice {
    /// Keep `dice` from the roll, then continue or bank.
    Keep {
        /// The kept dice.
        dice: Dice,
        /// Whether the turn goes on.
        decision: Decision,
    },
    /// Leave right now. No further messages are sent.
    Quit,
}

impl Choice {
    /// Keep `dice` and roll on.
    pub fn keep(dice: impl Into<Dice>) -> Self {
        Self::Keep {
            dice: dice.into(),
            decision: Decision::Continue,
        }
    }

    /// Keep `dice` and end the turn.
    pub fn bank(dice: impl Into<Dice>) -> Self {
        Self::Keep {
            dice: dice.into(),
            decision: Decision::Bank,
        }
    }
}

/// Supplies the local side's choices.
///
/// Implementations may return a selection that does not fit the roll;
/// the session reports the problem to the [`OutputSink`] and asks again.
///
/// ```rust
/// use farkle::{Choice, DecisionPrompt, DecisionSource};
///
/// /// Keeps every one and five, and banks.
/// struct Greedy;
///
/// impl DecisionSource for Greedy {
///     async fn decide(&mut self, prompt: &DecisionPrompt<'_>) -> Choice {
///         let keep: Vec<u8> = prompt
///             .roll
///             .iter()
///             .copied()
///             .filter(|d| *d == 1 || *d == 5)
///             .collect();
///         Choice::bank(keep)
///     }
/// }
/// ```
pub trait DecisionSource: Send {
    /// Returns the next choice for the roll in `prompt`.
    fn decide(&mut self, prompt: &DecisionPrompt<'_>) -> impl Future<Output = Choice> + Send;
}

/// Receives human-readable progress lines.
pub trait OutputSink: Send {
    /// Shows one line (which may itself contain line breaks).
    fn line(&mut self, text: &str);
}

/// An [`OutputSink`] that keeps every line in memory.
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    lines: Vec<String>,
}

impl Transcript {
    /// Creates an empty transcript.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every line received so far, in order.
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Returns `true` if any line contains `needle`.
    pub fn contains(&self, needle: &str) -> bool {
        self.lines.iter().any(|line| line.contains(needle))
    }
}

impl OutputSink for Transcript {
    fn line(&mut self, text: &str) {
        self.lines.push(text.to_string());
    }
}
