//! The scoring table and dice sources.
//!
//! The state machine only ever asks two things of the outside world:
//! "roll `n` dice" and "what are these dice worth". [`ScoringOracle`] is
//! that seam. [`RandomDice`] is the production implementation;
//! [`ScriptedDice`] replays a fixed sequence of rolls.

use std::collections::VecDeque;

use farkle_protocol::Dice;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::MatchError;

/// Supplies rolls and scores to the host.
///
/// `Send + 'static` so the oracle can live inside a spawned host task.
pub trait ScoringOracle: Send + 'static {
    /// Rolls `n` dice, each in `1..=6`.
    fn roll(&mut self, n: usize) -> Dice;

    /// Scores a set of dice. Defaults to the standard table, [`score`].
    fn score(&self, dice: &[u8]) -> u32 {
        score(dice)
    }
}

// ---------------------------------------------------------------------------
// Scoring table
// ---------------------------------------------------------------------------

/// Scores a set of dice with the standard table.
///
/// - Three of a kind: `100 × face`, or 1000 for ones, doubled for every
///   die past the third (four = 2×, five = 4×, six = 8×).
/// - Leftover ones are 100 each and leftover fives 50 each.
/// - A run of 1–6 is 1500, a run of 1–5 is 500 and a run of 2–6 is 750.
///   The dice outside a five-die run still score on their own.
///
/// Faces outside `1..=6` are worth nothing.
///
/// ```rust
/// use farkle_match::score;
///
/// assert_eq!(score(&[1, 1, 1, 5, 5]), 1100);
/// assert_eq!(score(&[2, 2, 2, 2]), 400);
/// assert_eq!(score(&[2, 3, 4]), 0);
/// ```
pub fn score(dice: &[u8]) -> u32 {
    let counts = face_counts(dice);
    score_counts(&counts).max(score_with_run(&counts))
}

const RUNS: [(u8, u8, u32); 3] = [(1, 6, 1500), (2, 6, 750), (1, 5, 500)];

fn face_counts(dice: &[u8]) -> [u32; 7] {
    let mut counts = [0u32; 7];
    for &face in dice {
        if (1..=6).contains(&face) {
            counts[usize::from(face)] += 1;
        }
    }
    counts
}

fn score_counts(counts: &[u32; 7]) -> u32 {
    let mut total = 0u32;
    for face in 1..=6u32 {
        let n = counts[face as usize];
        if n >= 3 {
            let base = if face == 1 { 1000 } else { 100 * face };
            total = total.saturating_add(base.saturating_mul(2u32.saturating_pow(n - 3)));
        } else if face == 1 {
            total += 100 * n;
        } else if face == 5 {
            total += 50 * n;
        }
    }
    total
}

fn score_with_run(counts: &[u32; 7]) -> u32 {
    let mut best = 0;
    for (low, high, value) in RUNS {
        let faces = usize::from(low)..=usize::from(high);
        if faces.clone().all(|f| counts[f] > 0) {
            let mut rest = *counts;
            for f in faces {
                rest[f] -= 1;
            }
            best = best.max(value + score_counts(&rest));
        }
    }
    best
}

/// Checks that `kept` may be taken from `roll` and returns its score.
///
/// The selection must be non-empty, use no face more often than it was
/// rolled, and score more than zero under `score`.
///
/// # Errors
/// Returns [`MatchError::InvalidSelection`] describing the first problem.
pub fn validate_selection(
    roll: &[u8],
    kept: &[u8],
    score: impl Fn(&[u8]) -> u32,
) -> Result<u32, MatchError> {
    if kept.is_empty() {
        return Err(MatchError::InvalidSelection("no dice kept".into()));
    }
    for &face in kept {
        if !(1..=6).contains(&face) {
            return Err(MatchError::InvalidSelection(format!(
                "{face} is not a die face"
            )));
        }
    }

    let available = face_counts(roll);
    let wanted = face_counts(kept);
    for face in 1..=6 {
        if wanted[face] > available[face] {
            return Err(MatchError::InvalidSelection(format!(
                "cannot keep {} of '{face}'; only {} rolled",
                wanted[face], available[face]
            )));
        }
    }

    match score(kept) {
        0 => Err(MatchError::InvalidSelection("kept dice do not score".into())),
        points => Ok(points),
    }
}

// ---------------------------------------------------------------------------
// Dice sources
// ---------------------------------------------------------------------------

/// Uniform, independent die rolls from an OS-seeded generator.
#[derive(Debug, Clone)]
pub struct RandomDice {
    rng: StdRng,
}

impl RandomDice {
    /// Creates a dice source seeded from the operating system.
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }

    /// Creates a reproducible dice source.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for RandomDice {
    fn default() -> Self {
        Self::new()
    }
}

impl ScoringOracle for RandomDice {
    fn roll(&mut self, n: usize) -> Dice {
        (0..n).map(|_| self.rng.random_range(1..=6)).collect()
    }
}

/// Replays a fixed list of rolls, in order.
///
/// Each scripted roll is cut or padded to the requested count. Padding
/// and rolls past the end of the script use a non-scoring filler, so an
/// exhausted script farkles rather than inventing points.
#[derive(Debug, Clone, Default)]
pub struct ScriptedDice {
    rolls: VecDeque<Dice>,
}

/// Non-scoring filler: no prefix of this contains a scoring die.
const FILLER: [u8; 6] = [2, 3, 4, 6, 2, 3];

impl ScriptedDice {
    /// Creates a script from rolls given in play order.
    pub fn new<I>(rolls: I) -> Self
    where
        I: IntoIterator<Item = Dice>,
    {
        Self {
            rolls: rolls.into_iter().collect(),
        }
    }

    /// Returns how many scripted rolls are left.
    pub fn remaining(&self) -> usize {
        self.rolls.len()
    }
}

impl ScoringOracle for ScriptedDice {
    fn roll(&mut self, n: usize) -> Dice {
        let mut dice = self.rolls.pop_front().unwrap_or_default();
        if dice.len() != n {
            tracing::debug!(scripted = dice.len(), wanted = n, "scripted roll resized");
        }
        dice.truncate(n);
        while dice.len() < n {
            dice.push(FILLER[dice.len() % FILLER.len()]);
        }
        dice
    }
}
