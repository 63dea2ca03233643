//! # Farkle
//!
//! Two-player Farkle over TCP. One process hosts and owns the only copy
//! of the match; the other joins with a lobby id and reacts to what the
//! host tells it.
//!
//! The layers underneath are separate crates:
//!
//! ```text
//! farkle-transport (lines) → farkle-protocol (Message) → farkle-match (TurnMachine)
//! ```
//!
//! This crate ties them into the two session drivers,
//! [`HostSession::run`] and [`join`]. Both talk to the local player only
//! through [`DecisionSource`] and [`OutputSink`].
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use farkle::prelude::*;
//!
//! # async fn host(mut input: impl DecisionSource, mut screen: impl OutputSink) -> Result<(), FarkleError> {
//! let session = HostSession::bind(SessionConfig::default(), MatchConfig::new(2000)).await?;
//! println!("Lobby: {}", session.lobby_id(None));
//! let outcome = session.run(RandomDice::new(), &mut input, &mut screen).await?;
//! println!("You {outcome}.");
//! # Ok(())
//! # }
//! ```

mod config;
mod error;
mod host;
mod io;
mod link;
mod narrate;
mod outbox;
mod outcome;
mod peer;

pub use config::{DEFAULT_PORT, SessionConfig};
pub use error::FarkleError;
pub use host::{HostSession, outbound_ipv4};
pub use io::{Choice, DecisionPrompt, DecisionSource, OutputSink, Transcript};
pub use narrate::narrate;
pub use outcome::MatchOutcome;
pub use peer::{ScoreMirror, join, resolve_join_addr};

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use crate::{
        Choice, DecisionPrompt, DecisionSource, FarkleError, HostSession, MatchOutcome,
        OutputSink, SessionConfig, join, resolve_join_addr,
    };
    pub use farkle_match::{Decision, MatchConfig, RandomDice, ScoringOracle};
    pub use farkle_protocol::{Message, Side, lobby};
}
