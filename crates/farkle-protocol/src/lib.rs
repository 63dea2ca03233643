//! Wire protocol for Farkle.
//!
//! This crate defines what host and peer say to each other:
//!
//! - **Types** ([`Message`], [`Side`]): the records that travel on the wire.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): how records become bytes.
//! - **Lobby ids** ([`lobby`]): the shareable token that tells a peer
//!   where the host is listening.
//! - **Errors** ([`ProtocolError`]).
//!
//! ```text
//! Transport (lines) → Protocol (Message) → Match (turn state machine)
//! ```

mod codec;
mod error;
pub mod lobby;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use types::{Dice, Message, Side};
