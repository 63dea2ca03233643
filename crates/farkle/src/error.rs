//! Unified error type for Farkle sessions.

use farkle_match::MatchError;
use farkle_protocol::ProtocolError;
use farkle_transport::TransportError;

/// Top-level error that wraps all crate-specific errors.
///
/// The `#[from]` variants let `?` lift errors from the lower layers. The
/// remaining variants are session-level failures that only make sense
/// once two processes are talking.
#[derive(Debug, thiserror::Error)]
pub enum FarkleError {
    /// A transport-level error (bind, dial, send, recv).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (encode, decode, lobby id).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A rules-level error raised by the turn state machine.
    #[error(transparent)]
    Match(#[from] MatchError),

    /// The opening exchange did not go `hello` → `welcome`.
    #[error("handshake failed: {0}")]
    HandshakeFailed(String),

    /// The peer sent something the protocol does not allow.
    #[error("protocol violation: {0}")]
    ProtocolViolation(String),

    /// The other side went away after the handshake.
    #[error("connection lost: {0}")]
    ConnectionLost(String),
}
