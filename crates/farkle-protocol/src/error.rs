//! Error types for the protocol layer.
//!
//! Each crate in Farkle defines its own error enum. A `ProtocolError`
//! always means the problem is in turning messages or lobby ids into
//! bytes and back, not in networking or game rules.

/// Errors that can occur in the protocol layer.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (turning a message into bytes).
    #[cfg(feature = "json")]
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed (turning bytes into a message).
    ///
    /// Common causes: malformed JSON, a missing `t` tag, or a field
    /// with the wrong type.
    #[cfg(feature = "json")]
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// A lobby identifier could not be decoded into an address.
    #[error("invalid lobby id: {0}")]
    InvalidLobbyId(String),
}
