//! Codec trait and implementations for serializing/deserializing messages.
//!
//! The drivers never touch serde directly; they hold something that
//! implements [`Codec`]. [`JsonCodec`] is the only implementation today
//! and produces one compact JSON object per message, which the line
//! transport can frame without escaping.

use serde::{Serialize, de::DeserializeOwned};

use crate::ProtocolError;

/// A codec that can encode Rust types to bytes and decode bytes back.
///
/// `Send + Sync + 'static` lets a codec live inside the outbound sender
/// task as well as the authoritative loop.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into bytes.
    ///
    /// # Errors
    /// Returns `ProtocolError::Encode` if serialization fails.
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError>;

    /// Deserializes bytes back into a value.
    ///
    /// # Errors
    /// Returns `ProtocolError::Decode` if the bytes are malformed,
    /// incomplete, or don't match the expected type.
    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError>;
}

/// A [`Codec`] that uses compact JSON (via `serde_json`).
///
/// Compact output never contains a raw newline, so each encoded message
/// fits on exactly one line of the TCP transport.
///
/// ## Example
///
/// ```rust
/// use farkle_protocol::{Codec, JsonCodec, Message, Side};
///
/// let codec = JsonCodec;
/// let msg = Message::Roll { dice: vec![1, 5, 5], side: Side::Peer };
///
/// let bytes = codec.encode(&msg).unwrap();
/// assert_eq!(bytes, br#"{"t":"roll","dice":[1,5,5],"idx":1}"#);
///
/// let decoded: Message = codec.decode(&bytes).unwrap();
/// assert_eq!(msg, decoded);
/// ```
#[cfg(feature = "json")]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

#[cfg(feature = "json")]
impl Codec for JsonCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError> {
        serde_json::from_slice(data).map_err(ProtocolError::Decode)
    }
}

#[cfg(all(test, feature = "json"))]
mod tests {
    use super::*;
    use crate::{Message, Side};

    #[test]
    fn test_json_codec_output_is_single_line() {
        let msg = Message::Hello {
            name: "line\nbreak".into(),
        };
        let bytes = JsonCodec.encode(&msg).unwrap();
        assert!(!bytes.contains(&b'\n'));
    }

    #[test]
    fn test_json_codec_decode_error_is_wrapped() {
        let err = JsonCodec.decode::<Message>(b"{not json").unwrap_err();
        assert!(matches!(err, ProtocolError::Decode(_)));
        assert!(err.to_string().starts_with("decode failed"));
    }

    #[test]
    fn test_json_codec_decodes_side_from_idx() {
        let msg: Message = JsonCodec.decode(br#"{"t":"hot","idx":1}"#).unwrap();
        assert_eq!(msg, Message::Hot { side: Side::Peer });
    }
}
