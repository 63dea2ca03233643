//! Lobby identifiers: the token a host shares so a peer can find it.
//!
//! A lobby id packs seven bytes into upper-case, unpadded base-32:
//!
//! ```text
//! ┌────┬────┬────┬────┬─────────┬──────┐
//! │ a  │ b  │ c  │ d  │ port BE │ salt │   a.b.c.d:port
//! └────┴────┴────┴────┴─────────┴──────┘
//! ```
//!
//! The salt byte is random so two lobbies on the same address do not
//! read alike. It makes ids harder to guess, it does not secure anything.

use std::net::{Ipv4Addr, SocketAddrV4};

use data_encoding::BASE32_NOPAD;

use crate::ProtocolError;

/// Decoded length of a lobby id that carries an address.
pub const LOBBY_ID_LEN: usize = 7;

/// Length of the salt-only id produced when there is no IPv4 to share.
const OPAQUE_ID_LEN: usize = 5;

/// Encodes `host:port` into a lobby id.
///
/// If `host` is not an IPv4 literal the id is built from random bytes
/// only. It still looks like a lobby id but [`decode`] rejects it, so a
/// peer holding one must be given the host address explicitly.
///
/// ```rust
/// use farkle_protocol::lobby;
///
/// let id = lobby::encode("203.0.113.7", 9313);
/// assert_eq!(lobby::decode(&id).unwrap().to_string(), "203.0.113.7:9313");
/// ```
pub fn encode(host: &str, port: u16) -> String {
    match host.parse::<Ipv4Addr>() {
        Ok(ip) => encode_addr(SocketAddrV4::new(ip, port)),
        Err(_) => {
            let salt: [u8; OPAQUE_ID_LEN] = rand::random();
            BASE32_NOPAD.encode(&salt)
        }
    }
}

/// Encodes an IPv4 socket address into a lobby id.
pub fn encode_addr(addr: SocketAddrV4) -> String {
    let mut buf = [0u8; LOBBY_ID_LEN];
    buf[..4].copy_from_slice(&addr.ip().octets());
    buf[4..6].copy_from_slice(&addr.port().to_be_bytes());
    buf[6] = rand::random();
    BASE32_NOPAD.encode(&buf)
}

/// Recovers the address packed into a lobby id.
///
/// Case and surrounding whitespace are ignored. Only the bytes are
/// checked; nothing here tells whether the host is reachable.
///
/// # Errors
/// Returns [`ProtocolError::InvalidLobbyId`] if the text is not base-32
/// or does not decode to exactly [`LOBBY_ID_LEN`] bytes.
pub fn decode(id: &str) -> Result<SocketAddrV4, ProtocolError> {
    let normalized = id.trim().to_ascii_uppercase();
    let data = BASE32_NOPAD
        .decode(normalized.as_bytes())
        .map_err(|e| ProtocolError::InvalidLobbyId(e.to_string()))?;

    if data.len() != LOBBY_ID_LEN {
        return Err(ProtocolError::InvalidLobbyId(format!(
            "expected {LOBBY_ID_LEN} bytes, got {}",
            data.len()
        )));
    }

    let ip = Ipv4Addr::new(data[0], data[1], data[2], data[3]);
    let port = u16::from_be_bytes([data[4], data[5]]);
    Ok(SocketAddrV4::new(ip, port))
}
