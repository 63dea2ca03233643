//! Session settings.

use std::time::Duration;

/// Well-known port the host listens on.
pub const DEFAULT_PORT: u16 = 9313;

/// Settings for either side of a session.
///
/// Override just the fields you need:
///
/// ```rust
/// use farkle::SessionConfig;
///
/// let config = SessionConfig {
///     bind_addr: "127.0.0.1:0".into(),
///     ..SessionConfig::default()
/// };
/// assert_eq!(config.outbound_capacity, 32);
/// ```
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Address the host listens on.
    pub bind_addr: String,

    /// How long a peer waits for the TCP connection to open.
    pub dial_timeout: Duration,

    /// How long either side waits for the other's opening message.
    pub handshake_timeout: Duration,

    /// Capacity of the host's outbound message queue.
    pub outbound_capacity: usize,

    /// Name the peer announces in its `hello`.
    pub player_name: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            bind_addr: format!("0.0.0.0:{DEFAULT_PORT}"),
            dial_timeout: Duration::from_secs(10),
            handshake_timeout: Duration::from_secs(10),
            outbound_capacity: 32,
            player_name: "peer".to_string(),
        }
    }
}
