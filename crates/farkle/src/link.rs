//! A connection paired with the codec that speaks over it.

use std::time::Duration;

use farkle_protocol::{Codec, Message};
use farkle_transport::{Connection, TcpConnection};

use crate::FarkleError;

/// Sends and receives whole [`Message`]s over one TCP connection.
///
/// Reads and writes lock different halves of the socket, so the host's
/// outbound task can write while the authoritative loop waits to read.
pub(crate) struct Link<C: Codec> {
    conn: TcpConnection,
    codec: C,
}

impl<C: Codec> Link<C> {
    pub(crate) fn new(conn: TcpConnection, codec: C) -> Self {
        Self { conn, codec }
    }

    pub(crate) async fn send(&self, msg: &Message) -> Result<(), FarkleError> {
        let bytes = self.codec.encode(msg)?;
        self.conn.send(&bytes).await?;
        tracing::debug!(id = %self.conn.id(), kind = msg.kind(), "sent");
        Ok(())
    }

    /// Receives the next message of any kind, [`Message::Unknown`] included.
    ///
    /// Returns `Ok(None)` when the other side closed the stream.
    pub(crate) async fn recv_any(&self) -> Result<Option<Message>, FarkleError> {
        let Some(data) = self.conn.recv().await? else {
            return Ok(None);
        };
        let msg: Message = self.codec.decode(&data)?;
        tracing::debug!(id = %self.conn.id(), kind = msg.kind(), "received");
        Ok(Some(msg))
    }

    /// Receives the next message, skipping kinds this build does not know.
    pub(crate) async fn recv(&self) -> Result<Option<Message>, FarkleError> {
        loop {
            match self.recv_any().await? {
                Some(Message::Unknown) => {
                    tracing::debug!(id = %self.conn.id(), "ignoring unknown message kind");
                }
                other => return Ok(other),
            }
        }
    }

    /// Receives the opening message of a handshake within `timeout`.
    pub(crate) async fn recv_opening(&self, timeout: Duration) -> Result<Message, FarkleError> {
        match tokio::time::timeout(timeout, self.recv_any()).await {
            Ok(Ok(Some(msg))) => Ok(msg),
            Ok(Ok(None)) => Err(FarkleError::HandshakeFailed(
                "connection closed during handshake".into(),
            )),
            Ok(Err(FarkleError::Protocol(e))) => Err(FarkleError::HandshakeFailed(e.to_string())),
            Ok(Err(e)) => Err(e),
            Err(_) => Err(FarkleError::HandshakeFailed("handshake timed out".into())),
        }
    }

    /// Closes the sending half. Errors are logged, not returned: the
    /// session is over either way.
    pub(crate) async fn close(&self) {
        if let Err(e) = self.conn.close().await {
            tracing::debug!(id = %self.conn.id(), error = %e, "close failed");
        }
    }

    pub(crate) fn connection(&self) -> &TcpConnection {
        &self.conn
    }
}
