//! Line-framed TCP transport using `tokio::net`.
//!
//! Each message travels as one line: the payload bytes followed by `\n`.
//! Payloads must not contain a raw newline, which holds for compact JSON.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{TcpListener, TcpStream, ToSocketAddrs};
use tokio::sync::Mutex;

use crate::{Connection, ConnectionId, MAX_FRAME_LEN, Transport, TransportError};

/// Counter for generating unique connection IDs.
static NEXT_CONNECTION_ID: AtomicU64 = AtomicU64::new(1);

/// A TCP [`Transport`] that listens for incoming connections.
pub struct TcpTransport {
    listener: TcpListener,
}

impl TcpTransport {
    /// Binds a new TCP transport to the given address.
    pub async fn bind(addr: &str) -> Result<Self, TransportError> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(TransportError::AcceptFailed)?;
        tracing::info!(addr, "TCP transport listening");
        Ok(Self { listener })
    }

    /// Returns the local address the listener is bound to.
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }
}

impl Transport for TcpTransport {
    type Connection = TcpConnection;
    type Error = TransportError;

    async fn accept(&mut self) -> Result<Self::Connection, Self::Error> {
        let (stream, addr) = self
            .listener
            .accept()
            .await
            .map_err(TransportError::AcceptFailed)?;

        let conn = TcpConnection::from_stream(stream, addr);
        tracing::debug!(id = %conn.id, %addr, "accepted TCP connection");
        Ok(conn)
    }
}

/// A single TCP connection, split so reads and writes never block
/// each other.
pub struct TcpConnection {
    id: ConnectionId,
    peer_addr: SocketAddr,
    reader: Mutex<BufReader<OwnedReadHalf>>,
    writer: Mutex<OwnedWriteHalf>,
}

impl TcpConnection {
    /// Dials `addr`, giving up after `timeout`.
    pub async fn connect<A>(addr: A, timeout: Duration) -> Result<Self, TransportError>
    where
        A: ToSocketAddrs + std::fmt::Display,
    {
        let shown = addr.to_string();
        let stream = match tokio::time::timeout(timeout, TcpStream::connect(addr)).await {
            Ok(Ok(stream)) => stream,
            Ok(Err(source)) => {
                return Err(TransportError::ConnectFailed { addr: shown, source });
            }
            Err(_) => return Err(TransportError::ConnectTimeout(shown)),
        };
        let peer_addr = stream
            .peer_addr()
            .map_err(|source| TransportError::ConnectFailed { addr: shown, source })?;

        let conn = Self::from_stream(stream, peer_addr);
        tracing::debug!(id = %conn.id, %peer_addr, "dialed TCP connection");
        Ok(conn)
    }

    /// Returns the address of the remote side.
    pub fn peer_addr(&self) -> SocketAddr {
        self.peer_addr
    }

    fn from_stream(stream: TcpStream, peer_addr: SocketAddr) -> Self {
        // Turn messages are tiny and latency matters more than batching.
        if let Err(e) = stream.set_nodelay(true) {
            tracing::debug!(error = %e, "failed to set TCP_NODELAY");
        }
        let (read, write) = stream.into_split();
        Self {
            id: ConnectionId::new(NEXT_CONNECTION_ID.fetch_add(1, Ordering::Relaxed)),
            peer_addr,
            reader: Mutex::new(BufReader::new(read)),
            writer: Mutex::new(write),
        }
    }
}

impl Connection for TcpConnection {
    type Error = TransportError;

    async fn send(&self, data: &[u8]) -> Result<(), Self::Error> {
        if data.contains(&b'\n') {
            return Err(TransportError::SendFailed(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "frame contains a newline",
            )));
        }
        let mut frame = Vec::with_capacity(data.len() + 1);
        frame.extend_from_slice(data);
        frame.push(b'\n');

        let mut writer = self.writer.lock().await;
        writer
            .write_all(&frame)
            .await
            .map_err(TransportError::SendFailed)?;
        writer.flush().await.map_err(TransportError::SendFailed)
    }

    async fn recv(&self) -> Result<Option<Vec<u8>>, Self::Error> {
        let mut reader = self.reader.lock().await;
        loop {
            let mut buf = Vec::new();
            let n = (&mut *reader)
                .take(MAX_FRAME_LEN as u64 + 1)
                .read_until(b'\n', &mut buf)
                .await
                .map_err(TransportError::ReceiveFailed)?;
            if n == 0 {
                return Ok(None);
            }

            if buf.last() == Some(&b'\n') {
                buf.pop();
                if buf.last() == Some(&b'\r') {
                    buf.pop();
                }
            } else if buf.len() > MAX_FRAME_LEN {
                return Err(TransportError::FrameTooLong(MAX_FRAME_LEN));
            }

            if buf.is_empty() {
                continue; // blank keep-alive line
            }
            return Ok(Some(buf));
        }
    }

    async fn close(&self) -> Result<(), Self::Error> {
        self.writer
            .lock()
            .await
            .shutdown()
            .await
            .map_err(TransportError::SendFailed)
    }

    fn id(&self) -> ConnectionId {
        self.id
    }
}
