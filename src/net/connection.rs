//! An accepted peer connection.
//!
//! Partial transfers are part of the contract: `send` and `receive` each map
//! to one syscall and may move fewer bytes than asked. `send_all` is the
//! retry loop callers need for complete delivery; readers loop on `receive`
//! themselves if they want a full logical message.

use bytes::BytesMut;
use std::io::{self, Read, Write};
use std::net::{SocketAddr, TcpStream};
use tracing::debug;

use crate::net::error::SocketError;

/// A peer-facing endpoint created by a successful accept.
///
/// Exclusively owned by the caller that accepted it. The handle is released
/// on [`close`](Connection::close) or drop; a send or receive failure does
/// not close the connection by itself.
pub struct Connection {
    stream: Option<TcpStream>,
    peer: SocketAddr,
}

impl Connection {
    pub(crate) fn new(stream: TcpStream, peer: SocketAddr) -> Self {
        Self {
            stream: Some(stream),
            peer,
        }
    }

    /// The peer address captured at accept time.
    pub fn peer_addr(&self) -> SocketAddr {
        self.peer
    }

    /// Queue `data` for transmission. Returns the number of bytes the OS
    /// accepted, which may be less than `data.len()`.
    pub fn send(&mut self, data: &[u8]) -> Result<usize, SocketError> {
        let stream = self.stream_mut().map_err(SocketError::Send)?;
        stream.write(data).map_err(SocketError::Send)
    }

    /// Send all of `data`, reissuing on partial writes until every byte is
    /// accepted or an error occurs.
    pub fn send_all(&mut self, data: &[u8]) -> Result<(), SocketError> {
        let mut sent = 0;
        while sent < data.len() {
            match self.send(&data[sent..])? {
                0 => {
                    return Err(SocketError::Send(io::Error::new(
                        io::ErrorKind::WriteZero,
                        "write returned 0",
                    )))
                }
                n => sent += n,
            }
        }
        Ok(())
    }

    /// Block until at least one byte arrives or the peer closes its write
    /// side, then return up to `max_bytes` bytes.
    ///
    /// An empty result signals graceful peer shutdown, not an error. A
    /// single call may return fewer bytes than requested even when more data
    /// is in flight.
    pub fn receive(&mut self, max_bytes: usize) -> Result<BytesMut, SocketError> {
        let mut buf = BytesMut::zeroed(max_bytes);
        let stream = self.stream_mut().map_err(SocketError::Receive)?;
        let n = stream.read(&mut buf).map_err(SocketError::Receive)?;
        buf.truncate(n);
        Ok(buf)
    }

    /// Release the handle. Idempotent: closing a closed connection is a
    /// no-op and does not affect other connections.
    pub fn close(&mut self) {
        if let Some(stream) = self.stream.take() {
            debug!(peer = %self.peer, "connection closed");
            drop(stream);
        }
    }

    /// Whether the handle has been released.
    pub fn is_closed(&self) -> bool {
        self.stream.is_none()
    }

    fn stream_mut(&mut self) -> io::Result<&mut TcpStream> {
        self.stream.as_mut().ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotConnected, "connection is closed")
        })
    }
}
