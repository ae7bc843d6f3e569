//! Error taxonomy for the socket lifecycle.
//!
//! Every variant wraps the underlying OS cause so callers can log or inspect
//! it. Construction-phase errors (`Allocation`, `Creation`, `InvalidAddress`,
//! `Bind`, `Listen`) are fatal to the Listener being built; per-connection
//! errors (`Accept`, `Send`, `Receive`) are local to one connection or
//! attempt and leave the Listener usable.

use std::fmt;
use std::io;

/// Failures of the socket lifecycle operations.
#[derive(Debug)]
pub enum SocketError {
    /// The OS could not provide a socket handle (descriptor or buffer
    /// exhaustion: EMFILE, ENFILE, ENOBUFS, ENOMEM).
    Allocation(io::Error),
    /// The socket call itself failed for a non-exhaustion reason.
    Creation(io::Error),
    /// The bind address is not valid IPv4 dotted-decimal text.
    InvalidAddress(String),
    /// Binding to the configured address failed (address in use,
    /// permission denied, address not available).
    Bind(io::Error),
    /// Putting the socket into passive listening mode failed.
    Listen(io::Error),
    /// Accepting a pending connection failed. The listener stays usable.
    Accept(io::Error),
    /// Sending on an accepted connection failed.
    Send(io::Error),
    /// Receiving on an accepted connection failed.
    Receive(io::Error),
}

impl SocketError {
    /// Classify a `socket()` failure: resource exhaustion becomes
    /// `Allocation`, anything else `Creation`.
    pub(crate) fn from_socket_creation(err: io::Error) -> Self {
        match err.raw_os_error() {
            Some(libc::EMFILE) | Some(libc::ENFILE) | Some(libc::ENOBUFS)
            | Some(libc::ENOMEM) => SocketError::Allocation(err),
            _ => SocketError::Creation(err),
        }
    }
}

impl fmt::Display for SocketError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SocketError::Allocation(e) => {
                write!(f, "Could not allocate a socket handle: {e}")
            }
            SocketError::Creation(e) => write!(f, "Socket creation failed: {e}"),
            SocketError::InvalidAddress(addr) => {
                write!(f, "Invalid IPv4 address '{addr}'")
            }
            SocketError::Bind(e) => write!(f, "Bind failed: {e}"),
            SocketError::Listen(e) => write!(f, "Listen failed: {e}"),
            SocketError::Accept(e) => write!(f, "Accept failed: {e}"),
            SocketError::Send(e) => write!(f, "Send failed: {e}"),
            SocketError::Receive(e) => write!(f, "Receive failed: {e}"),
        }
    }
}

impl std::error::Error for SocketError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SocketError::Allocation(e)
            | SocketError::Creation(e)
            | SocketError::Bind(e)
            | SocketError::Listen(e)
            | SocketError::Accept(e)
            | SocketError::Send(e)
            | SocketError::Receive(e) => Some(e),
            SocketError::InvalidAddress(_) => None,
        }
    }
}
