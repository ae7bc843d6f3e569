//! Listening socket with an explicit lifecycle.
//!
//! The lifecycle mirrors the underlying syscalls: `create` allocates the
//! socket, `bind` names it, `listen` makes it passive, `accept` yields one
//! peer at a time. Each step checks the state the previous step established,
//! so a caller that skips a step gets that operation's error instead of an
//! opaque OS failure later.

use socket2::{Domain, Protocol, Socket, Type};
use std::io;
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4, TcpStream};
use std::os::unix::io::AsRawFd;
use tracing::{debug, info, warn};

use crate::config::AddrPolicy;
use crate::net::connection::Connection;
use crate::net::error::SocketError;

/// Lifecycle state of a [`Listener`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListenerState {
    /// Socket allocated, not yet bound.
    Created,
    /// Bound to its address, not yet accepting.
    Bound,
    /// Passive and accepting. The only state `accept` is valid in.
    Listening,
    /// Handle released. Terminal.
    Closed,
}

/// A bound, passive TCP endpoint that queues and yields incoming
/// connections.
///
/// The address and backlog are fixed at creation. The handle is released on
/// [`close`](Listener::close) or drop, including on every construction
/// failure path.
#[derive(Debug)]
pub struct Listener {
    socket: Option<Socket>,
    addr: SocketAddrV4,
    backlog: u32,
    state: ListenerState,
}

impl Listener {
    /// Allocate an IPv4/TCP stream socket for the given address.
    ///
    /// `ip` must be dotted-decimal IPv4 text. When it does not parse,
    /// `policy` decides between rejecting with
    /// [`SocketError::InvalidAddress`] and falling back to the wildcard
    /// address `0.0.0.0` with a warning.
    pub fn create(
        ip: &str,
        port: u16,
        backlog: u32,
        policy: AddrPolicy,
    ) -> Result<Self, SocketError> {
        let ip_addr: Ipv4Addr = match ip.parse() {
            Ok(addr) => addr,
            Err(_) => match policy {
                AddrPolicy::Reject => {
                    return Err(SocketError::InvalidAddress(ip.to_string()))
                }
                AddrPolicy::Wildcard => {
                    warn!(ip, "invalid IPv4 address, falling back to 0.0.0.0");
                    Ipv4Addr::UNSPECIFIED
                }
            },
        };

        let socket = Socket::new(Domain::IPV4, Type::STREAM, Some(Protocol::TCP))
            .map_err(SocketError::from_socket_creation)?;

        debug!(fd = socket.as_raw_fd(), "socket created");

        Ok(Self {
            socket: Some(socket),
            addr: SocketAddrV4::new(ip_addr, port),
            backlog,
            state: ListenerState::Created,
        })
    }

    /// Associate the socket with its configured address.
    ///
    /// Valid only in the `Created` state. On failure the state is unchanged
    /// and the error wraps the OS cause (address in use, permission denied,
    /// address not available).
    pub fn bind(&mut self) -> Result<(), SocketError> {
        let socket = self
            .require_state(ListenerState::Created, "bind")
            .map_err(SocketError::Bind)?;

        let addr: socket2::SockAddr = SocketAddr::V4(self.addr).into();
        socket.bind(&addr).map_err(SocketError::Bind)?;

        self.state = ListenerState::Bound;
        info!(addr = %self.addr, "socket bound");
        Ok(())
    }

    /// Mark the socket passive with the configured backlog.
    ///
    /// Valid only in the `Bound` state. On success the listener transitions
    /// to `Listening`.
    pub fn listen(&mut self) -> Result<(), SocketError> {
        let socket = self
            .require_state(ListenerState::Bound, "listen")
            .map_err(SocketError::Listen)?;

        let backlog = i32::try_from(self.backlog).unwrap_or(i32::MAX);
        socket.listen(backlog).map_err(SocketError::Listen)?;

        self.state = ListenerState::Listening;
        info!(addr = %self.addr, backlog = self.backlog, "listening");
        Ok(())
    }

    /// Block until a pending connection is available and yield it.
    ///
    /// Valid only in the `Listening` state. A failed accept leaves the
    /// listener usable for further attempts and does not touch other queued
    /// connections.
    pub fn accept(&self) -> Result<Connection, SocketError> {
        let socket = self
            .require_state(ListenerState::Listening, "accept")
            .map_err(SocketError::Accept)?;

        let (stream, peer) = socket.accept().map_err(SocketError::Accept)?;
        let peer = peer.as_socket().ok_or_else(|| {
            SocketError::Accept(io::Error::new(
                io::ErrorKind::InvalidData,
                "peer address is not an inet address",
            ))
        })?;

        debug!(peer = %peer, "accepted connection");
        Ok(Connection::new(TcpStream::from(stream), peer))
    }

    /// The address the OS actually bound, resolving port 0 to the ephemeral
    /// port chosen at bind time.
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        let socket = self.socket.as_ref().ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotConnected, "listener is closed")
        })?;
        let addr = socket.local_addr()?;
        addr.as_socket().ok_or_else(|| {
            io::Error::new(io::ErrorKind::InvalidData, "bound address is not inet")
        })
    }

    /// Current lifecycle state.
    pub fn state(&self) -> ListenerState {
        self.state
    }

    /// Release the handle. Idempotent: closing a closed listener is a no-op.
    pub fn close(&mut self) {
        if let Some(socket) = self.socket.take() {
            debug!(addr = %self.addr, "listener closed");
            drop(socket);
        }
        self.state = ListenerState::Closed;
    }

    fn require_state(
        &self,
        expected: ListenerState,
        op: &'static str,
    ) -> io::Result<&Socket> {
        if self.state != expected {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{op} requires a {expected:?} listener, state is {:?}", self.state),
            ));
        }
        self.socket.as_ref().ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotConnected, "listener is closed")
        })
    }
}
