//! Socket lifecycle primitives.
//!
//! Two entities: a [`Listener`] walks the create, bind, listen, accept
//! sequence with its state checked at every step, and a [`Connection`] is
//! one accepted peer with explicit partial send/receive semantics. Both
//! release their OS handle on close or drop, including on error paths.

mod connection;
mod error;
mod listener;

pub use connection::Connection;
pub use error::SocketError;
pub use listener::{Listener, ListenerState};
