//! tcp-greeter: a single-client TCP greeting server.
//!
//! The crate is built around an explicit socket lifecycle. A
//! [`net::Listener`] walks the create, bind, listen sequence with its state
//! checked at every step, then yields one [`net::Connection`] per accept.
//! [`protocol`] defines the fixed greeting/acknowledgement exchange run on
//! each connection, and [`server`] owns the sequential accept loop.
//!
//! Everything is blocking and single-client-at-a-time; while one connection
//! is being serviced, further attempts wait in the listener's backlog queue.

pub mod config;
pub mod net;
pub mod protocol;
pub mod server;
