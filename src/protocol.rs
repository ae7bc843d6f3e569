//! The fixed greeting/acknowledgement exchange.
//!
//! Wire format, not configurable:
//!
//! ```text
//! server -> client: Welcome to the server!\n
//! client -> server: <up to max_bytes of peer data>
//! server -> client: Message received\n
//! ```
//!
//! The acknowledgement is only sent when the peer actually delivered data;
//! a peer that closes its write side first ends the exchange early.

use bytes::BytesMut;

use crate::net::{Connection, SocketError};

/// Sent in full to every accepted peer.
pub const GREETING: &[u8] = b"Welcome to the server!\n";

/// Sent in full after a non-empty receive.
pub const ACK: &[u8] = b"Message received\n";

/// How a greeting exchange ended.
#[derive(Debug)]
pub enum ExchangeOutcome {
    /// The peer sent data and the acknowledgement was delivered.
    Acknowledged(BytesMut),
    /// The peer closed its write side without sending anything; no
    /// acknowledgement was sent.
    PeerClosed,
}

/// Run one greeting exchange on an accepted connection.
///
/// Sends the greeting, waits for up to `max_bytes` of peer data, and
/// acknowledges it. Does not close the connection; that stays with the
/// owner regardless of outcome.
pub fn exchange(
    conn: &mut Connection,
    max_bytes: usize,
) -> Result<ExchangeOutcome, SocketError> {
    conn.send_all(GREETING)?;

    let request = conn.receive(max_bytes)?;
    if request.is_empty() {
        return Ok(ExchangeOutcome::PeerClosed);
    }

    conn.send_all(ACK)?;
    Ok(ExchangeOutcome::Acknowledged(request))
}
