//! Accept loop driving the socket lifecycle.
//!
//! One connection at a time: accept, run the greeting exchange, close,
//! repeat. While a client is being served, further connection attempts sit
//! in the listener's backlog queue. Per-connection failures are logged and
//! never stop the loop; only listener construction can fail the server.

use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::net::{Listener, SocketError};
use crate::protocol::{self, ExchangeOutcome};

/// Server instance
pub struct Server {
    config: Config,
}

impl Server {
    /// Create a new server instance
    pub fn new(config: Config) -> Self {
        Server { config }
    }

    /// Walk the listener through create, bind and listen.
    ///
    /// Any failure propagates and drops the partially constructed listener,
    /// releasing its handle.
    pub fn bind(&self) -> Result<Listener, SocketError> {
        let mut listener = Listener::create(
            &self.config.host,
            self.config.port,
            self.config.backlog,
            self.config.on_invalid_addr,
        )?;
        listener.bind()?;
        listener.listen()?;
        Ok(listener)
    }

    /// Bind and serve forever.
    pub fn run(&self) -> Result<(), SocketError> {
        let listener = self.bind()?;
        if let Ok(addr) = listener.local_addr() {
            info!(address = %addr, "Server listening");
        }
        self.serve(listener)
    }

    /// Accept and service connections sequentially, forever.
    ///
    /// Each accepted connection is fully serviced and closed before the
    /// next accept. A failed accept leaves the listener usable, so the loop
    /// just logs and continues.
    pub fn serve(&self, listener: Listener) -> Result<(), SocketError> {
        loop {
            let mut conn = match listener.accept() {
                Ok(conn) => conn,
                Err(e) => {
                    error!(error = %e, "Failed to accept connection");
                    continue;
                }
            };

            let peer = conn.peer_addr();
            debug!(peer = %peer, "New connection");

            match protocol::exchange(&mut conn, self.config.buffer_size) {
                Ok(ExchangeOutcome::Acknowledged(request)) => {
                    debug!(peer = %peer, bytes = request.len(), "Exchange complete");
                }
                Ok(ExchangeOutcome::PeerClosed) => {
                    warn!(peer = %peer, "Peer closed before sending data");
                }
                Err(e) => {
                    warn!(peer = %peer, error = %e, "Exchange failed");
                }
            }

            conn.close();
        }
    }
}
