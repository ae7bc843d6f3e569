//! CLI entry point for the greeting server.

use tcp_greeter::config::Config;
use tcp_greeter::server::Server;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load();

    // Initialize logging
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    info!(
        host = %config.host,
        port = config.port,
        backlog = config.backlog,
        buffer_size = config.buffer_size,
        "Starting tcp-greeter"
    );

    let server = Server::new(config);
    server.run()?;

    Ok(())
}
