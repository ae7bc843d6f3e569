//! Configuration for the greeting server.
//!
//! All configuration comes from command-line arguments; there is no
//! configuration file. The `server` subcommand supplies the bind address and
//! port, everything else has defaults.

use clap::{Parser, Subcommand, ValueEnum};

/// Command-line arguments for the greeting server
#[derive(Parser, Debug)]
#[command(name = "tcp-greeter")]
#[command(version = "0.1.0")]
#[command(about = "A single-client TCP greeting server", long_about = None)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Command,
}

/// Command verbs
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the greeting server
    Server {
        /// IPv4 address to bind to (e.g. 127.0.0.1)
        host: String,

        /// Port to listen on
        port: u16,

        /// Maximum number of queued pending connections
        #[arg(short, long, default_value_t = 5)]
        backlog: u32,

        /// Receive buffer size in bytes
        #[arg(long, default_value_t = 1024)]
        buffer_size: usize,

        /// What to do when the bind address does not parse as IPv4
        #[arg(long, value_enum, default_value = "reject")]
        on_invalid_addr: AddrPolicy,

        /// Log level (trace, debug, info, warn, error)
        #[arg(long, default_value = "info")]
        log_level: String,
    },
}

/// Handling of bind-address text that is not valid IPv4.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AddrPolicy {
    /// Fail fast with an invalid-address error.
    #[default]
    Reject,
    /// Bind the wildcard address 0.0.0.0 instead, with a warning. This is
    /// what the classic sockets API does when inet_pton's result is left
    /// unchecked.
    Wildcard,
}

/// Final resolved configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub backlog: u32,
    pub buffer_size: usize,
    pub on_invalid_addr: AddrPolicy,
    pub log_level: String,
}

impl Config {
    /// Resolve configuration from the process arguments.
    pub fn load() -> Self {
        Self::from_args(CliArgs::parse())
    }

    pub fn from_args(args: CliArgs) -> Self {
        match args.command {
            Command::Server {
                host,
                port,
                backlog,
                buffer_size,
                on_invalid_addr,
                log_level,
            } => Config {
                host,
                port,
                backlog,
                buffer_size,
                on_invalid_addr,
                log_level,
            },
        }
    }
}
