//! Command-line interface definitions for the coverage server.

use clap::{Parser, ValueEnum};

/// Top-level command-line interface definition.
#[derive(Debug, Parser)]
#[command(name = "coverage_server")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = env!("CARGO_PKG_DESCRIPTION"))]
pub struct Cli {
    /// Port to listen on. A trailing `--port` without a value keeps the default.
    #[arg(long)]
    pub port: Option<Option<u16>>,

    /// Bind address for the HTTP listener
    #[arg(long)]
    pub bind: Option<String>,

    /// Directory the registered tool scripts are resolved in
    #[arg(long)]
    pub tools_dir: Option<String>,

    /// Seconds a socket client may take to send its run request
    #[arg(long, value_name = "SECONDS")]
    pub socket_request_timeout: Option<u64>,

    /// Optional TOML configuration file; command-line values take precedence
    #[arg(short, long)]
    pub config: Option<String>,

    /// Log output format
    #[arg(long, value_enum, default_value_t = LogFormat::Compact)]
    pub log_format: LogFormat,
}

impl Cli {
    /// The port given on the command line, if any.
    #[must_use]
    pub fn port_override(&self) -> Option<u16> {
        self.port.flatten()
    }
}

/// Output format of the tracing subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}
