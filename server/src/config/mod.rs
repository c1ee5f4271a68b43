//! Configuration management: the optional TOML file and the settings resolved from it and the CLI.

mod loader;
mod types;

use core::{
    net::{IpAddr, Ipv4Addr},
    time::Duration,
};
use std::path::PathBuf;

use coverage_common::DEFAULT_PORT;
use eyre::WrapErr as _;

pub use loader::*;
pub use types::*;

use crate::cli::Cli;

/// Default directory tool scripts are resolved in, relative to the working directory.
pub const DEFAULT_TOOLS_DIR: &str = "tools";

/// How long a socket client has to send its run request after the upgrade.
pub const DEFAULT_SOCKET_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Effective settings, resolved once before the server starts and never changed afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub port: u16,
    pub bind: IpAddr,
    pub tools_dir: PathBuf,
    pub socket_request_timeout: Duration,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            bind: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            tools_dir: PathBuf::from(DEFAULT_TOOLS_DIR),
            socket_request_timeout: DEFAULT_SOCKET_REQUEST_TIMEOUT,
        }
    }
}

impl Settings {
    /// Layers the config file (if any) and the command line over the defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be loaded or the bind address is invalid.
    pub async fn resolve(cli: &Cli) -> eyre::Result<Self> {
        let (file, config_path) = match cli.config {
            Some(ref path) => {
                let path = PathBuf::from(path);
                (load(&path).await?.server, Some(path))
            }
            None => (ServerConfig::default(), None),
        };
        Self::merge(cli, file, config_path)
    }

    fn merge(cli: &Cli, file: ServerConfig, config_path: Option<PathBuf>) -> eyre::Result<Self> {
        let defaults = Self::default();

        let bind = match cli.bind.as_ref().or(file.bind.as_ref()) {
            Some(bind) => bind
                .parse()
                .wrap_err(format!("Invalid bind address: {bind}"))?,
            None => defaults.bind,
        };

        let tools_dir = match (cli.tools_dir.as_ref(), file.tools_dir, config_path) {
            (Some(dir), _, _) => PathBuf::from(dir),
            (None, Some(dir), Some(config_path)) => resolve_config_relative_paths(&config_path, &dir),
            (None, Some(dir), None) => PathBuf::from(dir),
            (None, None, _) => defaults.tools_dir,
        };

        Ok(Self {
            port: cli.port_override().or(file.port).unwrap_or(defaults.port),
            bind,
            tools_dir,
            socket_request_timeout: cli
                .socket_request_timeout
                .or(file.socket_request_timeout_secs)
                .map_or(defaults.socket_request_timeout, Duration::from_secs),
        })
    }
}
