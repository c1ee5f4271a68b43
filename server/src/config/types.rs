//! Configuration data types for the coverage server.

use std::path::{Component, Path, PathBuf};

use serde::Deserialize;

/// Root of the optional TOML configuration file.
#[derive(Debug, Deserialize, Default, Clone, PartialEq, Eq)]
pub struct CoverageConfig {
    #[serde(default)]
    pub server: ServerConfig,
}

/// HTTP server binding configuration section.
///
/// Every field is optional so command-line values and built-in defaults can fill the gaps.
#[derive(Debug, Deserialize, Default, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// TCP port shared by HTTP and the binary socket.
    pub port: Option<u16>,
    /// Bind address for the HTTP listener.
    pub bind: Option<String>,
    /// Directory the tool scripts live in. Relative paths are resolved against the config file.
    pub tools_dir: Option<String>,
    /// Seconds a socket client may take to send its run request.
    pub socket_request_timeout_secs: Option<u64>,
}

/// Resolves a path to an absolute one.
///
/// If the path is absolute, returns it as-is. If relative, joins it with the
/// config file's parent directory and normalizes the result to remove redundant
/// components like `./`.
pub fn resolve_config_relative_paths(config_path: &Path, relative_path: &str) -> PathBuf {
    let path = Path::new(relative_path);
    let resolved = if path.is_absolute() {
        path.to_path_buf()
    } else {
        config_path
            .parent()
            .map_or_else(|| path.to_path_buf(), |d| d.join(path))
    };

    // We can't use canonicalize() because the directory might not exist yet
    normalize_path(&resolved)
}

fn normalize_path(path: &Path) -> PathBuf {
    let mut result = PathBuf::new();
    for component in path.components() {
        use Component as C;
        match component {
            C::Normal(c) => {
                result.push(c);
            }
            C::ParentDir => {
                result.pop();
            }
            C::CurDir => {}
            C::RootDir | C::Prefix(_) => {
                result.push(component);
            }
        }
    }
    result
}
