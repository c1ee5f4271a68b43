//! Messages spoken over the binary socket.
//!
//! A client opens `/ws/{tool}` and sends one [`RunRequest`] as a text frame.
//! The server answers with [`SocketMessage::Started`], then the tool's standard
//! output as binary frames, then [`SocketMessage::Exit`]. Failures are reported
//! with [`SocketMessage::Error`] before the socket is closed.

use serde::{Deserialize, Serialize};

/// A request to run a registered tool.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunRequest {
    /// Argument string handed to the tool, split on whitespace.
    #[serde(default)]
    pub cmd: String,
}

impl RunRequest {
    /// Arguments for the tool process.
    pub fn args(&self) -> impl Iterator<Item = &str> {
        self.cmd.split_ascii_whitespace()
    }
}

/// Control messages sent from the server as JSON text frames.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum SocketMessage {
    /// The tool process was spawned; binary frames with its output follow.
    Started { tool: String },
    /// The tool process finished. `code` is `None` when it was killed by a signal.
    Exit { code: Option<i32> },
    /// The request failed, the server closes the socket after this.
    Error { message: String },
}
