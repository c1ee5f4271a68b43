//! Runs registered tools: resolves the script, spawns it and exposes its output as a stream.

use std::{
    io,
    path::{Component, Path, PathBuf},
    process::{ExitStatus, Stdio},
};

use axum::body::Bytes;
use coverage_common::{RunRequest, ToolDescriptor};
use futures::{Stream, StreamExt as _, future, stream};
use tokio::{
    io::{AsyncBufReadExt as _, BufReader},
    process::{Child, ChildStderr, ChildStdout, Command},
};
use tokio_util::io::ReaderStream;
use tracing::{debug, info, warn};

#[cfg(unix)]
use nix::{
    errno::Errno,
    sys::signal::{self, Signal},
    unistd::Pid,
};

#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("unknown tool '{0}'")]
    UnknownTool(String),
    #[error("tool path '{0}' must stay inside the tools directory")]
    InvalidPath(String),
    #[error("failed to spawn '{}': {source}", path.display())]
    Spawn {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("tool process has no {0} pipe")]
    MissingPipe(&'static str),
}

/// Spawns tool scripts found below one directory.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    tools_dir: PathBuf,
}

impl Dispatcher {
    pub fn new(tools_dir: impl Into<PathBuf>) -> Self {
        Self {
            tools_dir: tools_dir.into(),
        }
    }

    pub fn tools_dir(&self) -> &Path {
        &self.tools_dir
    }

    /// Location of the script for `tool`.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::InvalidPath`] if the descriptor path is absolute or climbs out of the tools directory.
    pub fn script_path(&self, tool: &ToolDescriptor) -> Result<PathBuf, DispatchError> {
        let relative = Path::new(&tool.path);
        let contained = !tool.path.is_empty()
            && relative
                .components()
                .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
        if !contained {
            return Err(DispatchError::InvalidPath(tool.path.clone()));
        }
        Ok(self.tools_dir.join(relative))
    }

    /// Spawns `tool` with the arguments of `request`.
    ///
    /// The script runs in its own process group. The whole group is killed when the returned
    /// [`RunningTool`] (or the stream made from it) is dropped, so pipelines started by the
    /// script go down with it.
    ///
    /// # Errors
    ///
    /// Returns an error if the script path is invalid or the process cannot be spawned.
    pub fn spawn(&self, tool: &ToolDescriptor, request: &RunRequest) -> Result<RunningTool, DispatchError> {
        let path = self.script_path(tool)?;
        debug!(tool = %tool.name, path = %path.display(), cmd = %request.cmd, "Spawning tool");

        let mut command = Command::new(&path);
        command
            .args(request.args())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        #[cfg(unix)]
        command.process_group(0);

        let mut child = command.spawn().map_err(|source| DispatchError::Spawn {
            path: path.clone(),
            source,
        })?;
        let group = ProcessGroup::led_by(&child);

        let stdout = child.stdout.take().ok_or(DispatchError::MissingPipe("stdout"))?;
        if let Some(stderr) = child.stderr.take() {
            tokio::spawn(forward_stderr(tool.name.clone(), stderr));
        }

        Ok(RunningTool {
            name: tool.name.clone(),
            child,
            group,
            stdout,
        })
    }
}

/// Logs each line a tool writes to stderr.
async fn forward_stderr(tool: String, stderr: ChildStderr) {
    let mut lines = BufReader::new(stderr).lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => warn!(%tool, "{line}"),
            Ok(None) => break,
            Err(e) => {
                debug!(%tool, "Stopped reading stderr: {e}");
                break;
            }
        }
    }
}

/// Process group of a spawned tool, killed when dropped.
///
/// The group id equals the pid of the script, which stays reserved until every member is gone.
#[derive(Debug)]
struct ProcessGroup {
    id: Option<i32>,
}

impl ProcessGroup {
    fn led_by(child: &Child) -> Self {
        Self {
            id: child.id().and_then(|id| i32::try_from(id).ok()),
        }
    }

    /// Sends SIGKILL to every process in the group. Only the first call signals.
    #[cfg(unix)]
    fn kill(&mut self) {
        let Some(id) = self.id.take() else {
            return;
        };
        match signal::killpg(Pid::from_raw(id), Signal::SIGKILL) {
            Ok(()) => debug!(pgid = id, "Killed tool process group"),
            // everything already exited
            Err(Errno::ESRCH) => {}
            Err(e) => warn!(pgid = id, "Failed to kill tool process group: {e}"),
        }
    }

    #[cfg(not(unix))]
    fn kill(&mut self) {
        self.id = None;
    }
}

impl Drop for ProcessGroup {
    fn drop(&mut self) {
        self.kill();
    }
}

/// A spawned tool process with its standard output still unread.
#[derive(Debug)]
pub struct RunningTool {
    name: String,
    child: Child,
    group: ProcessGroup,
    stdout: ChildStdout,
}

impl RunningTool {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Splits into the output chunks and the process handle.
    pub fn into_parts(self) -> (ReaderStream<ChildStdout>, ToolProcess) {
        (
            ReaderStream::new(self.stdout),
            ToolProcess {
                name: self.name,
                child: self.child,
                group: self.group,
            },
        )
    }

    /// Standard output as a byte stream that reaps the process once output ends.
    pub fn into_stream(self) -> impl Stream<Item = io::Result<Bytes>> + Send + 'static {
        let (output, process) = self.into_parts();
        let reap = stream::once(async move {
            // Status is logged by `wait`; the stream only carries output.
            drop(process.wait().await);
            None::<io::Result<Bytes>>
        })
        .filter_map(future::ready);
        output.chain(reap)
    }
}

/// Handle on a tool process whose output is consumed elsewhere.
///
/// Dropping it kills whatever is left of the tool's process group.
#[derive(Debug)]
pub struct ToolProcess {
    name: String,
    child: Child,
    group: ProcessGroup,
}

impl ToolProcess {
    /// Waits for the process to exit and logs its status.
    ///
    /// # Errors
    ///
    /// Returns an error if waiting on the process fails.
    pub async fn wait(mut self) -> io::Result<ExitStatus> {
        match self.child.wait().await {
            Ok(status) => {
                if status.success() {
                    info!(tool = %self.name, %status, "Tool finished");
                } else {
                    warn!(tool = %self.name, %status, "Tool finished unsuccessfully");
                }
                Ok(status)
            }
            Err(e) => {
                warn!(tool = %self.name, "Failed to wait on tool: {e}");
                Err(e)
            }
        }
    }

    /// Kills the tool and everything it started, used when the client went away before the tool finished.
    pub async fn kill(mut self) {
        self.group.kill();
        if let Err(e) = self.child.kill().await {
            debug!(tool = %self.name, "Failed to kill tool: {e}");
        } else {
            info!(tool = %self.name, "Killed tool after client disconnect");
        }
    }
}
