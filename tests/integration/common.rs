//! Common utilities for integration tests.
//!
//! Spawning the server, managing ports, and preparing tool scripts.

use std::{
    io::{BufRead as _, BufReader},
    net::TcpListener,
    path::{Path, PathBuf},
    process::{Child, ChildStdout, Command, Stdio},
    time::Duration,
};

pub fn get_free_port() -> u16 {
    TcpListener::bind("127.0.0.1:0")
        .expect("failed to bind to address")
        .local_addr()
        .unwrap()
        .port()
}

/// Guard that kills and waits on a child process when dropped.
pub struct KillOnDrop(pub Child);

impl Drop for KillOnDrop {
    fn drop(&mut self) {
        drop(self.0.kill());
        drop(self.0.wait());
    }
}

fn get_server_bin() -> &'static str {
    env!("CARGO_BIN_EXE_coverage_server")
}

pub fn get_reducer_bin() -> &'static str {
    env!("CARGO_BIN_EXE_get_coverage")
}

/// Command for the server binary with logging quieted down.
pub fn server_command(args: &[&str]) -> Command {
    let mut cmd = Command::new(get_server_bin());
    cmd.args(args)
        .env("RUST_LOG", "error")
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null());
    cmd
}

/// Spawn the server on `127.0.0.1:port` serving tools from `tools_dir`.
pub fn spawn_server(port: u16, tools_dir: &Path) -> KillOnDrop {
    spawn_server_with_args(port, tools_dir, &[])
}

/// Like [`spawn_server`], with additional command-line arguments.
pub fn spawn_server_with_args(port: u16, tools_dir: &Path, extra: &[&str]) -> KillOnDrop {
    let port = port.to_string();
    let mut args = vec![
        "--bind",
        "127.0.0.1",
        "--port",
        &port,
        "--tools-dir",
        tools_dir.to_str().unwrap(),
    ];
    args.extend_from_slice(extra);
    let child = server_command(&args)
        .spawn()
        .expect("failed to start coverage_server");
    KillOnDrop(child)
}

/// Spawn the server and wait until it reported its startup line.
pub async fn spawn_ready_server(port: u16, tools_dir: &Path) -> KillOnDrop {
    spawn_ready_server_with_args(port, tools_dir, &[]).await
}

/// Like [`spawn_ready_server`], with additional command-line arguments.
pub async fn spawn_ready_server_with_args(port: u16, tools_dir: &Path, extra: &[&str]) -> KillOnDrop {
    let mut server = spawn_server_with_args(port, tools_dir, extra);
    let (line, _rest) = read_startup_line(&mut server.0).await;
    assert_eq!(line, format!("coverageServer started on port {port}\n"));
    server
}

/// Reads the first stdout line of the server, returning it with the reader for the rest.
pub async fn read_startup_line(child: &mut Child) -> (String, BufReader<ChildStdout>) {
    let stdout = child.stdout.take().expect("stdout should be piped");
    let reader = tokio::task::spawn_blocking(move || {
        let mut reader = BufReader::new(stdout);
        let mut line = String::new();
        reader.read_line(&mut line).expect("failed to read stdout");
        (line, reader)
    });
    tokio::time::timeout(Duration::from_secs(10), reader)
        .await
        .expect("server did not print its startup line within timeout")
        .expect("stdout reader panicked")
}

/// Creates a tools directory holding an executable `coverage.sh` with `script` as its body.
#[cfg(unix)]
pub fn tools_dir(name: &str, script: &str) -> PathBuf {
    use std::{fs, os::unix::fs::PermissionsExt as _};

    let dir = empty_tools_dir(name);
    let path = dir.join("coverage.sh");
    fs::write(&path, script).expect("failed to write script");
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).expect("failed to chmod script");
    dir
}

/// A fresh tools directory without any scripts.
pub fn empty_tools_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("coverage_it_{name}_{}", std::process::id()));
    std::fs::create_dir_all(&dir).expect("failed to create tools dir");
    dir
}

/// Tool script that starts a background child, records both pids in `pid_file` and keeps printing.
#[cfg(target_os = "linux")]
pub fn long_running_script(pid_file: &Path) -> String {
    format!(
        "#!/bin/sh\nsleep 37 &\necho \"$$ $!\" > '{}'\nwhile :; do echo working; sleep 0.1; done\n",
        pid_file.display()
    )
}

/// Pids written by [`long_running_script`], waiting for the file to appear.
#[cfg(target_os = "linux")]
pub async fn read_pids(pid_file: &Path) -> Vec<u32> {
    for _ in 0..100 {
        if let Ok(content) = std::fs::read_to_string(pid_file) {
            let pids: Vec<u32> = content
                .split_ascii_whitespace()
                .map(|pid| pid.parse().expect("pid file holds numbers"))
                .collect();
            if pids.len() == 2 {
                return pids;
            }
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    panic!("script did not record its pids in {}", pid_file.display());
}

/// Whether `pid` is alive. Zombies count as exited.
#[cfg(target_os = "linux")]
pub fn is_running(pid: u32) -> bool {
    std::fs::read_to_string(format!("/proc/{pid}/stat")).is_ok_and(|stat| {
        let state = stat
            .rsplit_once(')')
            .and_then(|(_, rest)| rest.trim_start().chars().next());
        !matches!(state, None | Some('Z' | 'X'))
    })
}

/// Waits up to ten seconds for every pid to exit.
#[cfg(target_os = "linux")]
pub async fn assert_exited(pids: &[u32]) {
    for _ in 0..200 {
        if !pids.iter().copied().any(is_running) {
            return;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    let alive: Vec<_> = pids.iter().copied().filter(|&pid| is_running(pid)).collect();
    panic!("tool processes still running: {alive:?}");
}
