//! Uses the single integration test approach.
//!
//! This improves parallelism when running the tests, and reduces the number of binaries that have to be built (and linked)

mod common;
mod http;

use std::{io::Read as _, process::Stdio};

use common::{KillOnDrop, empty_tools_dir, get_free_port, read_startup_line, server_command, spawn_server};

#[tokio::test]
async fn startup_line_reports_port() {
    let port = get_free_port();
    let tools = empty_tools_dir("startup");
    let mut server = spawn_server(port, &tools);

    let (line, mut rest) = read_startup_line(&mut server.0).await;
    assert_eq!(line, format!("coverageServer started on port {port}\n"));

    let resp = reqwest::get(format!("http://127.0.0.1:{port}/help"))
        .await
        .expect("server should accept requests after the startup line");
    assert!(resp.status().is_success(), "help should succeed");

    server.0.kill().expect("failed to kill server");
    server.0.wait().expect("failed to wait on server");
    let mut remaining = String::new();
    rest.read_to_string(&mut remaining).unwrap();
    assert_eq!(remaining, "", "only the startup line belongs on stdout");
}

#[tokio::test]
async fn default_port_is_8047() {
    let tools = empty_tools_dir("default_port");
    let child = server_command(&["--bind", "127.0.0.1", "--tools-dir", tools.to_str().unwrap()])
        .spawn()
        .expect("failed to start coverage_server");
    let mut server = KillOnDrop(child);

    let (line, _rest) = read_startup_line(&mut server.0).await;
    assert_eq!(line, "coverageServer started on port 8047\n");
}

#[test]
fn malformed_port_is_a_parse_error() {
    let output = server_command(&["--port", "not-a-port"])
        .stderr(Stdio::piped())
        .output()
        .expect("failed to run coverage_server");
    assert_eq!(output.status.code(), Some(2), "clap usage errors exit with 2");
    assert!(output.stdout.is_empty(), "nothing should be printed to stdout");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("--port"),
        "error should name the offending flag: {stderr}"
    );
}
