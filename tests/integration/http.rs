//! Integration tests for the HTTP side of the dispatcher

use coverage_common::ToolDescriptor;

use crate::common::{empty_tools_dir, get_free_port, spawn_ready_server};

#[tokio::test]
async fn help_lists_the_coverage_descriptor() {
    let port = get_free_port();
    let tools = empty_tools_dir("help");
    let _server = spawn_ready_server(port, &tools).await;

    let resp = reqwest::get(format!("http://127.0.0.1:{port}/help"))
        .await
        .unwrap();
    assert!(resp.status().is_success(), "help should succeed");
    let json: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(
        json,
        serde_json::json!([{
            "apiVersion": "0.1",
            "name": "coverage",
            "path": "coverage.sh",
            "description": "coverage service",
            "exampleUrl": "",
        }])
    );
}

#[tokio::test]
async fn descriptor_does_not_depend_on_arguments() {
    let port = get_free_port();
    let tools = empty_tools_dir("descriptor_args");
    let _server = spawn_ready_server(port, &tools).await;

    let tool: ToolDescriptor = reqwest::get(format!("http://127.0.0.1:{port}/help/coverage"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(tool, ToolDescriptor::coverage());
}

#[tokio::test]
async fn failed_requests_do_not_stop_the_server() {
    let port = get_free_port();
    let tools = empty_tools_dir("fault_tolerance");
    let mut server = spawn_ready_server(port, &tools).await;
    let base = format!("http://127.0.0.1:{port}");

    // unknown tool
    let resp = reqwest::get(format!("{base}/samtools")).await.unwrap();
    assert_eq!(resp.status().as_u16(), 404);

    // registered tool whose script is missing
    let resp = reqwest::get(format!("{base}/coverage?cmd=1000")).await.unwrap();
    assert_eq!(resp.status().as_u16(), 500);

    // websocket route hit without an upgrade
    let resp = reqwest::get(format!("{base}/ws/coverage")).await.unwrap();
    assert!(resp.status().is_client_error(), "plain GET on socket route must be rejected");

    assert!(
        server.0.try_wait().unwrap().is_none(),
        "server exited after failed requests"
    );
    let resp = reqwest::get(format!("{base}/help")).await.unwrap();
    assert!(resp.status().is_success(), "server should keep serving");
}

#[cfg(unix)]
#[tokio::test]
async fn tool_output_is_streamed_over_http() {
    let port = get_free_port();
    let tools = crate::common::tools_dir(
        "http_stream",
        "#!/bin/sh\necho \"#specific_points\"\necho \"max=$1 region=$2\"\n",
    );
    let _server = spawn_ready_server(port, &tools).await;

    let resp = reqwest::get(format!(
        "http://127.0.0.1:{port}/coverage?cmd=1000%2013:130000:150000"
    ))
    .await
    .unwrap();
    assert!(resp.status().is_success(), "tool run should succeed");
    assert_eq!(
        resp.headers()["content-type"],
        "application/octet-stream"
    );
    assert_eq!(
        resp.text().await.unwrap(),
        "#specific_points\nmax=1000 region=13:130000:150000\n"
    );
}

#[cfg(target_os = "linux")]
#[tokio::test]
async fn dropping_the_response_terminates_the_tool() {
    use crate::common::{assert_exited, long_running_script, read_pids, tools_dir};

    let port = get_free_port();
    let pid_file = std::env::temp_dir().join(format!("coverage_it_http_drop_{}.pids", std::process::id()));
    let tools = tools_dir("http_drop", &long_running_script(&pid_file));
    let _server = spawn_ready_server(port, &tools).await;

    let mut resp = reqwest::get(format!("http://127.0.0.1:{port}/coverage"))
        .await
        .unwrap();
    assert!(resp.status().is_success(), "tool run should succeed");
    let first = resp.chunk().await.unwrap().expect("tool output");
    assert!(first.starts_with(b"working"), "unexpected output: {first:?}");

    let pids = read_pids(&pid_file).await;
    drop(resp);

    assert_exited(&pids).await;
}
