//! Binary socket: runs a tool per WebSocket connection and streams its output as binary frames.

use alloc::sync::Arc;
use core::time::Duration;
use std::io;

use axum::{
    extract::{
        Path, State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::{IntoResponse as _, Response},
};
use coverage_common::{RunRequest, SocketMessage, ToolDescriptor};
use futures::StreamExt as _;
use tracing::{Instrument as _, debug, info, info_span, warn};

use crate::{
    dispatch::{DispatchError, Dispatcher},
    state::AppState,
};

#[derive(Debug, thiserror::Error)]
enum SessionError {
    #[error("client closed the socket")]
    Closed,
    #[error("no run request received within {}s", .0.as_secs())]
    RequestTimeout(Duration),
    #[error("invalid run request: {0}")]
    Request(#[from] serde_json::Error),
    #[error(transparent)]
    Dispatch(#[from] DispatchError),
    #[error("socket error: {0}")]
    Socket(#[from] axum::Error),
    #[error("reading tool output failed: {0}")]
    Output(#[from] io::Error),
}

/// Gets called for every socket client of `/ws/{tool}` and spins up a session.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Path(tool): Path<String>,
    State(AppState {
        registry,
        dispatcher,
        socket_request_timeout,
    }): State<AppState>,
) -> Response {
    let Some(descriptor) = registry.get(&tool) else {
        return DispatchError::UnknownTool(tool).into_response();
    };
    ws.on_failed_upgrade(|e| warn!("WebSocket upgrade failed: {e}"))
        .on_upgrade(move |socket| serve_socket(socket, descriptor, dispatcher, socket_request_timeout))
}

async fn send_message(socket: &mut WebSocket, msg: &SocketMessage) -> Result<(), SessionError> {
    let json = serde_json::to_string(msg)?;
    socket.send(Message::Text(json.into())).await?;
    Ok(())
}

/// One session per client. Errors end the session, never the server.
async fn serve_socket(
    mut socket: WebSocket,
    tool: Arc<ToolDescriptor>,
    dispatcher: Arc<Dispatcher>,
    request_timeout: Duration,
) {
    let span = info_span!("socket", tool = %tool.name);
    async move {
        match run_session(&mut socket, &tool, &dispatcher, request_timeout).await {
            Ok(()) => {}
            Err(SessionError::Closed) => {
                info!("WebSocket connection closed by client");
                return;
            }
            Err(e) => {
                warn!("Socket session failed: {e}");
                let msg = SocketMessage::Error {
                    message: e.to_string(),
                };
                if let Err(send_err) = send_message(&mut socket, &msg).await {
                    debug!("Could not report failure to client: {send_err}");
                }
            }
        }
        if let Err(e) = socket.send(Message::Close(None)).await {
            debug!("Failed to close socket: {e}");
        }
    }
    .instrument(span)
    .await;
}

/// Waits for the client's run request. Control frames before it are ignored.
async fn receive_request(socket: &mut WebSocket) -> Result<RunRequest, SessionError> {
    while let Some(msg) = socket.recv().await {
        match msg? {
            Message::Text(text) => return Ok(serde_json::from_str(text.as_str())?),
            Message::Binary(data) => return Ok(serde_json::from_slice(&data)?),
            Message::Close(_) => return Err(SessionError::Closed),
            Message::Ping(_) | Message::Pong(_) => {}
        }
    }
    Err(SessionError::Closed)
}

async fn run_session(
    socket: &mut WebSocket,
    tool: &ToolDescriptor,
    dispatcher: &Dispatcher,
    request_timeout: Duration,
) -> Result<(), SessionError> {
    let request = tokio::time::timeout(request_timeout, receive_request(socket))
        .await
        .map_err(|_elapsed| SessionError::RequestTimeout(request_timeout))??;
    let running = dispatcher.spawn(tool, &request)?;
    info!(cmd = %request.cmd, "Streaming tool output over socket");
    send_message(
        socket,
        &SocketMessage::Started {
            tool: tool.name.clone(),
        },
    )
    .await?;

    let (mut output, process) = running.into_parts();
    loop {
        tokio::select! {
            chunk = output.next() => match chunk {
                Some(chunk) => socket.send(Message::Binary(chunk?)).await?,
                None => break,
            },
            incoming = socket.recv() => match incoming {
                None | Some(Ok(Message::Close(_))) => {
                    process.kill().await;
                    return Err(SessionError::Closed);
                }
                Some(Err(e)) => return Err(e.into()),
                // the request was already read, further frames carry nothing
                Some(Ok(_)) => {}
            },
        }
    }

    let status = process.wait().await?;
    send_message(socket, &SocketMessage::Exit { code: status.code() }).await
}
