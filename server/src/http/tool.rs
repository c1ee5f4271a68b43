use axum::{
    Router,
    body::Body,
    extract::{Path, Query, State},
    http::header,
    response::{IntoResponse as _, Response},
    routing::get,
};
use coverage_common::RunRequest;
use tracing::info;

use crate::{dispatch::DispatchError, state::AppState};

pub(crate) fn routes() -> Router<AppState> {
    Router::new().route("/{tool}", get(run_tool))
}

/// Runs a tool and streams its standard output as the response body.
///
/// The process is killed if the client drops the response before the tool finishes.
async fn run_tool(
    Path(tool): Path<String>,
    Query(request): Query<RunRequest>,
    State(state): State<AppState>,
) -> Result<Response, DispatchError> {
    let descriptor = state
        .registry
        .get(&tool)
        .ok_or(DispatchError::UnknownTool(tool))?;
    let running = state.dispatcher.spawn(&descriptor, &request)?;
    info!(tool = %descriptor.name, cmd = %request.cmd, "Streaming tool output over HTTP");

    Ok((
        [(header::CONTENT_TYPE, "application/octet-stream")],
        Body::from_stream(running.into_stream()),
    )
        .into_response())
}
