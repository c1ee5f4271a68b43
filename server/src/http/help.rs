use axum::{
    Json, Router,
    extract::{Path, State},
    routing::get,
};
use coverage_common::ToolDescriptor;

use crate::{dispatch::DispatchError, state::AppState};

pub(crate) fn routes() -> Router<AppState> {
    Router::new()
        .route("/help", get(list_tools))
        .route("/help/{tool}", get(describe_tool))
}

/// Lists every registered tool descriptor.
async fn list_tools(State(state): State<AppState>) -> Json<Vec<ToolDescriptor>> {
    Json(
        state
            .registry
            .list()
            .iter()
            .map(|tool| ToolDescriptor::clone(tool))
            .collect(),
    )
}

async fn describe_tool(
    Path(tool): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<ToolDescriptor>, DispatchError> {
    state
        .registry
        .get(&tool)
        .map(|descriptor| Json(ToolDescriptor::clone(&descriptor)))
        .ok_or(DispatchError::UnknownTool(tool))
}
