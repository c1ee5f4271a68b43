//! HTTP surface of the dispatcher: help, tool runs, the binary socket route and shared middleware.

mod help;
pub mod middleware;
pub mod router;
mod tool;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::{error, warn};

use crate::dispatch::DispatchError;

impl IntoResponse for DispatchError {
    fn into_response(self) -> Response {
        use DispatchError as DE;

        let status = match self {
            DE::UnknownTool(ref name) => {
                warn!(tool = %name, "Request for unknown tool");
                StatusCode::NOT_FOUND
            }
            DE::InvalidPath(_) | DE::Spawn { .. } | DE::MissingPipe(_) => {
                error!("Failed to dispatch tool: {self}");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        (status, self.to_string()).into_response()
    }
}
