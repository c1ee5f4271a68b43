use core::time::Duration;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
    middleware as ax_middleware,
    routing::{self, IntoMakeService, any},
};
use tower::ServiceBuilder;
use tower_http::{
    ServiceBuilderExt as _, catch_panic::CatchPanicLayer, request_id::MakeRequestUuid,
    timeout::TimeoutLayer, trace::TraceLayer,
};

use crate::{
    http::{
        help,
        middleware::{handle_panic, response_headers_middleware},
        tool,
    },
    state::AppState,
    websocket,
};

/// Creates the dispatch router.
///
/// `/help` describes the registered tools, `/ws/{tool}` is the binary socket
/// and `/{tool}` runs a tool over plain HTTP. All of them share one listener.
pub(crate) fn create_app_router() -> Router<AppState> {
    Router::new()
        .merge(help::routes())
        .route("/ws/{tool}", any(websocket::ws_handler))
        .merge(tool::routes())
}

/// Wraps a router in the shared middleware stack and the not-found fallback.
pub(crate) fn with_middleware(router: Router) -> Router {
    let middleware_stack = ServiceBuilder::new()
        .set_x_request_id(MakeRequestUuid)
        .propagate_x_request_id()
        .layer(TraceLayer::new_for_http())
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(30),
        ))
        .layer(ax_middleware::from_fn(response_headers_middleware));

    router
        .fallback(routing::any(|req: Request<Body>| async move {
            tracing::warn!(method = %req.method(), uri = %req.uri(), "Unhandled request");
            StatusCode::NOT_FOUND
        }))
        .layer(middleware_stack)
}

pub fn create_app(app_state: AppState) -> IntoMakeService<Router<()>> {
    with_middleware(create_app_router().with_state(app_state)).into_make_service()
}
