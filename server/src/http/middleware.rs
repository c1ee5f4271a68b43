use core::any::Any;

use axum::{
    body::Body,
    http::{HeaderName, HeaderValue, Request, StatusCode, header},
    middleware::Next,
    response::{IntoResponse as _, Response},
};

/// Middleware setting headers that apply to every response.
///
/// Tool output is generated per request and must neither be sniffed into an
/// executable type nor cached by intermediaries.
pub(crate) async fn response_headers_middleware(req: Request<Body>, next: Next) -> Response {
    let mut response = next.run(req).await;
    response.headers_mut().insert(
        HeaderName::from_static("x-content-type-options"),
        HeaderValue::from_static("nosniff"),
    );
    response
        .headers_mut()
        .insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
    response
}

/// Turns a panic inside a handler into a 500 so the connection, and the process, carry on.
///
/// The panic itself is already logged by the process panic hook, so the payload is only dropped here.
pub(crate) fn handle_panic(_payload: Box<dyn Any + Send + 'static>) -> Response {
    (StatusCode::INTERNAL_SERVER_ERROR, "internal error").into_response()
}

/// Best-effort text of a panic payload.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("<non-string panic payload>")
}
