//! Per-request tracing span carrying the request id.

use axum::{body::Body, http::Request, middleware::Next, response::Response};
use tower_http::request_id::RequestId;
use tracing::{info_span, Instrument};

/// Wraps the rest of the request in an `http_request` span.
///
/// Expects `SetRequestIdLayer` to run first; requests without an id are
/// logged with `-`.
pub async fn instrument_request(request: Request<Body>, next: Next) -> Response {
    let request_id = request
        .extensions()
        .get::<RequestId>()
        .and_then(|id| id.header_value().to_str().ok())
        .unwrap_or("-")
        .to_owned();

    let span = info_span!(
        "http_request",
        request_id = %request_id,
        method = %request.method(),
        path = %request.uri().path(),
    );

    next.run(request).instrument(span).await
}
