use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::any::Any;
use tracing::error;

/// Turns a panic inside a handler into a plain 500 response.
pub fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let details = if let Some(s) = err.downcast_ref::<String>() {
        s.as_str()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s
    } else {
        "unknown panic payload"
    };
    error!("Recovered from panic: {}", details);

    (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
}
