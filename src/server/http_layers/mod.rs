mod panic_guard;
mod request_span;
mod requests_logging;

pub use panic_guard::handle_panic;
pub use request_span::instrument_request;
pub use requests_logging::{log_requests, RequestsLoggingLevel};
