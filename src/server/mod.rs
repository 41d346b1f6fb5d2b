pub mod config;
mod error;
mod http_layers;
#[allow(clippy::module_inception)]
pub mod server;
mod song_routes;
pub mod state;

pub use config::ServerConfig;
pub use error::ApiError;
pub use http_layers::*;
pub use server::{make_app, run_server, serve};
pub use state::ServerState;
