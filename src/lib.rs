//! Song Library Server Library
//!
//! This library exposes the internal modules for testing and potential reuse.

pub mod config;
pub mod metadata;
pub mod server;
pub mod song;
pub mod song_store;
pub mod sqlite_persistence;

// Re-export commonly used types for convenience
pub use server::{run_server, RequestsLoggingLevel};
pub use song_store::{SongRepository, SongStore, SqliteSongStore};
