mod error;
mod query;
mod repository;
mod schema;
mod store;
mod trait_def;

pub use error::SongStoreError;
pub use repository::SongRepository;
pub use schema::SONG_VERSIONED_SCHEMAS;
pub use store::SqliteSongStore;
pub use trait_def::SongStore;

#[cfg(any(test, feature = "mock"))]
pub use trait_def::MockSongStore;
