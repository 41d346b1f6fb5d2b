//! SongStore trait definition.

use super::SongStoreError;
use crate::song::{NewSong, Song, SongFilter, SongForUpdate};
use std::time::Instant;

/// Trait for song storage backends.
///
/// Every method is blocking; async callers go through `SongRepository`.
/// Once `deadline` has passed an operation must fail with
/// `SongStoreError::Timeout` and leave the database untouched, including
/// when the deadline expires while waiting for a connection.
#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
pub trait SongStore: Send + Sync {
    /// Insert a song unless one with the same name and group already exists.
    fn add_song(&self, song: &NewSong, deadline: Instant) -> Result<Song, SongStoreError>;

    /// List songs matching `filter`, ordered by id.
    ///
    /// An empty page is reported as `SongStoreError::ListEmpty`.
    fn get_songs(
        &self,
        filter: &SongFilter,
        limit: usize,
        offset: usize,
        deadline: Instant,
    ) -> Result<Vec<Song>, SongStoreError>;

    /// Delete a song, returning its id.
    fn delete_song(&self, id: i64, deadline: Instant) -> Result<i64, SongStoreError>;

    /// Get the full lyrics of a song.
    fn get_song_text(&self, id: i64, deadline: Instant) -> Result<String, SongStoreError>;

    /// Apply a partial update, returning the song id.
    fn update_song(
        &self,
        id: i64,
        update: &SongForUpdate,
        deadline: Instant,
    ) -> Result<i64, SongStoreError>;
}
