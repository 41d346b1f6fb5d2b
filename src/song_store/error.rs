use rusqlite::ErrorCode;
use thiserror::Error;

/// Errors returned by song store operations.
#[derive(Debug, Error)]
pub enum SongStoreError {
    #[error("song with this name and group already exists")]
    AlreadyExists,

    #[error("song {0} does not exist")]
    NotFound(i64),

    #[error("list of songs is empty")]
    ListEmpty,

    #[error("no fields to update")]
    NothingToUpdate,

    #[error("store operation timed out")]
    Timeout,

    #[error("database error: {0}")]
    Database(#[source] rusqlite::Error),

    #[error("store task failed: {0}")]
    Task(String),
}

impl From<rusqlite::Error> for SongStoreError {
    fn from(err: rusqlite::Error) -> Self {
        // Statements aborted by the deadline progress handler surface as
        // SQLITE_INTERRUPT.
        match err.sqlite_error_code() {
            Some(ErrorCode::OperationInterrupted) => SongStoreError::Timeout,
            _ => SongStoreError::Database(err),
        }
    }
}
