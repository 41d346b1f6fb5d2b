use crate::metadata::MetadataError;
use crate::song_store::SongStoreError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::{error, warn};

/// Failures of the song API, each rendered as a plain text response.
///
/// The display text is the response body.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("bad Content-Type")]
    BadContentType,

    #[error("cant read body request")]
    UnreadableBody,

    #[error("cant decode body")]
    UndecodableBody,

    #[error("field of struct payload empty")]
    EmptyField,

    #[error("error parse value of query param")]
    InvalidParam,

    #[error("nothing to update")]
    NothingToUpdate,

    #[error("song by id not found")]
    SongNotFound,

    #[error("songs not found")]
    SongsNotFound,

    #[error("Error amount of verses")]
    VersePageOutOfRange,

    #[error("song exist")]
    SongExists,

    #[error("error from external service")]
    ExternalService(#[source] MetadataError),

    #[error("internal error")]
    Internal(#[source] SongStoreError),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadContentType
            | ApiError::UnreadableBody
            | ApiError::UndecodableBody
            | ApiError::EmptyField
            | ApiError::InvalidParam
            | ApiError::NothingToUpdate => StatusCode::BAD_REQUEST,
            ApiError::SongNotFound | ApiError::SongsNotFound | ApiError::VersePageOutOfRange => {
                StatusCode::NOT_FOUND
            }
            ApiError::SongExists => StatusCode::CONFLICT,
            ApiError::ExternalService(_) => StatusCode::BAD_GATEWAY,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<SongStoreError> for ApiError {
    fn from(err: SongStoreError) -> Self {
        match err {
            SongStoreError::AlreadyExists => ApiError::SongExists,
            SongStoreError::NotFound(_) => ApiError::SongNotFound,
            SongStoreError::ListEmpty => ApiError::SongsNotFound,
            SongStoreError::NothingToUpdate => ApiError::NothingToUpdate,
            err => ApiError::Internal(err),
        }
    }
}

impl From<MetadataError> for ApiError {
    fn from(err: MetadataError) -> Self {
        ApiError::ExternalService(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        match &self {
            ApiError::ExternalService(source) => {
                error!("Metadata service failure: {}", source)
            }
            ApiError::Internal(source) => error!("Song store failure: {}", source),
            other => warn!("Rejected request: {}", other),
        }
        (status, self.to_string()).into_response()
    }
}
