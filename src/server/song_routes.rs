//! Song CRUD routes, nested under `/api`.

use axum::{
    body::Bytes,
    extract::{
        rejection::{BytesRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    http::{header, HeaderMap, StatusCode},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use tracing::info;

use super::error::ApiError;
use super::state::{GuardedMetadataClient, ServerState};
use crate::song::{
    paginate_verses, split_verses, NewSong, PayloadSong, Song, SongFilter, SongForUpdate,
};
use crate::song_store::SongRepository;

const APPLICATION_JSON: &str = "application/json";
const DEFAULT_SONGS_PAGE_SIZE: usize = 10;
const DEFAULT_VERSES_PAGE_SIZE: usize = 2;

#[derive(Deserialize, Debug, Default)]
#[serde(default)]
struct ListSongsParams {
    name: String,
    group: String,
    date: String,
    text: String,
    link: String,
    page: Option<String>,
    limit: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(default)]
struct PageParams {
    page: Option<String>,
    limit: Option<String>,
}

/// Parses an optional page or limit parameter, which must be an integer >= 1.
fn parse_page_param(value: Option<&str>, default: usize) -> Result<usize, ApiError> {
    match value {
        None => Ok(default),
        Some(raw) => match raw.parse::<usize>() {
            Ok(n) if n >= 1 => Ok(n),
            _ => Err(ApiError::InvalidParam),
        },
    }
}

fn parse_song_id(id: Result<Path<i64>, PathRejection>) -> Result<i64, ApiError> {
    id.map(|Path(id)| id).map_err(|_| ApiError::InvalidParam)
}

/// Media type must be `application/json`; parameters such as charset are
/// ignored.
fn has_json_content_type(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(';').next())
        .map(|media_type| media_type.trim().eq_ignore_ascii_case(APPLICATION_JSON))
        .unwrap_or(false)
}

async fn create_song(
    State(songs): State<SongRepository>,
    State(metadata_client): State<GuardedMetadataClient>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Result<(StatusCode, Json<Song>), ApiError> {
    if !has_json_content_type(&headers) {
        return Err(ApiError::BadContentType);
    }
    let body = body.map_err(|_| ApiError::UnreadableBody)?;
    let payload: PayloadSong =
        serde_json::from_slice(&body).map_err(|_| ApiError::UndecodableBody)?;
    if payload.has_empty_fields() {
        return Err(ApiError::EmptyField);
    }

    let info = metadata_client
        .fetch_song_info(&payload.song, &payload.group)
        .await?;

    let song = songs
        .add_song(NewSong::from_enrichment(payload, info))
        .await?;
    info!("Created song {} ({})", song.song_id, song.song);

    Ok((StatusCode::CREATED, Json(song)))
}

async fn list_songs(
    State(songs): State<SongRepository>,
    params: Result<Query<ListSongsParams>, QueryRejection>,
) -> Result<Json<Vec<Song>>, ApiError> {
    let Query(params) = params.map_err(|_| ApiError::InvalidParam)?;
    let page = parse_page_param(params.page.as_deref(), 1)?;
    let limit = parse_page_param(params.limit.as_deref(), DEFAULT_SONGS_PAGE_SIZE)?;
    let offset = (page - 1).saturating_mul(limit);

    let filter = SongFilter {
        name: params.name,
        group: params.group,
        date: params.date,
        text: params.text,
        link: params.link,
    };

    let found = songs.get_songs(filter, limit, offset).await?;
    Ok(Json(found))
}

async fn get_song_text(
    State(songs): State<SongRepository>,
    id: Result<Path<i64>, PathRejection>,
    params: Result<Query<PageParams>, QueryRejection>,
) -> Result<Json<Vec<String>>, ApiError> {
    let id = parse_song_id(id)?;
    let Query(params) = params.map_err(|_| ApiError::InvalidParam)?;
    let page = parse_page_param(params.page.as_deref(), 1)?;
    let limit = parse_page_param(params.limit.as_deref(), DEFAULT_VERSES_PAGE_SIZE)?;

    let text = songs.get_song_text(id).await?;
    let verses = split_verses(&text);
    let page_verses =
        paginate_verses(&verses, page, limit).ok_or(ApiError::VersePageOutOfRange)?;

    Ok(Json(page_verses.to_vec()))
}

async fn update_song(
    State(songs): State<SongRepository>,
    id: Result<Path<i64>, PathRejection>,
    body: Result<Bytes, BytesRejection>,
) -> Result<(StatusCode, String), ApiError> {
    let id = parse_song_id(id)?;
    let body = body.map_err(|_| ApiError::UnreadableBody)?;
    let update: SongForUpdate =
        serde_json::from_slice(&body).map_err(|_| ApiError::UndecodableBody)?;
    if update.is_empty() {
        return Err(ApiError::NothingToUpdate);
    }

    let id = songs.update_song(id, update).await?;
    info!("Updated song {}", id);
    Ok((
        StatusCode::OK,
        format!("update song by id success, id: {}", id),
    ))
}

async fn delete_song(
    State(songs): State<SongRepository>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<(StatusCode, String), ApiError> {
    let id = parse_song_id(id)?;
    let id = songs.delete_song(id).await?;
    info!("Deleted song {}", id);
    Ok((
        StatusCode::OK,
        format!("delete song by id success, id: {}", id),
    ))
}

pub fn make_song_routes(state: ServerState) -> Router {
    Router::new()
        .route("/songs", get(list_songs).post(create_song))
        .route(
            "/song/{id}",
            get(get_song_text).put(update_song).delete(delete_song),
        )
        .with_state(state)
}
