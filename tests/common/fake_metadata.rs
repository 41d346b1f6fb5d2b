//! In-process stand-in for the external song metadata service.

use super::constants::*;
use axum::{
    extract::Query,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;

#[derive(Deserialize)]
struct InfoParams {
    song: String,
    group: String,
}

fn known_song(song: &str, group: &str) -> Option<(&'static str, &'static str, &'static str)> {
    match (song, group) {
        (SONG_1_NAME, SONG_1_GROUP) => Some((SONG_1_RELEASE_DATE, SONG_1_TEXT, SONG_1_LINK)),
        (SONG_2_NAME, SONG_2_GROUP) => Some((SONG_2_RELEASE_DATE, SONG_2_TEXT, SONG_2_LINK)),
        (SONG_3_NAME, SONG_3_GROUP) => Some((SONG_3_RELEASE_DATE, SONG_3_TEXT, SONG_3_LINK)),
        _ => None,
    }
}

async fn info(Query(params): Query<InfoParams>) -> Response {
    if params.song == BROKEN_SONG_NAME {
        return (StatusCode::INTERNAL_SERVER_ERROR, "metadata backend down").into_response();
    }

    match known_song(&params.song, &params.group) {
        Some((release_date, text, link)) => Json(json!({
            "releaseDate": release_date,
            "text": text,
            "link": link,
        }))
        .into_response(),
        // Unknown songs still get a record, without lyrics.
        None => Json(json!({
            "releaseDate": "",
            "text": "",
            "link": format!("https://example.com/{}", params.song),
        }))
        .into_response(),
    }
}

pub fn make_fake_metadata_app() -> Router {
    Router::new().route("/info", get(info))
}
