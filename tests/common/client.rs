//! HTTP client for end-to-end tests
//!
//! This module provides a high-level HTTP client that wraps reqwest
//! and provides methods for all song library endpoints.
//!
//! When API routes or request formats change, update only this file.

#![allow(dead_code)]

use super::constants::*;
use reqwest::Response;
use serde_json::{json, Value};
use std::time::Duration;

/// HTTP test client
pub struct TestClient {
    /// The underlying reqwest client (public for custom requests in tests)
    pub client: reqwest::Client,
    /// The base URL of the test server
    pub base_url: String,
}

impl TestClient {
    pub fn new(base_url: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .expect("Failed to build reqwest client");

        Self { client, base_url }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    // ========================================================================
    // Status
    // ========================================================================

    pub async fn get_status(&self) -> Response {
        self.client
            .get(self.url("/"))
            .send()
            .await
            .expect("Status request failed")
    }

    // ========================================================================
    // Songs
    // ========================================================================

    /// POST /api/songs with a JSON `{song, group}` body
    pub async fn create_song(&self, song: &str, group: &str) -> Response {
        self.client
            .post(self.url("/api/songs"))
            .json(&json!({ "song": song, "group": group }))
            .send()
            .await
            .expect("Create song request failed")
    }

    /// POST /api/songs with an arbitrary body and content type
    pub async fn create_song_raw(&self, content_type: &str, body: &str) -> Response {
        self.client
            .post(self.url("/api/songs"))
            .header("content-type", content_type)
            .body(body.to_string())
            .send()
            .await
            .expect("Create song request failed")
    }

    /// GET /api/songs with the given query parameters
    pub async fn list_songs(&self, query: &[(&str, &str)]) -> Response {
        self.client
            .get(self.url("/api/songs"))
            .query(query)
            .send()
            .await
            .expect("List songs request failed")
    }

    /// GET /api/song/{id} with the given query parameters
    pub async fn get_song_verses(&self, id: &str, query: &[(&str, &str)]) -> Response {
        self.client
            .get(self.url(&format!("/api/song/{}", id)))
            .query(query)
            .send()
            .await
            .expect("Get song verses request failed")
    }

    /// PUT /api/song/{id} with a JSON body
    pub async fn update_song(&self, id: &str, update: &Value) -> Response {
        self.client
            .put(self.url(&format!("/api/song/{}", id)))
            .json(update)
            .send()
            .await
            .expect("Update song request failed")
    }

    /// DELETE /api/song/{id}
    pub async fn delete_song(&self, id: &str) -> Response {
        self.client
            .delete(self.url(&format!("/api/song/{}", id)))
            .send()
            .await
            .expect("Delete song request failed")
    }

    /// Creates a song and returns its id, asserting success
    pub async fn create_song_ok(&self, song: &str, group: &str) -> i64 {
        let response = self.create_song(song, group).await;
        assert_eq!(
            response.status(),
            reqwest::StatusCode::CREATED,
            "Creating {} failed",
            song
        );
        let body: Value = response.json().await.expect("Invalid song JSON");
        body["song_id"].as_i64().expect("Missing song_id")
    }
}
