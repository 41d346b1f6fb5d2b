use crate::song::SongInfo;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Errors that can occur when querying the metadata service.
#[derive(Debug, Error)]
pub enum MetadataError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Request timeout")]
    Timeout,

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Source of song details for newly created songs.
#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
#[async_trait]
pub trait MetadataClient: Send + Sync {
    /// Look up release date, lyrics and link of `song` by `group`.
    async fn fetch_song_info(&self, song: &str, group: &str) -> Result<SongInfo, MetadataError>;
}

/// Metadata client talking to the service's `/info` endpoint.
#[derive(Clone)]
pub struct HttpMetadataClient {
    client: Client,
    base_url: String,
}

impl HttpMetadataClient {
    /// Create a new HttpMetadataClient.
    ///
    /// # Arguments
    /// * `base_url` - Base URL of the metadata service (e.g., "http://localhost:8081")
    /// * `timeout` - Request timeout
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> anyhow::Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }
}

#[async_trait]
impl MetadataClient for HttpMetadataClient {
    async fn fetch_song_info(&self, song: &str, group: &str) -> Result<SongInfo, MetadataError> {
        let url = format!("{}/info", self.base_url);
        debug!(song = %song, group = %group, "Requesting song info");

        let response = self
            .client
            .get(&url)
            .query(&[("song", song), ("group", group)])
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    MetadataError::Timeout
                } else {
                    MetadataError::Connection(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MetadataError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        response.json::<SongInfo>().await.map_err(|e| {
            if e.is_timeout() {
                MetadataError::Timeout
            } else {
                MetadataError::InvalidResponse(format!("Failed to parse song info: {}", e))
            }
        })
    }
}
