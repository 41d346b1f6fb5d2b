use axum::extract::FromRef;

use crate::metadata::MetadataClient;
use crate::song_store::SongRepository;
use std::sync::Arc;
use std::time::Instant;

use super::ServerConfig;

pub type GuardedMetadataClient = Arc<dyn MetadataClient>;

#[derive(Clone)]
pub struct ServerState {
    pub config: ServerConfig,
    pub start_time: Instant,
    pub songs: SongRepository,
    pub metadata_client: GuardedMetadataClient,
    pub hash: String,
}

impl ServerState {
    pub fn new(
        config: ServerConfig,
        songs: SongRepository,
        metadata_client: GuardedMetadataClient,
        hash: String,
    ) -> Self {
        ServerState {
            config,
            start_time: Instant::now(),
            songs,
            metadata_client,
            hash,
        }
    }
}

impl FromRef<ServerState> for SongRepository {
    fn from_ref(input: &ServerState) -> Self {
        input.songs.clone()
    }
}

impl FromRef<ServerState> for GuardedMetadataClient {
    fn from_ref(input: &ServerState) -> Self {
        input.metadata_client.clone()
    }
}

impl FromRef<ServerState> for ServerConfig {
    fn from_ref(input: &ServerState) -> Self {
        input.config.clone()
    }
}
