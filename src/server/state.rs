use axum::extract::FromRef;

use crate::ingestion::IngestionManager;
use crate::playlist_store::PlaylistStore;
use std::sync::Arc;
use std::time::Instant;

use super::ServerConfig;

pub type GuardedPlaylistStore = Arc<dyn PlaylistStore>;
pub type GuardedIngestionManager = Arc<IngestionManager>;

#[derive(Clone)]
pub struct ServerState {
    pub config: ServerConfig,
    pub start_time: Instant,
    pub playlist_store: GuardedPlaylistStore,
    pub ingestion_manager: GuardedIngestionManager,
    pub hash: String,
}

impl FromRef<ServerState> for GuardedPlaylistStore {
    fn from_ref(input: &ServerState) -> Self {
        input.playlist_store.clone()
    }
}

impl FromRef<ServerState> for GuardedIngestionManager {
    fn from_ref(input: &ServerState) -> Self {
        input.ingestion_manager.clone()
    }
}

impl FromRef<ServerState> for ServerConfig {
    fn from_ref(input: &ServerState) -> Self {
        input.config.clone()
    }
}
