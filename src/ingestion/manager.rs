//! Ingestion Manager - turns an uploaded playlist archive into a stored playlist.
//!
//! Each upload moves through these states, strictly in order:
//! 1. RECEIVED: declared file name checked, nothing written yet
//! 2. STAGED: upload stream written to `{temp}/{token}.tmp`
//! 3. EXPANDED: archive expanded into `{temp}/extract-{uuid}`, staged file removed
//! 4. MANIFEST_PARSED: `manifest.json` read from the expanded tree
//! 5. RELOCATED: expanded tree renamed to `{root}/{playlist_id}`
//! 6. ASSEMBLED: playlist built with track files rewritten to `{playlist_id}/{file}`
//!
//! Any failure removes whatever the attempt created before the error is returned. Scratch
//! state is held by guards, so an attempt that is dropped midway cleans up the same way.

use super::assembler::{assemble, prefix_track_files};
use super::error::IngestionError;
use super::expander::{ArchiveExpander, WorkDir};
use super::manifest::Manifest;
use super::staging::StagingStore;
use crate::playlist_store::{Playlist, PlaylistStore};
use crate::server::metrics;
use anyhow::Result;
use std::path::Path;
use std::sync::Arc;
use tokio::io::AsyncRead;
use tracing::{debug, info, warn};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum IngestionState {
    Received,
    Staged,
    Expanded,
    ManifestParsed,
    Relocated,
    Assembled,
}

pub struct IngestionManager {
    staging: StagingStore,
    expander: ArchiveExpander,
    store: Arc<dyn PlaylistStore>,
    new_playlist_id: fn() -> Uuid,
}

impl IngestionManager {
    pub fn new(staging: StagingStore, store: Arc<dyn PlaylistStore>) -> Self {
        let expander = ArchiveExpander::new(staging.temp_path());
        Self {
            staging,
            expander,
            store,
            new_playlist_id: Uuid::new_v4,
        }
    }

    pub fn staging(&self) -> &StagingStore {
        &self.staging
    }

    /// Runs the whole pipeline and persists the result.
    ///
    /// The store is only called once the playlist is fully assembled. If it fails, the
    /// playlist directory is removed again.
    pub async fn upload<R>(&self, file_name: &str, reader: &mut R) -> Result<Playlist, IngestionError>
    where
        R: AsyncRead + Unpin + ?Sized,
    {
        let result = self.ingest_and_persist(file_name, reader).await;
        match &result {
            Ok(playlist) => {
                metrics::record_ingestion("success");
                metrics::record_ingested_tracks(playlist.tracks.len());
                info!(
                    "Ingested playlist '{}' ({}) with {} tracks",
                    playlist.name,
                    playlist.id,
                    playlist.tracks.len()
                );
            }
            Err(e) => {
                metrics::record_ingestion(e.kind().as_str());
                warn!("Rejected upload '{}': {}", file_name, e);
            }
        }
        result
    }

    async fn ingest_and_persist<R>(
        &self,
        file_name: &str,
        reader: &mut R,
    ) -> Result<Playlist, IngestionError>
    where
        R: AsyncRead + Unpin + ?Sized,
    {
        let playlist = self.ingest(file_name, reader).await?;

        if let Err(e) = self.store.insert_playlist(&playlist) {
            let dir = self.staging.identifier_directory(playlist.id);
            self.discard(&dir).await;
            return Err(IngestionError::Persistence(e.to_string()));
        }
        Ok(playlist)
    }

    /// Runs the pipeline up to an assembled playlist without persisting it.
    ///
    /// On success the media lives under `{root}/{playlist.id}`; on failure nothing the
    /// attempt created is left on disk.
    pub async fn ingest<R>(&self, file_name: &str, reader: &mut R) -> Result<Playlist, IngestionError>
    where
        R: AsyncRead + Unpin + ?Sized,
    {
        let token = Uuid::new_v4();
        debug!("Upload {} '{}': {:?}", token, file_name, IngestionState::Received);

        if !StagingStore::is_archive(file_name) {
            return Err(IngestionError::ArgumentInvalid(format!(
                "Expected a .zip archive, got '{}'",
                file_name
            )));
        }

        let staged = self.staging.stage(token, reader).await?;
        debug!("Upload {}: {:?}", token, IngestionState::Staged);

        let expanded = self.expander.expand(staged.path()).await;
        drop(staged);
        let expanded = expanded?;
        debug!(
            "Upload {}: {:?} at {:?}",
            token,
            IngestionState::Expanded,
            expanded.path()
        );

        self.place(token, expanded).await
    }

    /// Everything after expansion: manifest, relocation and assembly.
    ///
    /// `expanded` is removed on any failure before the relocation succeeds.
    async fn place(&self, token: Uuid, expanded: WorkDir) -> Result<Playlist, IngestionError> {
        let mut manifest = Manifest::read(expanded.path()).await?;
        debug!(
            "Upload {}: {:?} '{}' with {} tracks",
            token,
            IngestionState::ManifestParsed,
            manifest.title,
            manifest.tracks.len()
        );

        let missing = manifest.missing_files(expanded.path()).await;
        if !missing.is_empty() {
            warn!(
                "Upload {}: manifest references files not in the archive: {:?}",
                token, missing
            );
        }

        let id = (self.new_playlist_id)();
        let permanent = self.staging.reserve_identifier_directory(id).await?;
        self.staging.relocate(expanded.path(), &permanent).await?;
        expanded.keep();
        debug!("Upload {}: {:?} to {:?}", token, IngestionState::Relocated, permanent);

        prefix_track_files(&mut manifest, id);
        let playlist = assemble(manifest, id);
        debug!("Upload {}: {:?} as {}", token, IngestionState::Assembled, id);

        Ok(playlist)
    }

    /// Deletes the first playlist called `name` together with its media directory.
    pub async fn delete_playlist(&self, name: &str) -> Result<Option<Playlist>> {
        let Some(playlist) = self.store.delete_playlist_by_name(name)? else {
            return Ok(None);
        };
        let dir = self.staging.identifier_directory(playlist.id);
        self.staging.delete(&dir).await?;
        info!("Deleted playlist '{}' ({})", playlist.name, playlist.id);
        Ok(Some(playlist))
    }

    /// Best-effort removal of a playlist directory that never made it into the store.
    async fn discard(&self, path: &Path) {
        if let Err(e) = self.staging.delete(path).await {
            warn!("Failed to clean up {:?}: {}", path, e);
        }
    }
}
