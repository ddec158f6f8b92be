//! Playlist archive ingestion.
//!
//! A client uploads a zip containing audio files plus a `manifest.json`; the archive is
//! staged, expanded, described by its manifest, moved under the media root and turned
//! into a [`crate::playlist_store::Playlist`].

mod assembler;
mod error;
mod expander;
mod manager;
mod manifest;
mod staging;

pub use assembler::{assemble, assemble_at, prefix_track_files};
pub use error::{IngestionError, IngestionErrorKind};
pub use expander::{ArchiveExpander, WorkDir};
pub use manager::IngestionManager;
pub use manifest::{Manifest, ManifestTrack, MANIFEST_FILE_NAME};
pub use staging::{StagingHandle, StagingStore, ARCHIVE_EXTENSION, WORK_DIR_PREFIX};
