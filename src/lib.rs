//! AudioCloud Server Library
//!
//! Playlist archive ingestion, the playlist library and the HTTP surface over both.

pub mod config;
pub mod ingestion;
pub mod playlist_store;
pub mod server;
pub mod sqlite_persistence;

pub use ingestion::{IngestionError, IngestionManager, StagingStore};
pub use playlist_store::{PlaylistStore, SqlitePlaylistStore};
pub use server::{make_app, run_server, RequestsLoggingLevel, ServerConfig};
