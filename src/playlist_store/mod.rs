mod models;
mod schema;
mod sqlite_playlist_store;

pub use models::*;
pub use schema::PLAYLIST_VERSIONED_SCHEMAS;
pub use sqlite_playlist_store::SqlitePlaylistStore;

use anyhow::Result;

/// Persistence for playlists and their tracks.
///
/// Implementations own relational integrity: a track never outlives its playlist.
pub trait PlaylistStore: Send + Sync {
    /// Inserts a playlist and all of its tracks atomically.
    fn insert_playlist(&self, playlist: &Playlist) -> Result<()>;

    fn list_playlist_names(&self, order_by: PlaylistOrderBy, order: SortOrder)
        -> Result<Vec<String>>;

    /// Returns the first playlist with the given name, tracks ordered by ordinal number.
    fn get_playlist_by_name(&self, name: &str) -> Result<Option<Playlist>>;

    /// Deletes the first playlist with the given name and returns it.
    fn delete_playlist_by_name(&self, name: &str) -> Result<Option<Playlist>>;

    /// Distinct track titles across all playlists.
    fn list_track_titles(&self) -> Result<Vec<String>>;

    /// Tracks whose title contains `term` (case-sensitive).
    fn search_tracks(
        &self,
        term: &str,
        order_by: TrackOrderBy,
        order: SortOrder,
    ) -> Result<Vec<Track>>;
}
