//! SQLite schema definitions for the playlist database.

use crate::sqlite_column;
use crate::sqlite_persistence::{
    Column, ForeignKey, ForeignKeyOnChange, SqlType, Table, VersionedSchema,
};

// =============================================================================
// Version 1 - Playlists and tracks
// =============================================================================

const PLAYLISTS_TABLE_V1: Table = Table {
    name: "playlists",
    columns: &[
        sqlite_column!("id", &SqlType::Text, is_primary_key = true), // UUID
        sqlite_column!("name", &SqlType::Text, non_null = true),
        sqlite_column!("notes", &SqlType::Text),
        sqlite_column!("created_at", &SqlType::Text, non_null = true), // naive ISO 8601
    ],
    indices: &[
        ("idx_playlists_name", "name"),
        ("idx_playlists_created_at", "created_at"),
    ],
};

const TRACK_PLAYLIST_FK: ForeignKey = ForeignKey {
    foreign_table: "playlists",
    foreign_column: "id",
    on_delete: ForeignKeyOnChange::Cascade,
};

const TRACKS_TABLE_V1: Table = Table {
    name: "tracks",
    columns: &[
        sqlite_column!("id", &SqlType::Text, is_primary_key = true), // UUID
        sqlite_column!(
            "playlist_id",
            &SqlType::Text,
            non_null = true,
            foreign_key = Some(&TRACK_PLAYLIST_FK)
        ),
        sqlite_column!("title", &SqlType::Text, non_null = true),
        sqlite_column!("notes", &SqlType::Text),
        sqlite_column!("file_path", &SqlType::Text, non_null = true),
        sqlite_column!("duration", &SqlType::Integer, non_null = true),
        sqlite_column!("date", &SqlType::Text, non_null = true), // YYYY-MM-DD
        sqlite_column!("ordinal_number", &SqlType::Integer, non_null = true),
        sqlite_column!("created_at", &SqlType::Text, non_null = true), // RFC 3339
    ],
    indices: &[
        ("idx_tracks_playlist_id", "playlist_id"),
        ("idx_tracks_title", "title"),
    ],
};

/// All versioned schemas for the playlist database.
///
/// Version 1: playlists and tracks
pub const PLAYLIST_VERSIONED_SCHEMAS: &[VersionedSchema] = &[VersionedSchema {
    version: 1,
    tables: &[PLAYLISTS_TABLE_V1, TRACKS_TABLE_V1],
    migration: None,
}];
