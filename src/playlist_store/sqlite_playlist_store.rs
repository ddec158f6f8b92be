use super::models::{Playlist, PlaylistOrderBy, SortOrder, Track, TrackOrderBy};
use super::schema::PLAYLIST_VERSIONED_SCHEMAS;
use super::PlaylistStore;
use crate::sqlite_persistence::open_versioned_db;
use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

const NAIVE_DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";
const DATE_FORMAT: &str = "%Y-%m-%d";

const TRACK_COLUMNS: &str =
    "id, title, notes, file_path, duration, date, ordinal_number, created_at";

pub struct SqlitePlaylistStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqlitePlaylistStore {
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let conn = open_versioned_db(db_path.as_ref(), PLAYLIST_VERSIONED_SCHEMAS, "playlist")?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Store backed by a private in-memory database.
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        PLAYLIST_VERSIONED_SCHEMAS
            .last()
            .context("No playlist schema defined")?
            .create(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn conversion_error<E>(idx: usize, err: E) -> rusqlite::Error
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(err))
    }

    fn parse_uuid(idx: usize, value: String) -> rusqlite::Result<Uuid> {
        Uuid::parse_str(&value).map_err(|e| Self::conversion_error(idx, e))
    }

    fn row_to_track(row: &rusqlite::Row) -> rusqlite::Result<Track> {
        let date_str: String = row.get("date")?;
        let created_at_str: String = row.get("created_at")?;

        Ok(Track {
            id: Self::parse_uuid(0, row.get("id")?)?,
            title: row.get("title")?,
            notes: row.get("notes")?,
            file_path: row.get("file_path")?,
            duration_seconds: row.get("duration")?,
            date: NaiveDate::parse_from_str(&date_str, DATE_FORMAT)
                .map_err(|e| Self::conversion_error(5, e))?,
            ordinal_number: row.get("ordinal_number")?,
            created_at: DateTime::parse_from_rfc3339(&created_at_str)
                .map(|dt| dt.with_timezone(&Utc))
                .map_err(|e| Self::conversion_error(7, e))?,
        })
    }

    fn load_playlist(conn: &Connection, name: &str) -> Result<Option<Playlist>> {
        let header = conn
            .query_row(
                "SELECT id, name, notes, created_at FROM playlists
                 WHERE name = ?1 ORDER BY rowid LIMIT 1",
                params![name],
                |row| {
                    let created_at: String = row.get("created_at")?;
                    Ok((
                        Self::parse_uuid(0, row.get("id")?)?,
                        row.get::<_, String>("name")?,
                        row.get::<_, Option<String>>("notes")?,
                        created_at,
                    ))
                },
            )
            .optional()?;

        let Some((id, name, notes, created_at)) = header else {
            return Ok(None);
        };

        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM tracks WHERE playlist_id = ?1 ORDER BY ordinal_number, rowid",
            TRACK_COLUMNS
        ))?;
        let tracks = stmt
            .query_map(params![id.to_string()], Self::row_to_track)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(Some(Playlist {
            id,
            name,
            notes,
            created_at: NaiveDateTime::parse_from_str(&created_at, NAIVE_DATETIME_FORMAT)
                .with_context(|| format!("Invalid playlist created_at: {}", created_at))?,
            tracks,
        }))
    }
}

impl PlaylistStore for SqlitePlaylistStore {
    fn insert_playlist(&self, playlist: &Playlist) -> Result<()> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction()?;

        tx.execute(
            "INSERT INTO playlists (id, name, notes, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![
                playlist.id.to_string(),
                playlist.name,
                playlist.notes,
                playlist.created_at.format(NAIVE_DATETIME_FORMAT).to_string()
            ],
        )
        .context("Failed to insert playlist")?;

        {
            let mut stmt = tx.prepare(
                "INSERT INTO tracks (id, playlist_id, title, notes, file_path, duration, date, ordinal_number, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            )?;
            for track in &playlist.tracks {
                stmt.execute(params![
                    track.id.to_string(),
                    playlist.id.to_string(),
                    track.title,
                    track.notes,
                    track.file_path,
                    track.duration_seconds,
                    track.date.format(DATE_FORMAT).to_string(),
                    track.ordinal_number,
                    track.created_at.to_rfc3339()
                ])
                .with_context(|| format!("Failed to insert track {}", track.title))?;
            }
        }

        tx.commit()?;
        Ok(())
    }

    fn list_playlist_names(
        &self,
        order_by: PlaylistOrderBy,
        order: SortOrder,
    ) -> Result<Vec<String>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(&format!(
            "SELECT name FROM playlists ORDER BY {} {}",
            order_by.column(),
            order.as_sql()
        ))?;
        let names = stmt
            .query_map([], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(names)
    }

    fn get_playlist_by_name(&self, name: &str) -> Result<Option<Playlist>> {
        let conn = self.conn.lock().unwrap();
        Self::load_playlist(&conn, name)
    }

    fn delete_playlist_by_name(&self, name: &str) -> Result<Option<Playlist>> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn.transaction()?;
        let playlist = Self::load_playlist(&tx, name)?;
        if let Some(playlist) = &playlist {
            tx.execute(
                "DELETE FROM playlists WHERE id = ?1",
                params![playlist.id.to_string()],
            )?;
        }
        tx.commit()?;
        Ok(playlist)
    }

    fn list_track_titles(&self) -> Result<Vec<String>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare("SELECT DISTINCT title FROM tracks ORDER BY title")?;
        let titles = stmt
            .query_map([], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(titles)
    }

    fn search_tracks(
        &self,
        term: &str,
        order_by: TrackOrderBy,
        order: SortOrder,
    ) -> Result<Vec<Track>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM tracks WHERE instr(title, ?1) > 0 ORDER BY {} {}",
            TRACK_COLUMNS,
            order_by.column(),
            order.as_sql()
        ))?;
        let tracks = stmt
            .query_map(params![term], Self::row_to_track)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(tracks)
    }
}
