use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// A playlist together with its tracks, as handed to and returned from a [`super::PlaylistStore`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Playlist {
    pub id: Uuid,
    pub name: String,
    pub notes: Option<String>,
    /// When the playlist was recorded, not when it was uploaded.
    pub created_at: NaiveDateTime,
    pub tracks: Vec<Track>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Track {
    pub id: Uuid,
    pub title: String,
    pub notes: Option<String>,
    /// Relative to the media root: `{playlist_id}/{path inside the archive}`.
    pub file_path: String,
    pub duration_seconds: i32,
    /// Nominal date of the track, inherited from the playlist recording date.
    pub date: NaiveDate,
    pub ordinal_number: i32,
    /// When the track was added to the library.
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "asc" => Some(SortOrder::Asc),
            "desc" => Some(SortOrder::Desc),
            _ => None,
        }
    }

    pub fn as_sql(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaylistOrderBy {
    Name,
    Date,
}

impl PlaylistOrderBy {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "name" => Some(PlaylistOrderBy::Name),
            "date" => Some(PlaylistOrderBy::Date),
            _ => None,
        }
    }

    pub fn column(&self) -> &'static str {
        match self {
            PlaylistOrderBy::Name => "name",
            PlaylistOrderBy::Date => "created_at",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackOrderBy {
    Title,
    Date,
}

impl TrackOrderBy {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "title" => Some(TrackOrderBy::Title),
            "date" => Some(TrackOrderBy::Date),
            _ => None,
        }
    }

    pub fn column(&self) -> &'static str {
        match self {
            TrackOrderBy::Title => "title",
            TrackOrderBy::Date => "created_at",
        }
    }
}
