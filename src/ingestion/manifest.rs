//! The `manifest.json` document shipped inside every playlist archive.
//!
//! Keys are camelCase on the wire but matched case-insensitively. Unknown keys are ignored.
//! When two keys differ only in case, the one appearing later in the document wins.
//!
//! ```json
//! {
//!   "title": "Jam Session",
//!   "dateRecorded": "2024-03-01",
//!   "tracks": [{ "index": 1, "file": "track1.mp3", "title": "Intro", "duration": 95 }]
//! }
//! ```

use super::error::IngestionError;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};
use std::io::ErrorKind;
use std::path::{Component, Path};

pub const MANIFEST_FILE_NAME: &str = "manifest.json";

const MANIFEST_KEYS: &[&str] = &["title", "dateRecorded", "tracks"];
const TRACK_KEYS: &[&str] = &["index", "file", "title", "duration"];

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    pub title: String,
    #[serde(deserialize_with = "deserialize_recorded_date")]
    pub date_recorded: NaiveDateTime,
    pub tracks: Vec<ManifestTrack>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestTrack {
    /// Declared position in the playlist. Kept verbatim.
    pub index: i32,
    /// Path relative to the archive root.
    pub file: String,
    pub title: String,
    #[serde(rename = "duration")]
    pub duration_seconds: i32,
}

/// Accepts `YYYY-MM-DD`, a naive `YYYY-MM-DDTHH:MM:SS[.f]` or an RFC 3339 timestamp.
fn parse_recorded_date(raw: &str) -> Option<NaiveDateTime> {
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0);
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(dt);
        }
    }
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.naive_local())
}

fn deserialize_recorded_date<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_recorded_date(&raw)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid dateRecorded: {}", raw)))
}

/// Renames keys that match a known key case-insensitively to its canonical spelling.
fn canonicalize_keys(object: Map<String, Value>, known: &[&str]) -> Map<String, Value> {
    object
        .into_iter()
        .map(|(key, value)| {
            let canonical = known
                .iter()
                .find(|k| k.eq_ignore_ascii_case(&key))
                .map(|k| k.to_string())
                .unwrap_or(key);
            (canonical, value)
        })
        .collect()
}

fn canonicalize(value: Value) -> Value {
    let Value::Object(object) = value else {
        return value;
    };
    let mut object = canonicalize_keys(object, MANIFEST_KEYS);
    if let Some(Value::Array(tracks)) = object.get_mut("tracks") {
        for track in tracks.iter_mut() {
            if let Value::Object(fields) = std::mem::take(track) {
                *track = Value::Object(canonicalize_keys(fields, TRACK_KEYS));
            }
        }
    }
    Value::Object(object)
}

fn is_contained_relative(file: &str) -> bool {
    let path = Path::new(file);
    !file.is_empty()
        && path
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}

impl Manifest {
    /// Parses a manifest document.
    pub fn parse(bytes: &[u8]) -> Result<Manifest, IngestionError> {
        let value: Value = serde_json::from_slice(bytes)
            .map_err(|e| IngestionError::ManifestMalformed(e.to_string()))?;
        let manifest: Manifest = serde_json::from_value(canonicalize(value))
            .map_err(|e| IngestionError::ManifestMalformed(e.to_string()))?;

        if let Some(track) = manifest
            .tracks
            .iter()
            .find(|t| !is_contained_relative(&t.file))
        {
            return Err(IngestionError::ManifestMalformed(format!(
                "Track file must be a relative path inside the archive: {}",
                track.file
            )));
        }

        Ok(manifest)
    }

    /// Reads `manifest.json` from the root of an expanded archive.
    pub async fn read(directory: &Path) -> Result<Manifest, IngestionError> {
        let path = directory.join(MANIFEST_FILE_NAME);
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(IngestionError::ManifestMissing(format!(
                    "{} not found in archive",
                    MANIFEST_FILE_NAME
                )))
            }
            Err(e) => return Err(IngestionError::io(format!("Failed to read {:?}", path), e)),
        };
        Self::parse(&bytes)
    }

    /// Track files that are not present under `directory`.
    pub async fn missing_files(&self, directory: &Path) -> Vec<String> {
        let mut missing = Vec::new();
        for track in &self.tracks {
            let exists = tokio::fs::try_exists(directory.join(&track.file))
                .await
                .unwrap_or(false);
            if !exists {
                missing.push(track.file.clone());
            }
        }
        missing
    }
}
