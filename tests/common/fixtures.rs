//! Archive fixtures for upload tests
//!
//! Archives are built in memory with the `zip` crate so each test can shape its own
//! layout, including deliberately broken ones.

use super::constants::*;
use std::io::{Cursor, Write};
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

pub enum ArchiveEntry<'a> {
    File(&'a str, &'a [u8]),
    Dir(&'a str),
}

/// Zips `entries` in order.
pub fn archive_with_entries(entries: &[ArchiveEntry]) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default();
    for entry in entries {
        match entry {
            ArchiveEntry::File(name, content) => {
                writer
                    .start_file(*name, options)
                    .expect("Failed to start zip entry");
                writer.write_all(content).expect("Failed to write zip entry");
            }
            ArchiveEntry::Dir(name) => {
                writer
                    .add_directory(*name, options)
                    .expect("Failed to add zip directory");
            }
        }
    }
    writer
        .finish()
        .expect("Failed to finish zip archive")
        .into_inner()
}

/// Manifest JSON for `tracks`, given as (index, file, title).
pub fn manifest_json(title: &str, date_recorded: &str, tracks: &[(i32, &str, &str)]) -> String {
    let tracks: Vec<serde_json::Value> = tracks
        .iter()
        .map(|(index, file, track_title)| {
            serde_json::json!({
                "index": index,
                "file": file,
                "title": track_title,
                "duration": 180 + index,
            })
        })
        .collect();
    serde_json::json!({
        "title": title,
        "dateRecorded": date_recorded,
        "tracks": tracks,
    })
    .to_string()
}

/// A well-formed archive: the manifest plus one audio file per track.
pub fn playlist_archive(title: &str, date_recorded: &str, tracks: &[(i32, &str, &str)]) -> Vec<u8> {
    let manifest = manifest_json(title, date_recorded, tracks);
    let mut entries = vec![ArchiveEntry::File("manifest.json", manifest.as_bytes())];
    for (_, file, _) in tracks {
        entries.push(ArchiveEntry::File(file, TEST_AUDIO_BYTES));
    }
    archive_with_entries(&entries)
}

pub fn jam_session_archive() -> Vec<u8> {
    playlist_archive(JAM_SESSION_TITLE, JAM_SESSION_DATE, &JAM_SESSION_TRACKS)
}
