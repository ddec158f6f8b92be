//! Turns a parsed manifest into a [`Playlist`] ready to be persisted.

use super::manifest::Manifest;
use crate::playlist_store::{Playlist, Track};
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Rewrites every track file to `{id}/{file}`, the location under the media root after relocation.
pub fn prefix_track_files(manifest: &mut Manifest, id: Uuid) {
    for track in manifest.tracks.iter_mut() {
        track.file = format!("{}/{}", id, track.file);
    }
}

/// Builds the playlist for `manifest`, stamping every track as added now.
pub fn assemble(manifest: Manifest, id: Uuid) -> Playlist {
    assemble_at(manifest, id, Utc::now())
}

/// Same as [`assemble`] with an explicit ingestion time shared by all tracks.
pub fn assemble_at(manifest: Manifest, id: Uuid, ingested_at: DateTime<Utc>) -> Playlist {
    let recorded_on = manifest.date_recorded.date();
    let tracks = manifest
        .tracks
        .into_iter()
        .map(|track| Track {
            id: Uuid::new_v4(),
            title: track.title,
            notes: None,
            file_path: track.file,
            duration_seconds: track.duration_seconds,
            date: recorded_on,
            ordinal_number: track.index,
            created_at: ingested_at,
        })
        .collect();

    Playlist {
        id,
        name: manifest.title,
        notes: None,
        created_at: manifest.date_recorded,
        tracks,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingestion::manifest::ManifestTrack;
    use chrono::NaiveDate;

    fn track(index: i32, file: &str) -> ManifestTrack {
        ManifestTrack {
            index,
            file: file.to_string(),
            title: format!("Track {}", index),
            duration_seconds: 60 + index,
        }
    }

    fn manifest(tracks: Vec<ManifestTrack>) -> Manifest {
        Manifest {
            title: "Jam Session".to_string(),
            date_recorded: NaiveDate::from_ymd_opt(2024, 3, 1)
                .unwrap()
                .and_hms_opt(19, 30, 0)
                .unwrap(),
            tracks,
        }
    }

    #[test]
    fn test_ordinals_kept_verbatim() {
        // Gaps, duplicates and descending indices are all preserved as declared.
        let declared = vec![7, 2, 2, -1, 40];
        let m = manifest(declared.iter().map(|i| track(*i, "a.mp3")).collect());

        let playlist = assemble(m, Uuid::new_v4());

        let ordinals: Vec<i32> = playlist.tracks.iter().map(|t| t.ordinal_number).collect();
        assert_eq!(ordinals, declared);
    }

    #[test]
    fn test_maps_playlist_fields() {
        let id = Uuid::new_v4();
        let m = manifest(vec![track(1, "track1.mp3")]);
        let recorded = m.date_recorded;

        let playlist = assemble(m, id);

        assert_eq!(playlist.id, id);
        assert_eq!(playlist.name, "Jam Session");
        assert_eq!(playlist.notes, None);
        assert_eq!(playlist.created_at, recorded);
        assert_eq!(playlist.tracks[0].date, recorded.date());
        assert_eq!(playlist.tracks[0].duration_seconds, 61);
        assert_eq!(playlist.tracks[0].title, "Track 1");
    }

    #[test]
    fn test_tracks_share_ingestion_time_and_get_distinct_ids() {
        let now = Utc::now();
        let m = manifest((1..=5).map(|i| track(i, "x.mp3")).collect());

        let playlist = assemble_at(m, Uuid::new_v4(), now);

        assert!(playlist.tracks.iter().all(|t| t.created_at == now));
        let mut ids: Vec<Uuid> = playlist.tracks.iter().map(|t| t.id).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 5);
    }

    #[test]
    fn test_prefix_track_files() {
        let id = Uuid::new_v4();
        let mut m = manifest(vec![track(1, "track1.mp3"), track(2, "disc2/track2.mp3")]);

        prefix_track_files(&mut m, id);
        let playlist = assemble(m, id);

        assert_eq!(playlist.tracks[0].file_path, format!("{}/track1.mp3", id));
        assert_eq!(playlist.tracks[1].file_path, format!("{}/disc2/track2.mp3", id));
    }
}
