//! Shared constants for end-to-end tests
//!
//! When fixture data changes (titles, dates, file names), update only this file.

// ============================================================================
// Fixture Playlists
// ============================================================================

/// Title of the playlist built by `jam_session_archive()`
pub const JAM_SESSION_TITLE: &str = "Jam Session";

/// Recording date of the jam session
pub const JAM_SESSION_DATE: &str = "2024-03-01";

/// Tracks of the jam session: (index, file inside the archive, title)
pub const JAM_SESSION_TRACKS: [(i32, &str, &str); 3] = [
    (1, "set1/intro.mp3", "Intro"),
    (2, "set1/groove.mp3", "Groove in D"),
    (3, "set2/outro.mp3", "Outro"),
];

/// Multipart field the server reads the archive from
pub const ARCHIVE_FIELD: &str = "archive";

/// Fake audio payload written for every track
pub const TEST_AUDIO_BYTES: &[u8] = b"ID3\x03\x00\x00\x00\x00\x00\x00not really an mp3";

// ============================================================================
// Test Timeouts and Configuration
// ============================================================================

/// Maximum time to wait for server to become ready (milliseconds)
pub const SERVER_READY_TIMEOUT_MS: u64 = 5000;

/// Timeout for individual HTTP requests (seconds)
pub const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Polling interval when waiting for server ready (milliseconds)
pub const SERVER_READY_POLL_INTERVAL_MS: u64 = 50;

/// Upload limit configured on test servers (megabytes)
pub const TEST_MAX_UPLOAD_SIZE_MB: usize = 1;
