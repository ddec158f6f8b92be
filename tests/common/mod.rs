//! Common test infrastructure
//!
//! This module provides all the infrastructure needed for end-to-end tests.
//! Tests should only import from this module, not from internal submodules.
//!
//! # Example
//!
//! ```no_run
//! mod common;
//! use common::{jam_session_archive, TestServer, TestClient, JAM_SESSION_TITLE};
//! use reqwest::StatusCode;
//!
//! #[tokio::test]
//! async fn test_upload() {
//!     let server = TestServer::spawn().await;
//!     let client = TestClient::new(server.base_url.clone());
//!
//!     let response = client.upload_playlist("jam.zip", jam_session_archive()).await;
//!     assert_eq!(response.status(), StatusCode::CREATED);
//! }
//! ```

mod client;
mod constants;
mod fixtures;
mod server;

// Public API - this is what tests import
pub use client::TestClient;
pub use constants::*;
#[allow(unused_imports)]
pub use fixtures::{
    archive_with_entries, jam_session_archive, manifest_json, playlist_archive, ArchiveEntry,
};
pub use server::TestServer;
