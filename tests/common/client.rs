//! HTTP client for end-to-end tests
//!
//! This module provides a high-level HTTP client that wraps reqwest
//! and provides methods for all audiocloud-server endpoints.
//!
//! When API routes or request formats change, update only this file.

use super::constants::*;
use reqwest::multipart::{Form, Part};
use reqwest::Response;
use std::time::Duration;

pub struct TestClient {
    /// The underlying reqwest client (public for custom requests in tests)
    pub client: reqwest::Client,
    /// The base URL of the test server
    pub base_url: String,
}

impl TestClient {
    pub fn new(base_url: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .expect("Failed to build reqwest client");

        Self { client, base_url }
    }

    // ========================================================================
    // Home
    // ========================================================================

    /// GET /
    pub async fn get_home(&self) -> Response {
        self.get("/").await
    }

    // ========================================================================
    // Playlist Endpoints
    // ========================================================================

    /// POST /api/playlists with the archive in the `archive` field
    pub async fn upload_playlist(&self, file_name: &str, archive: Vec<u8>) -> Response {
        self.upload_playlist_field(ARCHIVE_FIELD, file_name, archive)
            .await
    }

    /// POST /api/playlists with the archive under an arbitrary field name
    pub async fn upload_playlist_field(
        &self,
        field: &str,
        file_name: &str,
        archive: Vec<u8>,
    ) -> Response {
        let part = Part::bytes(archive)
            .file_name(file_name.to_string())
            .mime_str("application/zip")
            .expect("Invalid mime type");
        let form = Form::new().part(field.to_string(), part);

        self.client
            .post(format!("{}/api/playlists", self.base_url))
            .multipart(form)
            .send()
            .await
            .expect("Upload request failed")
    }

    /// GET /api/playlists
    pub async fn list_playlists(&self) -> Response {
        self.get("/api/playlists").await
    }

    /// GET /api/playlists?{query}
    pub async fn list_playlists_with(&self, query: &[(&str, &str)]) -> Response {
        self.client
            .get(format!("{}/api/playlists", self.base_url))
            .query(query)
            .send()
            .await
            .expect("List playlists request failed")
    }

    /// GET /api/playlists/{name}
    pub async fn get_playlist(&self, name: &str) -> Response {
        self.get(&format!("/api/playlists/{}", urlencoding::encode(name)))
            .await
    }

    /// DELETE /api/playlists/{name}
    pub async fn delete_playlist(&self, name: &str) -> Response {
        self.client
            .delete(format!(
                "{}/api/playlists/{}",
                self.base_url,
                urlencoding::encode(name)
            ))
            .send()
            .await
            .expect("Delete playlist request failed")
    }

    // ========================================================================
    // Track Endpoints
    // ========================================================================

    /// GET /api/tracks/names
    pub async fn list_track_names(&self) -> Response {
        self.get("/api/tracks/names").await
    }

    /// GET /api/tracks?{query}
    pub async fn search_tracks(&self, query: &[(&str, &str)]) -> Response {
        self.client
            .get(format!("{}/api/tracks", self.base_url))
            .query(query)
            .send()
            .await
            .expect("Search tracks request failed")
    }

    // ========================================================================
    // Raw access
    // ========================================================================

    /// GET an absolute URL, e.g. a track URL returned by the server
    pub async fn get_url(&self, url: &str) -> Response {
        self.client
            .get(url)
            .send()
            .await
            .expect("Request failed")
    }

    async fn get(&self, path: &str) -> Response {
        self.client
            .get(format!("{}{}", self.base_url, path))
            .send()
            .await
            .expect("Request failed")
    }
}
