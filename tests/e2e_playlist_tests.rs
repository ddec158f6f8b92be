//! End-to-end tests for playlist browsing and deletion

mod common;

use common::{
    jam_session_archive, playlist_archive, TestClient, TestServer, JAM_SESSION_DATE,
    JAM_SESSION_TITLE, JAM_SESSION_TRACKS,
};
use reqwest::StatusCode;
use serde_json::json;

async fn upload_three(client: &TestClient) {
    for (title, date) in [
        ("Beta", "2023-06-01"),
        ("Alpha", "2024-01-01"),
        ("Gamma", "2022-12-31"),
    ] {
        let response = client
            .upload_playlist(
                "p.zip",
                playlist_archive(title, date, &[(1, "song.mp3", "Song")]),
            )
            .await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }
}

#[tokio::test]
async fn test_home_reports_version() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let response = client.get_home().await;

    assert_eq!(response.status(), StatusCode::OK);
    let stats: serde_json::Value = response.json().await.unwrap();
    assert_eq!(stats["version"], env!("CARGO_PKG_VERSION"));
    assert!(stats["hash"].is_string());
    assert!(stats["uptime"].is_string());
}

#[tokio::test]
async fn test_empty_library_lists_nothing() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let response = client.list_playlists().await;

    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body, json!({ "data": [], "info": {} }));
}

#[tokio::test]
async fn test_list_defaults_to_name_descending() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());
    upload_three(&client).await;

    let body: serde_json::Value = client.list_playlists().await.json().await.unwrap();

    assert_eq!(body["data"], json!(["Gamma", "Beta", "Alpha"]));
}

#[tokio::test]
async fn test_list_orders_by_recording_date() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());
    upload_three(&client).await;

    let body: serde_json::Value = client
        .list_playlists_with(&[("orderBy", "date"), ("order", "asc")])
        .await
        .json()
        .await
        .unwrap();

    assert_eq!(body["data"], json!(["Gamma", "Beta", "Alpha"]));

    let body: serde_json::Value = client
        .list_playlists_with(&[("orderBy", "date"), ("order", "desc")])
        .await
        .json()
        .await
        .unwrap();

    assert_eq!(body["data"], json!(["Alpha", "Beta", "Gamma"]));
}

#[tokio::test]
async fn test_list_paginates() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());
    upload_three(&client).await;

    let body: serde_json::Value = client
        .list_playlists_with(&[("orderBy", "name"), ("order", "asc"), ("page", "2"), ("pageSize", "2")])
        .await
        .json()
        .await
        .unwrap();

    assert_eq!(body["data"], json!(["Gamma"]));
    assert_eq!(
        body["info"]["pagination"],
        json!({ "currentPage": 2, "pageSize": 1, "totalPages": 2, "totalItems": 3 })
    );
}

#[tokio::test]
async fn test_list_rejects_invalid_parameters() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let cases: [&[(&str, &str)]; 5] = [
        &[("page", "1")],
        &[("pageSize", "10")],
        &[("page", "0"), ("pageSize", "10")],
        &[("orderBy", "length")],
        &[("order", "up")],
    ];

    for query in cases {
        let response = client.list_playlists_with(query).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{:?}", query);
        let body: serde_json::Value = response.json().await.unwrap();
        assert!(body["message"].is_string());
    }
}

#[tokio::test]
async fn test_get_playlist_returns_tracks_in_ordinal_order() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());
    client
        .upload_playlist("jam.zip", jam_session_archive())
        .await;

    let response = client.get_playlist(JAM_SESSION_TITLE).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["info"]["title"], JAM_SESSION_TITLE);
    assert_eq!(body["info"]["date"], JAM_SESSION_DATE);
    assert!(body["info"].get("description").is_none());

    let tracks = body["data"].as_array().unwrap();
    assert_eq!(tracks.len(), JAM_SESSION_TRACKS.len());
    for (track, (index, file, title)) in tracks.iter().zip(JAM_SESSION_TRACKS) {
        assert_eq!(track["ordinalNumber"], index);
        assert_eq!(track["title"], title);
        assert_eq!(track["date"], JAM_SESSION_DATE);
        assert_eq!(track["duration"], 180 + index);
        assert!(track["url"].as_str().unwrap().ends_with(file));
    }
}

#[tokio::test]
async fn test_get_unknown_playlist_returns_404() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let response = client.get_playlist("Nobody Recorded This").await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_playlist_removes_rows_and_media() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());
    client
        .upload_playlist("jam.zip", jam_session_archive())
        .await;
    let body: serde_json::Value = client
        .get_playlist(JAM_SESSION_TITLE)
        .await
        .json()
        .await
        .unwrap();
    let track_url = body["data"][0]["url"].as_str().unwrap().to_string();

    let response = client.delete_playlist(JAM_SESSION_TITLE).await;

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert!(TestServer::entries_in(server.root_path()).is_empty());
    assert_eq!(
        client.get_playlist(JAM_SESSION_TITLE).await.status(),
        StatusCode::NOT_FOUND
    );
    assert_eq!(
        client.get_url(&track_url).await.status(),
        StatusCode::NOT_FOUND
    );
    let names: serde_json::Value = client.list_track_names().await.json().await.unwrap();
    assert_eq!(names, json!([]));
}

#[tokio::test]
async fn test_delete_unknown_playlist_returns_404() {
    let server = TestServer::spawn().await;
    let client = TestClient::new(server.base_url.clone());

    let response = client.delete_playlist("Ghost").await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
