//! Playlist HTTP routes.
//!
//! Provides endpoints for:
//! - Listing playlist names (optionally paginated and ordered)
//! - Reading the tracks of a playlist
//! - Uploading a playlist archive
//! - Deleting a playlist and its media

use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use futures::TryStreamExt;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio_util::io::StreamReader;
use tracing::{debug, error};

use super::dto::{
    paginate, CollectionInfo, CollectionResponse, ErrorResponse, ListQuery, TrackResponse,
    DATE_FORMAT,
};
use super::state::{GuardedIngestionManager, GuardedPlaylistStore, ServerState};
use super::ServerConfig;
use crate::ingestion::IngestionError;
use crate::playlist_store::{PlaylistOrderBy, SortOrder};

/// Multipart field carrying the archive.
pub const ARCHIVE_FIELD: &str = "archive";

pub(super) fn bad_request(message: impl Into<String>) -> Response {
    (StatusCode::BAD_REQUEST, Json(ErrorResponse::new(message))).into_response()
}

pub(super) fn internal_error(context: &str, err: anyhow::Error) -> Response {
    error!("{}: {:#}", context, err);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse::new(context)),
    )
        .into_response()
}

/// Client-correctable failures are 400, everything else is 500.
fn ingestion_error_response(err: &IngestionError) -> Response {
    let kind = err.kind();
    let status = if kind.is_client_error() {
        StatusCode::BAD_REQUEST
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };
    let body = ErrorResponse {
        message: err.to_string(),
        kind: Some(kind),
    };
    (status, Json(body)).into_response()
}

/// Order parameters with their defaults (`name`, `desc`).
fn playlist_ordering(query: &ListQuery) -> Result<(PlaylistOrderBy, SortOrder), Response> {
    let order_by = match query.order_by.as_deref() {
        None => PlaylistOrderBy::Name,
        Some(raw) => PlaylistOrderBy::parse(raw).ok_or_else(|| {
            bad_request("Invalid orderBy parameter. Must be 'name' or 'date'.")
        })?,
    };
    let order = match query.order.as_deref() {
        None => SortOrder::Desc,
        Some(raw) => SortOrder::parse(raw)
            .ok_or_else(|| bad_request("Invalid order parameter. Must be 'asc' or 'desc'."))?,
    };
    Ok((order_by, order))
}

/// GET /api/playlists
async fn list_playlists(
    State(store): State<GuardedPlaylistStore>,
    Query(query): Query<ListQuery>,
) -> Response {
    let page_request = match query.page_request() {
        Ok(p) => p,
        Err(message) => return bad_request(message),
    };
    let (order_by, order) = match playlist_ordering(&query) {
        Ok(o) => o,
        Err(response) => return response,
    };

    let names = match store.list_playlist_names(order_by, order) {
        Ok(names) => names,
        Err(e) => return internal_error("Failed to list playlists", e),
    };

    let (data, pagination) = paginate(names, page_request);
    Json(CollectionResponse {
        data,
        info: CollectionInfo {
            pagination,
            ..Default::default()
        },
    })
    .into_response()
}

/// GET /api/playlists/{name}
async fn get_playlist(
    State(store): State<GuardedPlaylistStore>,
    State(config): State<ServerConfig>,
    Path(name): Path<String>,
) -> Response {
    let playlist = match store.get_playlist_by_name(&name) {
        Ok(Some(playlist)) => playlist,
        Ok(None) => return StatusCode::NOT_FOUND.into_response(),
        Err(e) => return internal_error("Failed to load playlist", e),
    };

    let data = playlist
        .tracks
        .iter()
        .map(|t| TrackResponse::from_track(t, &config.media))
        .collect();
    Json(CollectionResponse {
        data,
        info: CollectionInfo {
            title: Some(playlist.name),
            description: playlist.notes,
            date: Some(playlist.created_at.format(DATE_FORMAT).to_string()),
            pagination: None,
        },
    })
    .into_response()
}

/// DELETE /api/playlists/{name}
async fn delete_playlist(
    State(manager): State<GuardedIngestionManager>,
    Path(name): Path<String>,
) -> Response {
    match manager.delete_playlist(&name).await {
        Ok(Some(_)) => StatusCode::NO_CONTENT.into_response(),
        Ok(None) => StatusCode::NOT_FOUND.into_response(),
        Err(e) => internal_error("Failed to delete playlist", e),
    }
}

/// POST /api/playlists - Upload a playlist archive (multipart/form-data, field `archive`)
async fn upload_playlist(
    State(manager): State<GuardedIngestionManager>,
    State(config): State<ServerConfig>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Response {
    let limit = config.media.max_upload_size_bytes();
    let declared_length = headers
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<usize>().ok());
    if declared_length.is_some_and(|len| len > limit) {
        return (
            StatusCode::PAYLOAD_TOO_LARGE,
            Json(ErrorResponse::new(format!(
                "Upload exceeds the {} MB limit",
                config.media.max_upload_size_mb
            ))),
        )
            .into_response();
    }

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                debug!("Malformed multipart body: {}", e);
                return (e.status(), Json(ErrorResponse::new(e.body_text()))).into_response();
            }
        };

        if field.name() != Some(ARCHIVE_FIELD) {
            continue;
        }

        let file_name = field.file_name().unwrap_or_default().to_string();
        let too_large = AtomicBool::new(false);
        let stream = field.map_err(|e| {
            if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
                too_large.store(true, Ordering::Relaxed);
            }
            std::io::Error::other(e)
        });
        let reader = StreamReader::new(stream);
        tokio::pin!(reader);

        return match manager.upload(&file_name, &mut reader).await {
            Ok(playlist) => {
                let location = format!(
                    "/api/playlists/{}",
                    urlencoding::encode(&playlist.name)
                );
                (
                    StatusCode::CREATED,
                    [(header::LOCATION, location)],
                    Json(playlist.name),
                )
                    .into_response()
            }
            Err(_) if too_large.load(Ordering::Relaxed) => (
                StatusCode::PAYLOAD_TOO_LARGE,
                Json(ErrorResponse::new(format!(
                    "Upload exceeds the {} MB limit",
                    config.media.max_upload_size_mb
                ))),
            )
                .into_response(),
            Err(e) => ingestion_error_response(&e),
        };
    }

    ingestion_error_response(&IngestionError::ArgumentInvalid(format!(
        "Missing '{}' file field",
        ARCHIVE_FIELD
    )))
}

pub fn make_playlist_routes(state: ServerState) -> Router {
    let limit = state.config.media.max_upload_size_bytes();
    Router::new()
        .route("/", get(list_playlists).post(upload_playlist))
        .route("/{name}", get(get_playlist).delete(delete_playlist))
        .layer(DefaultBodyLimit::max(limit))
        .with_state(state)
}
