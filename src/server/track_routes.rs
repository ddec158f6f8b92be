//! Track HTTP routes: distinct titles and title search.

use axum::{
    extract::{Query, State},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};

use super::dto::{paginate, CollectionInfo, CollectionResponse, ListQuery, TrackResponse};
use super::playlist_routes::{bad_request, internal_error};
use super::state::{GuardedPlaylistStore, ServerState};
use super::ServerConfig;
use crate::playlist_store::{SortOrder, TrackOrderBy};

/// GET /api/tracks/names
async fn list_track_names(State(store): State<GuardedPlaylistStore>) -> Response {
    match store.list_track_titles() {
        Ok(titles) => Json(titles).into_response(),
        Err(e) => internal_error("Failed to list track titles", e),
    }
}

/// GET /api/tracks?search=...
async fn search_tracks(
    State(store): State<GuardedPlaylistStore>,
    State(config): State<ServerConfig>,
    Query(query): Query<ListQuery>,
) -> Response {
    let Some(term) = query.search.clone() else {
        return bad_request("The search parameter is required.");
    };
    let page_request = match query.page_request() {
        Ok(p) => p,
        Err(message) => return bad_request(message),
    };
    let order_by = match query.order_by.as_deref() {
        None => TrackOrderBy::Title,
        Some(raw) => match TrackOrderBy::parse(raw) {
            Some(o) => o,
            None => return bad_request("Invalid orderBy parameter. Must be 'title' or 'date'."),
        },
    };
    let order = match query.order.as_deref() {
        None => SortOrder::Desc,
        Some(raw) => match SortOrder::parse(raw) {
            Some(o) => o,
            None => return bad_request("Invalid order parameter. Must be 'asc' or 'desc'."),
        },
    };

    let tracks = match store.search_tracks(&term, order_by, order) {
        Ok(tracks) => tracks,
        Err(e) => return internal_error("Failed to search tracks", e),
    };

    let responses: Vec<TrackResponse> = tracks
        .iter()
        .map(|t| TrackResponse::from_track(t, &config.media))
        .collect();
    let (data, pagination) = paginate(responses, page_request);
    Json(CollectionResponse {
        data,
        info: CollectionInfo {
            title: Some(term),
            pagination,
            ..Default::default()
        },
    })
    .into_response()
}

pub fn make_track_routes(state: ServerState) -> Router {
    Router::new()
        .route("/", get(search_tracks))
        .route("/names", get(list_track_names))
        .with_state(state)
}
