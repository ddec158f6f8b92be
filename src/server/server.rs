use anyhow::Result;
use std::{
    future::Future,
    sync::Arc,
    time::{Duration, Instant},
};

use axum::{extract::State, middleware, response::IntoResponse, routing::get, Json, Router};
use serde::Serialize;
use tower_http::services::ServeDir;
use tracing::{error, info};

use super::metrics::make_metrics_router;
use super::playlist_routes::make_playlist_routes;
use super::track_routes::make_track_routes;
use super::{log_requests, state::*, ServerConfig};
use crate::ingestion::IngestionManager;
use crate::playlist_store::PlaylistStore;

#[derive(Serialize)]
struct ServerStats {
    pub uptime: String,
    pub hash: String,
    pub version: String,
}

fn format_uptime(duration: Duration) -> String {
    let total_seconds = duration.as_secs();

    let days = total_seconds / 86_400;
    let hours = (total_seconds % 86_400) / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    format!("{}d {:02}:{:02}:{:02}", days, hours, minutes, seconds)
}

async fn home(State(state): State<ServerState>) -> impl IntoResponse {
    let stats = ServerStats {
        uptime: format_uptime(state.start_time.elapsed()),
        hash: state.hash.clone(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    };
    Json(stats)
}

impl ServerState {
    fn new(
        config: ServerConfig,
        playlist_store: Arc<dyn PlaylistStore>,
        ingestion_manager: Arc<IngestionManager>,
    ) -> ServerState {
        ServerState {
            config,
            start_time: Instant::now(),
            playlist_store,
            ingestion_manager,
            hash: env!("GIT_HASH").to_owned(),
        }
    }
}

pub fn make_app(
    config: ServerConfig,
    playlist_store: Arc<dyn PlaylistStore>,
    ingestion_manager: Arc<IngestionManager>,
) -> Result<Router> {
    let media_root = ingestion_manager.staging().root_path().to_path_buf();
    let static_prefix = config.media.static_path_prefix.clone();
    let state = ServerState::new(config, playlist_store, ingestion_manager);

    let home_router: Router = Router::new().route("/", get(home)).with_state(state.clone());

    let mut app: Router = home_router
        .nest("/api/playlists", make_playlist_routes(state.clone()))
        .nest("/api/tracks", make_track_routes(state.clone()))
        .nest_service(&static_prefix, ServeDir::new(media_root));

    app = app.layer(middleware::from_fn_with_state(state.clone(), log_requests));

    Ok(app)
}

/// Serves the API until `shutdown` resolves, and the metrics endpoint alongside it.
pub async fn run_server<F>(
    config: ServerConfig,
    playlist_store: Arc<dyn PlaylistStore>,
    ingestion_manager: Arc<IngestionManager>,
    shutdown: F,
) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let port = config.port;
    let metrics_port = config.metrics_port;
    let app = make_app(config, playlist_store, ingestion_manager)?;

    let metrics_listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", metrics_port)).await?;
    tokio::spawn(async move {
        if let Err(e) = axum::serve(metrics_listener, make_metrics_router()).await {
            error!("Metrics server failed: {}", e);
        }
    });

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;
    info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;
    Ok(())
}
