use axum::{http::StatusCode, response::IntoResponse, routing::get, Router};
use lazy_static::lazy_static;
use prometheus::{
    Counter, CounterVec, Encoder, HistogramOpts, HistogramVec, Opts, Registry, TextEncoder,
};
use std::time::Duration;

/// Metric name prefix for all AudioCloud metrics
const PREFIX: &str = "audiocloud";

lazy_static! {
    // Global Prometheus registry
    pub static ref REGISTRY: Registry = Registry::new();

    // HTTP Request Metrics
    pub static ref HTTP_REQUESTS_TOTAL: CounterVec = CounterVec::new(
        Opts::new(format!("{PREFIX}_http_requests_total"), "Total number of HTTP requests"),
        &["method", "endpoint", "status"]
    ).expect("Failed to create http_requests_total metric");

    pub static ref HTTP_REQUEST_DURATION_SECONDS: HistogramVec = HistogramVec::new(
        HistogramOpts::new(
            format!("{PREFIX}_http_request_duration_seconds"),
            "HTTP request duration in seconds"
        )
        .buckets(vec![0.001, 0.01, 0.05, 0.1, 0.5, 1.0, 2.0, 5.0, 10.0, 30.0]),
        &["method", "endpoint"]
    ).expect("Failed to create http_request_duration_seconds metric");

    // Ingestion Metrics
    pub static ref INGESTIONS_TOTAL: CounterVec = CounterVec::new(
        Opts::new(format!("{PREFIX}_ingestions_total"), "Playlist uploads by outcome"),
        &["result"]
    ).expect("Failed to create ingestions_total metric");

    pub static ref INGESTED_TRACKS_TOTAL: Counter = Counter::new(
        format!("{PREFIX}_ingested_tracks_total"),
        "Tracks added through successful playlist uploads"
    ).expect("Failed to create ingested_tracks_total metric");
}

/// Initialize all metrics and register them with the Prometheus registry
pub fn init_metrics() {
    // Register all metrics - ignore errors if already registered (for tests)
    let _ = REGISTRY.register(Box::new(HTTP_REQUESTS_TOTAL.clone()));
    let _ = REGISTRY.register(Box::new(HTTP_REQUEST_DURATION_SECONDS.clone()));
    let _ = REGISTRY.register(Box::new(INGESTIONS_TOTAL.clone()));
    let _ = REGISTRY.register(Box::new(INGESTED_TRACKS_TOTAL.clone()));

    tracing::info!("Metrics system initialized successfully");
}

/// Collapses a request path into a low-cardinality label.
pub fn endpoint_label(path: &str, static_path_prefix: &str) -> &'static str {
    if path == "/" {
        "home"
    } else if path == "/api/tracks/names" {
        "track_names"
    } else if path.starts_with("/api/tracks") {
        "tracks"
    } else if path == "/api/playlists" {
        "playlists"
    } else if path.starts_with("/api/playlists/") {
        "playlist"
    } else if path.starts_with(static_path_prefix) {
        "static"
    } else {
        "other"
    }
}

/// Record an HTTP request
pub fn record_http_request(method: &str, endpoint: &str, status: u16, duration: Duration) {
    HTTP_REQUESTS_TOTAL
        .with_label_values(&[method, endpoint, &status.to_string()])
        .inc();

    HTTP_REQUEST_DURATION_SECONDS
        .with_label_values(&[method, endpoint])
        .observe(duration.as_secs_f64());
}

/// Record the outcome of one upload: "success" or an error kind label
pub fn record_ingestion(result: &str) {
    INGESTIONS_TOTAL.with_label_values(&[result]).inc();
}

pub fn record_ingested_tracks(count: usize) {
    INGESTED_TRACKS_TOTAL.inc_by(count as f64);
}

/// Handler for the /metrics endpoint
pub async fn metrics_handler() -> impl IntoResponse {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();

    let mut buffer = vec![];
    match encoder.encode(&metric_families, &mut buffer) {
        Ok(()) => {
            let response = String::from_utf8(buffer).unwrap_or_else(|_| String::from(""));
            (StatusCode::OK, response)
        }
        Err(e) => {
            tracing::error!("Failed to encode metrics: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to encode metrics: {}", e),
            )
        }
    }
}

/// Router served on the metrics port
pub fn make_metrics_router() -> Router {
    Router::new().route("/metrics", get(metrics_handler))
}
