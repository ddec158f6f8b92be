//! Request logging middleware

use super::super::state::ServerState;
use crate::server::metrics::{endpoint_label, record_http_request};
use axum::extract::State;
use axum::{
    body::Body,
    http::{header, header::HeaderMap, Request, Response, StatusCode},
    middleware::Next,
    response::IntoResponse,
};
use std::time::Instant;
use tracing::{error, info};

#[derive(PartialEq, PartialOrd, Clone, Debug, Default, clap::ValueEnum)]
pub enum RequestsLoggingLevel {
    None,
    #[default]
    Path,
    Headers,
    Body,
}

impl std::fmt::Display for RequestsLoggingLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

const MAX_LOGGABLE_BODY_LENGTH: usize = 1024;

fn content_length(headers: &HeaderMap) -> Result<usize, &'static str> {
    let value = headers
        .get(header::CONTENT_LENGTH)
        .ok_or("Content-length not set.")?;
    let value = value
        .to_str()
        .map_err(|_| "Could not get Content-length string value.")?;
    value
        .parse::<usize>()
        .map_err(|_| "Could not parse Content-length numeric value.")
}

/// Multipart uploads are streamed to disk, their bodies are never buffered for logging.
fn is_multipart(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("multipart/"))
}

fn log_headers(label: &str, headers: &HeaderMap) {
    info!("  {} Headers:", label);
    for (name, value) in headers.iter() {
        info!("    {:?}: {:?}", name, value);
    }
}

/// Logs a small body and hands back an equivalent one. `None` when the body could not be read.
async fn log_body(label: &str, headers: &HeaderMap, body: Body, skip: bool) -> Option<Body> {
    let size = match content_length(headers) {
        Ok(size) => size,
        Err(reason) => {
            info!("  {} Body: {}", label, reason);
            return Some(body);
        }
    };
    if skip || size >= MAX_LOGGABLE_BODY_LENGTH {
        info!(
            "  {} Body: Not logged ({:#})",
            label,
            byte_unit::Byte::from(size)
        );
        return Some(body);
    }
    match axum::body::to_bytes(body, size).await {
        Ok(bytes) => {
            info!("  {} Body:\n{}", label, String::from_utf8_lossy(&bytes));
            Some(Body::from(bytes))
        }
        Err(err) => {
            error!("Failed to read {} body: {:?}", label, err);
            None
        }
    }
}

fn internal_error() -> Response<Body> {
    let mut response = Response::new(Body::from("Internal Server Error"));
    *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
    response
}

pub async fn log_requests(
    State(state): State<ServerState>,
    mut request: Request<Body>,
    next: Next,
) -> impl IntoResponse {
    let level = state.config.requests_logging_level.clone();
    let start = Instant::now();

    let method = request.method().to_string();
    let endpoint = endpoint_label(request.uri().path(), &state.config.media.static_path_prefix);

    if level > RequestsLoggingLevel::None {
        info!(">>> {} {}", method, request.uri());
    }
    if level >= RequestsLoggingLevel::Headers {
        log_headers("Req", request.headers());
    }
    if level >= RequestsLoggingLevel::Body {
        let (parts, body) = request.into_parts();
        let skip = is_multipart(&parts.headers);
        let Some(body) = log_body("Req", &parts.headers, body, skip).await else {
            return internal_error();
        };
        request = Request::from_parts(parts, body);
    }

    let mut response = next.run(request).await;

    if level >= RequestsLoggingLevel::Headers {
        log_headers("Resp", response.headers());
    }
    if level >= RequestsLoggingLevel::Body {
        let (parts, body) = response.into_parts();
        let Some(body) = log_body("Resp", &parts.headers, body, false).await else {
            return internal_error();
        };
        response = Response::from_parts(parts, body);
    }

    let status = response.status().as_u16();
    let duration = start.elapsed();

    if level > RequestsLoggingLevel::None {
        info!("<<< {} ({}ms)", status, duration.as_millis());
    }

    record_http_request(&method, endpoint, status, duration);

    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn level_ordering() {
        let none = RequestsLoggingLevel::None;

        assert!(none < RequestsLoggingLevel::Headers);
        assert!(RequestsLoggingLevel::Body > RequestsLoggingLevel::None);
        assert_eq!(RequestsLoggingLevel::default(), RequestsLoggingLevel::Path);
    }

    #[test]
    fn content_length_parsing() {
        let mut headers = HeaderMap::new();
        assert!(content_length(&headers).is_err());

        headers.insert("content-length", HeaderValue::from_static("42"));
        assert_eq!(content_length(&headers), Ok(42));

        headers.insert("content-length", HeaderValue::from_static("lots"));
        assert!(content_length(&headers).is_err());
    }

    #[test]
    fn multipart_detection() {
        let mut headers = HeaderMap::new();
        assert!(!is_multipart(&headers));
        headers.insert(
            "content-type",
            HeaderValue::from_static("multipart/form-data; boundary=xyz"),
        );
        assert!(is_multipart(&headers));
    }

    #[tokio::test]
    async fn small_bodies_survive_logging() {
        let mut headers = HeaderMap::new();
        headers.insert("content-length", HeaderValue::from_static("5"));

        let body = log_body("Req", &headers, Body::from("hello"), false)
            .await
            .unwrap();

        let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], b"hello");
    }
}
