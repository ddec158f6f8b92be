//! JSON bodies shared by the playlist and track routes.

use crate::config::MediaSettings;
use crate::ingestion::IngestionErrorKind;
use crate::playlist_store::Track;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CollectionResponse<T> {
    pub data: Vec<T>,
    pub info: CollectionInfo,
}

#[derive(Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CollectionInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination: Option<PaginationInfo>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PaginationInfo {
    pub current_page: usize,
    /// Number of items actually on this page.
    pub page_size: usize,
    pub total_pages: usize,
    pub total_items: usize,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TrackResponse {
    pub id: Uuid,
    pub title: String,
    pub url: String,
    pub date: String,
    pub duration: i32,
    pub ordinal_number: i32,
}

impl TrackResponse {
    pub fn from_track(track: &Track, media: &MediaSettings) -> Self {
        Self {
            id: track.id,
            title: track.title.clone(),
            url: media.track_url(&track.file_path),
            date: track.date.format(DATE_FORMAT).to_string(),
            duration: track.duration_seconds,
            ordinal_number: track.ordinal_number,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<IngestionErrorKind>,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            kind: None,
        }
    }
}

/// Query parameters common to the paginated list routes.
#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub page: Option<usize>,
    pub page_size: Option<usize>,
    pub order_by: Option<String>,
    pub order: Option<String>,
    pub search: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    /// 1-based.
    pub page: usize,
    pub page_size: usize,
}

impl ListQuery {
    /// Both `page` and `pageSize`, or neither.
    pub fn page_request(&self) -> Result<Option<PageRequest>, String> {
        match (self.page, self.page_size) {
            (None, None) => Ok(None),
            (Some(page), Some(page_size)) => {
                if page == 0 || page_size == 0 {
                    return Err("page and pageSize must be greater than zero.".to_string());
                }
                Ok(Some(PageRequest { page, page_size }))
            }
            _ => Err("Both page and pageSize must be provided.".to_string()),
        }
    }
}

/// Slices `items` to the requested page and fills in the pagination info.
pub fn paginate<T>(items: Vec<T>, request: Option<PageRequest>) -> (Vec<T>, Option<PaginationInfo>) {
    let Some(PageRequest { page, page_size }) = request else {
        return (items, None);
    };
    let total_items = items.len();
    let page_items: Vec<T> = items
        .into_iter()
        .skip((page - 1).saturating_mul(page_size))
        .take(page_size)
        .collect();
    let info = PaginationInfo {
        current_page: page,
        page_size: page_items.len(),
        total_pages: total_items.div_ceil(page_size),
        total_items,
    };
    (page_items, Some(info))
}
