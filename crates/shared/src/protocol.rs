use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{PhotoId, ResultItem, ResultPage, SortKey};

/// Query string of `GET /search/photos`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SearchPhotosQuery {
    pub query: String,
    pub page: u32,
    pub per_page: u32,
    pub order_by: SortKey,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchPhotosResponse {
    #[serde(default)]
    pub total: Option<u64>,
    #[serde(default)]
    pub total_pages: Option<u32>,
    pub results: Vec<PhotoPayload>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhotoPayload {
    pub id: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub alt_description: Option<String>,
    pub urls: PhotoUrls,
    pub user: PhotoUser,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub likes: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhotoUrls {
    pub regular: String,
    #[serde(default)]
    pub small: Option<String>,
    #[serde(default)]
    pub full: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhotoUser {
    pub name: String,
    #[serde(default)]
    pub username: Option<String>,
}

/// Error body the API sends with non-success statuses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub errors: Vec<String>,
}

impl From<PhotoPayload> for ResultItem {
    fn from(value: PhotoPayload) -> Self {
        let display_text = value
            .description
            .filter(|text| !text.trim().is_empty())
            .or(value.alt_description.filter(|text| !text.trim().is_empty()));
        Self {
            id: PhotoId(value.id),
            display_text,
            image_ref: value.urls.regular,
            attribution: value.user.name,
            created_at: value.created_at,
            like_count: value.likes,
        }
    }
}

impl From<SearchPhotosResponse> for ResultPage {
    fn from(value: SearchPhotosResponse) -> Self {
        Self {
            items: value.results.into_iter().map(ResultItem::from).collect(),
            total_pages: value.total_pages,
        }
    }
}
