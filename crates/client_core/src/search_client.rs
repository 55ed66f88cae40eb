//! HTTP client for the photo search endpoint.

use async_trait::async_trait;
use reqwest::{header::AUTHORIZATION, Client};
use shared::{
    domain::{ResultPage, SearchQuery},
    error::TransportError,
    protocol::{ApiErrorBody, SearchPhotosQuery, SearchPhotosResponse},
};
use tracing::{debug, warn};
use url::Url;

use crate::PhotoSearchApi;

pub const DEFAULT_API_URL: &str = "https://api.unsplash.com";
pub const DEFAULT_PER_PAGE: u32 = 20;
pub const MAX_PER_PAGE: u32 = 30;

const SEARCH_PHOTOS_PATH: &str = "search/photos";
const API_VERSION: &str = "v1";
const ERROR_BODY_EXCERPT_CHARS: usize = 200;

#[derive(Debug, Clone)]
pub struct SearchClientConfig {
    pub api_url: String,
    pub access_key: String,
    pub per_page: u32,
}

impl SearchClientConfig {
    pub fn new(access_key: impl Into<String>) -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            access_key: access_key.into(),
            per_page: DEFAULT_PER_PAGE,
        }
    }
}

/// Issues one `GET /search/photos` per page. No retries, no caching: every call
/// goes to the network.
#[derive(Debug, Clone)]
pub struct UnsplashClient {
    http: Client,
    search_url: Url,
    access_key: String,
    per_page: u32,
}

impl UnsplashClient {
    pub fn new(config: SearchClientConfig) -> Result<Self, TransportError> {
        let access_key = config.access_key.trim().to_string();
        if access_key.is_empty() {
            return Err(TransportError::MissingCredential);
        }
        let search_url = search_url(&config.api_url)?;
        let http = Client::builder()
            .user_agent(concat!("gallery/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| TransportError::Request(e.to_string()))?;

        Ok(Self {
            http,
            search_url,
            access_key,
            per_page: config.per_page.clamp(1, MAX_PER_PAGE),
        })
    }

    pub fn per_page(&self) -> u32 {
        self.per_page
    }

    pub fn search_url(&self) -> &Url {
        &self.search_url
    }

    async fn fetch_page_impl(&self, query: &SearchQuery) -> Result<ResultPage, TransportError> {
        let params = SearchPhotosQuery {
            query: query.term.clone(),
            page: query.page.max(1),
            per_page: self.per_page,
            order_by: query.sort,
        };
        debug!(
            term = %params.query,
            page = params.page,
            per_page = params.per_page,
            order_by = %params.order_by,
            "requesting search page"
        );

        let response = self
            .http
            .get(self.search_url.clone())
            .header(AUTHORIZATION, format!("Client-ID {}", self.access_key))
            .header("Accept-Version", API_VERSION)
            .query(&params)
            .send()
            .await
            .map_err(|e| TransportError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = describe_error_body(&body, status.canonical_reason());
            warn!(status = status.as_u16(), %message, "search request rejected");
            return Err(TransportError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| TransportError::Request(e.to_string()))?;
        let envelope: SearchPhotosResponse =
            serde_json::from_slice(&bytes).map_err(|e| TransportError::Decode(e.to_string()))?;
        let page = ResultPage::from(envelope);
        debug!(
            page = params.page,
            items = page.len(),
            total_pages = ?page.total_pages,
            "search page decoded"
        );
        Ok(page)
    }
}

#[async_trait]
impl PhotoSearchApi for UnsplashClient {
    async fn fetch_page(&self, query: &SearchQuery) -> Result<ResultPage, TransportError> {
        self.fetch_page_impl(query).await
    }
}

/// Resolves the search endpoint below `api_url`, keeping any path prefix.
pub fn search_url(api_url: &str) -> Result<Url, TransportError> {
    let raw = api_url.trim();
    let mut base = Url::parse(raw).map_err(|e| TransportError::InvalidBaseUrl {
        url: raw.to_string(),
        reason: e.to_string(),
    })?;
    if base.cannot_be_a_base() || !matches!(base.scheme(), "http" | "https") {
        return Err(TransportError::InvalidBaseUrl {
            url: raw.to_string(),
            reason: "expected an http(s) url".to_string(),
        });
    }
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    base.join(SEARCH_PHOTOS_PATH)
        .map_err(|e| TransportError::InvalidBaseUrl {
            url: raw.to_string(),
            reason: e.to_string(),
        })
}

fn describe_error_body(body: &str, reason: Option<&str>) -> String {
    if let Ok(parsed) = serde_json::from_str::<ApiErrorBody>(body) {
        if !parsed.errors.is_empty() {
            return parsed.errors.join("; ");
        }
    }
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return reason.unwrap_or("no response body").to_string();
    }
    trimmed.chars().take(ERROR_BODY_EXCERPT_CHARS).collect()
}

#[cfg(test)]
#[path = "tests/search_client_tests.rs"]
mod tests;
