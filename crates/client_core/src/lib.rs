use async_trait::async_trait;
use shared::{
    domain::{ResultPage, SearchQuery},
    error::TransportError,
};

mod controller;
pub mod search_client;

pub use controller::{
    FetchOutcome, GalleryController, GalleryEvent, SessionSnapshot, FETCH_FAILED_MESSAGE,
};
pub use search_client::{SearchClientConfig, UnsplashClient};

/// Source of search result pages. One call is one request: implementations must
/// not retry, cache or deduplicate.
#[async_trait]
pub trait PhotoSearchApi: Send + Sync {
    async fn fetch_page(&self, query: &SearchQuery) -> Result<ResultPage, TransportError>;
}
