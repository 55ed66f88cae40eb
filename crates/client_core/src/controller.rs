//! Result-list controller: owns one session's accumulated results and merges
//! successive pages into them.
//!
//! Every request is tagged with a sequence number when it is issued. A
//! completion is applied only while its number is still the latest one, so a
//! page from a superseded search never lands in the current list.

use std::sync::Arc;

use shared::{
    domain::{PhotoId, ResultItem, SearchQuery, SortKey},
    error::TransportError,
};
use tokio::sync::{broadcast, Mutex};
use tracing::{debug, info, warn};

use crate::PhotoSearchApi;

pub const FETCH_FAILED_MESSAGE: &str = "Failed to fetch images. Please try again later.";

const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Read-only copy of the session state handed to the presentation layer.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot {
    pub items: Vec<ResultItem>,
    pub active_term: Option<String>,
    pub active_sort: SortKey,
    pub active_page: u32,
    pub is_loading: bool,
    pub last_error: Option<String>,
    pub has_more: bool,
}

#[derive(Debug, Clone)]
pub enum GalleryEvent {
    StateChanged(SessionSnapshot),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The page was merged into the session.
    Loaded { fetched: usize },
    /// The request failed; the error is recorded in the session.
    Failed,
    /// A newer search was issued before this request completed.
    Superseded,
    /// Nothing was requested.
    Skipped,
}

struct SessionState {
    items: Vec<ResultItem>,
    active_term: Option<String>,
    active_sort: SortKey,
    active_page: u32,
    is_loading: bool,
    last_error: Option<String>,
    has_more: bool,
    latest_request: u64,
}

impl SessionState {
    fn new() -> Self {
        Self {
            items: Vec::new(),
            active_term: None,
            active_sort: SortKey::default(),
            active_page: 1,
            is_loading: false,
            last_error: None,
            has_more: false,
            latest_request: 0,
        }
    }

    fn issue_request(&mut self) -> u64 {
        self.latest_request += 1;
        self.latest_request
    }

    fn is_current(&self, request_id: u64) -> bool {
        self.latest_request == request_id
    }

    fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            items: self.items.clone(),
            active_term: self.active_term.clone(),
            active_sort: self.active_sort,
            active_page: self.active_page,
            is_loading: self.is_loading,
            last_error: self.last_error.clone(),
            has_more: self.has_more,
        }
    }
}

pub struct GalleryController {
    api: Arc<dyn PhotoSearchApi>,
    inner: Mutex<SessionState>,
    events: broadcast::Sender<GalleryEvent>,
}

impl GalleryController {
    pub fn new(api: Arc<dyn PhotoSearchApi>) -> Arc<Self> {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Arc::new(Self {
            api,
            inner: Mutex::new(SessionState::new()),
            events,
        })
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<GalleryEvent> {
        self.events.subscribe()
    }

    pub async fn snapshot(&self) -> SessionSnapshot {
        self.inner.lock().await.snapshot()
    }

    pub async fn item(&self, id: &PhotoId) -> Option<ResultItem> {
        let guard = self.inner.lock().await;
        guard.items.iter().find(|item| &item.id == id).cloned()
    }

    /// Starts a new search, discarding accumulated results and superseding any
    /// request still in flight.
    pub async fn start_search(&self, term: impl Into<String>, sort: SortKey) -> FetchOutcome {
        let term = term.into().trim().to_string();
        if term.is_empty() {
            debug!("ignoring search with an empty term");
            return FetchOutcome::Skipped;
        }

        let (query, request_id) = {
            let mut guard = self.inner.lock().await;
            let request_id = guard.issue_request();
            guard.active_term = Some(term.clone());
            guard.active_sort = sort;
            guard.active_page = 1;
            guard.items.clear();
            guard.is_loading = true;
            guard.last_error = None;
            guard.has_more = false;
            self.emit_state(&guard);
            (SearchQuery::new(term, sort), request_id)
        };
        info!(term = %query.term, sort = %query.sort, request_id, "starting search");

        let result = self.api.fetch_page(&query).await;

        let mut guard = self.inner.lock().await;
        if !guard.is_current(request_id) {
            debug!(term = %query.term, request_id, "discarding superseded search response");
            return FetchOutcome::Superseded;
        }
        guard.is_loading = false;
        let outcome = match result {
            Ok(page) => {
                let fetched = page.len();
                guard.has_more = page.has_more_after(query.page);
                guard.items = page.items;
                info!(term = %query.term, fetched, has_more = guard.has_more, "search loaded");
                FetchOutcome::Loaded { fetched }
            }
            Err(err) => {
                warn!(term = %query.term, error = %err, "search failed");
                guard.last_error = Some(user_message(&err));
                FetchOutcome::Failed
            }
        };
        self.emit_state(&guard);
        outcome
    }

    /// Fetches the next page for the active search and appends it. Does nothing
    /// while a request is in flight or once the results are exhausted.
    pub async fn load_more(&self) -> FetchOutcome {
        let (query, request_id, previous_page) = {
            let mut guard = self.inner.lock().await;
            if guard.is_loading || !guard.has_more {
                debug!(
                    is_loading = guard.is_loading,
                    has_more = guard.has_more,
                    "load more ignored"
                );
                return FetchOutcome::Skipped;
            }
            let Some(term) = guard.active_term.clone() else {
                return FetchOutcome::Skipped;
            };
            let previous_page = guard.active_page;
            let request_id = guard.issue_request();
            guard.active_page = previous_page + 1;
            guard.is_loading = true;
            guard.last_error = None;
            self.emit_state(&guard);
            let query = SearchQuery::new(term, guard.active_sort).at_page(guard.active_page);
            (query, request_id, previous_page)
        };
        info!(term = %query.term, page = query.page, request_id, "loading more results");

        let result = self.api.fetch_page(&query).await;

        let mut guard = self.inner.lock().await;
        if !guard.is_current(request_id) {
            debug!(
                term = %query.term,
                page = query.page,
                request_id,
                "discarding stale page response"
            );
            return FetchOutcome::Superseded;
        }
        guard.is_loading = false;
        let outcome = match result {
            Ok(page) => {
                let fetched = page.len();
                guard.has_more = page.has_more_after(query.page);
                guard.items.extend(page.items);
                info!(
                    term = %query.term,
                    page = query.page,
                    fetched,
                    total = guard.items.len(),
                    has_more = guard.has_more,
                    "page appended"
                );
                FetchOutcome::Loaded { fetched }
            }
            Err(err) => {
                warn!(term = %query.term, page = query.page, error = %err, "load more failed");
                // Keep has_more so the same page can be requested again.
                guard.active_page = previous_page;
                guard.last_error = Some(user_message(&err));
                FetchOutcome::Failed
            }
        };
        self.emit_state(&guard);
        outcome
    }

    /// Re-runs the active search with a different ordering. Without an active
    /// term only the preferred ordering is recorded.
    pub async fn change_sort(&self, sort: SortKey) -> FetchOutcome {
        let term = {
            let mut guard = self.inner.lock().await;
            match guard.active_term.clone() {
                Some(term) => term,
                None => {
                    guard.active_sort = sort;
                    self.emit_state(&guard);
                    return FetchOutcome::Skipped;
                }
            }
        };
        self.start_search(term, sort).await
    }

    fn emit_state(&self, state: &SessionState) {
        let _ = self
            .events
            .send(GalleryEvent::StateChanged(state.snapshot()));
    }
}

fn user_message(err: &TransportError) -> String {
    format!("{FETCH_FAILED_MESSAGE} ({err})")
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
