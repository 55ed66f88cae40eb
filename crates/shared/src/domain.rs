use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ParseSortKeyError;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PhotoId(pub String);

impl PhotoId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PhotoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Result ordering understood by the search API (`order_by`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    #[default]
    Relevant,
    Latest,
}

impl SortKey {
    pub fn as_str(self) -> &'static str {
        match self {
            SortKey::Relevant => "relevant",
            SortKey::Latest => "latest",
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortKey {
    type Err = ParseSortKeyError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "relevant" => Ok(SortKey::Relevant),
            "latest" => Ok(SortKey::Latest),
            _ => Err(ParseSortKeyError(raw.to_string())),
        }
    }
}

/// One page request against the search API. Never mutated after it is issued;
/// follow-up pages are derived with [`SearchQuery::next_page`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub term: String,
    pub page: u32,
    pub sort: SortKey,
}

impl SearchQuery {
    pub fn new(term: impl Into<String>, sort: SortKey) -> Self {
        Self {
            term: term.into(),
            page: 1,
            sort,
        }
    }

    pub fn at_page(&self, page: u32) -> Self {
        Self {
            term: self.term.clone(),
            page: page.max(1),
            sort: self.sort,
        }
    }

    pub fn next_page(&self) -> Self {
        self.at_page(self.page.saturating_add(1))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultItem {
    pub id: PhotoId,
    pub display_text: Option<String>,
    pub image_ref: String,
    pub attribution: String,
    pub created_at: Option<DateTime<Utc>>,
    pub like_count: Option<u64>,
}

/// Items returned for one page. An empty page means the result set is exhausted.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ResultPage {
    pub items: Vec<ResultItem>,
    /// Page count reported by the API, when present in the envelope.
    pub total_pages: Option<u32>,
}

impl ResultPage {
    pub fn new(items: Vec<ResultItem>) -> Self {
        Self {
            items,
            total_pages: None,
        }
    }

    pub fn with_total_pages(mut self, total_pages: u32) -> Self {
        self.total_pages = Some(total_pages);
        self
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Whether another page may follow this one, given the page number it was fetched at.
    pub fn has_more_after(&self, page: u32) -> bool {
        if self.items.is_empty() {
            return false;
        }
        match self.total_pages {
            Some(total) => page < total,
            None => true,
        }
    }
}
