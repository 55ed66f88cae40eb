use thiserror::Error;

/// Failure talking to the search API. The only error kind the gallery
/// distinguishes; callers decide how to recover.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("no API access key configured")]
    MissingCredential,
    #[error("invalid API url '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },
    #[error("request failed: {0}")]
    Request(String),
    #[error("search API returned status {status}: {message}")]
    Status { status: u16, message: String },
    #[error("failed to decode search response: {0}")]
    Decode(String),
}

impl TransportError {
    pub fn status(&self) -> Option<u16> {
        match self {
            TransportError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown sort order '{0}', expected 'relevant' or 'latest'")]
pub struct ParseSortKeyError(pub String);
