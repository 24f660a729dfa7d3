//! Page sources for the pagination loop.
//!
//! The loop only needs one thing from a backend: "give me the page starting at
//! this offset". The [`PageSource`] trait captures that, [`SerpApiSource`]
//! implements it over HTTP and [`ScriptedSource`] replays canned pages for
//! tests.

pub mod mock;
mod serpapi;

pub use mock::ScriptedSource;
pub use serpapi::{SerpApiSource, DEFAULT_ENGINE, SERPAPI_URL};

use crate::models::SerpPage;
use async_trait::async_trait;
use std::time::Duration;

/// Maximum number of body characters kept in a status error
pub const ERROR_EXCERPT_CHARS: usize = 200;

/// Parameters for fetching one page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest<'a> {
    /// Search expression
    pub query: &'a str,
    /// 0-based offset of the first result
    pub start: u64,
    /// Results per page
    pub num: u32,
    /// Timeout for the individual request
    pub timeout: Duration,
}

/// A backend that can return one page of search results.
#[async_trait]
pub trait PageSource: Send + Sync + std::fmt::Debug {
    /// Short identifier used in logs
    fn id(&self) -> &str;

    /// Fetch and decode a single page.
    ///
    /// Any non-200 final status is an error; a 200 is returned decoded
    /// regardless of its logical content.
    async fn fetch_page(&self, request: &PageRequest<'_>) -> Result<SerpPage, TransportError>;
}

/// Errors that can occur when fetching a page
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Non-200 status after retries were exhausted
    #[error("HTTP {status}: {excerpt}")]
    Status { status: u16, excerpt: String },

    /// Network or HTTP client error
    #[error("Network error: {0}")]
    Network(String),

    /// Body of a 200 response was not valid JSON
    #[error("Parse error: {0}")]
    Decode(String),
}

impl TransportError {
    /// Build a status error, truncating the body to [`ERROR_EXCERPT_CHARS`]
    pub fn status(status: u16, body: &str) -> Self {
        TransportError::Status {
            status,
            excerpt: body.chars().take(ERROR_EXCERPT_CHARS).collect(),
        }
    }
}

impl From<reqwest::Error> for TransportError {
    /// The request URL carries the API key in its query, so it is dropped
    /// and the innermost cause is kept instead.
    fn from(err: reqwest::Error) -> Self {
        let err = err.without_url();
        let mut message = err.to_string();
        let mut source = std::error::Error::source(&err);
        let mut root = None;
        while let Some(cause) = source {
            root = Some(cause.to_string());
            source = cause.source();
        }
        if let Some(root) = root {
            message = format!("{} ({})", message, root);
        }
        TransportError::Network(message)
    }
}

impl From<serde_json::Error> for TransportError {
    fn from(err: serde_json::Error) -> Self {
        TransportError::Decode(format!("JSON: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_excerpt_is_truncated() {
        let body = "x".repeat(500);
        match TransportError::status(503, &body) {
            TransportError::Status { status, excerpt } => {
                assert_eq!(status, 503);
                assert_eq!(excerpt.chars().count(), ERROR_EXCERPT_CHARS);
            }
            other => panic!("Expected Status error, got {:?}", other),
        }
    }

    #[test]
    fn test_status_excerpt_counts_characters() {
        let body = "é".repeat(250);
        let err = TransportError::status(500, &body);
        assert_eq!(err.to_string(), format!("HTTP 500: {}", "é".repeat(200)));
    }

    #[test]
    fn test_decode_error_display() {
        let err: TransportError = serde_json::from_str::<SerpPage>("not json")
            .unwrap_err()
            .into();
        assert!(err.to_string().starts_with("Parse error: JSON:"));
    }
}
