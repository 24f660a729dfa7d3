//! Scripted page source for testing purposes.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

use crate::models::SerpPage;
use crate::sources::{PageRequest, PageSource, TransportError};

/// A source that replays a fixed sequence of responses and records every
/// offset it was asked for.
///
/// Once the script runs out it answers with an empty page, which the
/// classifier treats as exhaustion.
#[derive(Debug, Default)]
pub struct ScriptedSource {
    script: Mutex<VecDeque<Result<SerpPage, TransportError>>>,
    requests: Mutex<Vec<u64>>,
}

impl ScriptedSource {
    /// Create an empty scripted source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a source that returns the given pages in order.
    pub fn from_pages<I>(pages: I) -> Self
    where
        I: IntoIterator<Item = SerpPage>,
    {
        let source = Self::new();
        for page in pages {
            source.push_page(page);
        }
        source
    }

    /// Append a page to the script.
    pub fn push_page(&self, page: SerpPage) {
        self.lock_script().push_back(Ok(page));
    }

    /// Append a transport failure to the script.
    pub fn push_error(&self, error: TransportError) {
        self.lock_script().push_back(Err(error));
    }

    /// Start offsets of every fetch so far.
    pub fn requested_offsets(&self) -> Vec<u64> {
        self.requests
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Number of fetches so far.
    pub fn fetch_count(&self) -> usize {
        self.requested_offsets().len()
    }

    fn lock_script(&self) -> std::sync::MutexGuard<'_, VecDeque<Result<SerpPage, TransportError>>> {
        self.script
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl PageSource for ScriptedSource {
    fn id(&self) -> &str {
        "scripted"
    }

    async fn fetch_page(&self, request: &PageRequest<'_>) -> Result<SerpPage, TransportError> {
        self.requests
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(request.start);
        self.lock_script()
            .pop_front()
            .unwrap_or_else(|| Ok(SerpPage::default()))
    }
}
