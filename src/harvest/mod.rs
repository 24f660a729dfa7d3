//! Pagination loop.
//!
//! [`Harvester`] walks result pages one at a time, keeps the links that pass
//! the URL filter and decides when to stop:
//!
//! - the page cap (`max_pages`) is reached,
//! - the API reports no more results (or returns an empty page),
//! - `stagnation_limit` consecutive pages added nothing new.
//!
//! API-reported errors and transport failures abort the run instead.

mod classify;

pub use classify::{classify, is_end_of_results, END_OF_RESULTS_MARKER};

use std::collections::BTreeSet;
use std::fmt;

use crate::config::RunConfig;
use crate::models::PageOutcome;
use crate::sources::{PageRequest, PageSource, TransportError};
use crate::utils::keep_link;

/// Why a run ended without error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// `max_pages` pages were fetched
    PageCap { max_pages: u32 },
    /// The API has no more results
    Exhausted,
    /// `pages` consecutive pages without new URLs reached the `limit`
    Stagnation { pages: u32, limit: u32 },
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StopReason::PageCap { max_pages } => write!(f, "Reached --max-pages {}", max_pages),
            StopReason::Exhausted => write!(f, "End of results (SerpAPI returned no more results)."),
            StopReason::Stagnation { pages, limit } => write!(
                f,
                "No new URLs for {} consecutive pages; stopping (--stop-after={}).",
                pages, limit
            ),
        }
    }
}

/// Errors that abort a harvest
#[derive(Debug, thiserror::Error)]
pub enum HarvestError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Logical error reported by the API
    #[error("SerpAPI error: {0}")]
    Api(String),
}

/// Mutable loop bookkeeping, owned by a single run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoopState {
    /// 1-based index of the page about to be fetched
    pub page_index: u32,
    /// Offset of the first result of that page
    pub start_offset: u64,
    /// Pages in a row that contributed no new URL
    pub consecutive_stagnant_pages: u32,
}

impl Default for LoopState {
    fn default() -> Self {
        Self {
            page_index: 1,
            start_offset: 0,
            consecutive_stagnant_pages: 0,
        }
    }
}

impl LoopState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the next fetch would exceed the page cap (0 = unlimited)
    pub fn cap_reached(&self, max_pages: u32) -> bool {
        max_pages > 0 && self.page_index > max_pages
    }

    /// Record how many new URLs the last page contributed
    pub fn record_page(&mut self, new_count: usize) {
        if new_count == 0 {
            self.consecutive_stagnant_pages += 1;
        } else {
            self.consecutive_stagnant_pages = 0;
        }
    }

    /// Whether the stagnation threshold is met (0 = disabled)
    pub fn stagnated(&self, stagnation_limit: u32) -> bool {
        stagnation_limit > 0 && self.consecutive_stagnant_pages >= stagnation_limit
    }

    /// Move on to the next page
    pub fn advance(&mut self, page_size: u32) {
        self.start_offset += u64::from(page_size);
        self.page_index += 1;
    }
}

/// Per-page progress event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageSummary {
    pub page: u32,
    /// Organic results returned on this page, with or without a link
    pub results: usize,
    /// Links added to the set by this page
    pub new_urls: usize,
    /// Size of the set after this page
    pub total: usize,
}

/// Receiver for progress events
pub trait ProgressSink: Send + Sync {
    fn started(&self, _query: &str) {}

    fn page(&self, _summary: &PageSummary) {}

    fn stopped(&self, _reason: &StopReason) {}
}

/// Progress sink that discards everything
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentProgress;

impl ProgressSink for SilentProgress {}

/// Outcome of a successful harvest
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarvestReport {
    /// Deduplicated URLs, in ascending order
    pub urls: BTreeSet<String>,
    pub stop_reason: StopReason,
    /// Number of fetch attempts made
    pub pages_fetched: u32,
}

/// Add the links that pass the filter, returning how many were new
pub fn absorb_links(urls: &mut BTreeSet<String>, links: &[String], include_non_pdf: bool) -> usize {
    links
        .iter()
        .filter(|link| keep_link(link, include_non_pdf))
        .filter(|link| urls.insert((*link).clone()))
        .count()
}

/// Sequential pagination driver
pub struct Harvester<'a, S: PageSource + ?Sized> {
    source: &'a S,
    config: &'a RunConfig,
    progress: &'a dyn ProgressSink,
}

impl<'a, S: PageSource + ?Sized> Harvester<'a, S> {
    pub fn new(source: &'a S, config: &'a RunConfig) -> Self {
        Self {
            source,
            config,
            progress: &SilentProgress,
        }
    }

    pub fn with_progress(mut self, progress: &'a dyn ProgressSink) -> Self {
        self.progress = progress;
        self
    }

    /// Fetch pages until a stop condition is met
    pub async fn run(&self) -> Result<HarvestReport, HarvestError> {
        let config = self.config;
        let mut state = LoopState::new();
        let mut urls = BTreeSet::new();
        let mut pages_fetched = 0;

        self.progress.started(&config.query);
        tracing::info!("Harvesting '{}' from {}", config.query, self.source.id());

        let stop_reason = loop {
            if state.cap_reached(config.max_pages) {
                break StopReason::PageCap {
                    max_pages: config.max_pages,
                };
            }

            let request = PageRequest {
                query: &config.query,
                start: state.start_offset,
                num: config.page_size,
                timeout: config.timeout(),
            };
            let page = self.source.fetch_page(&request).await?;
            pages_fetched += 1;

            let returned = page.organic_results.as_ref().map_or(0, Vec::len);
            let links = match classify(&page) {
                PageOutcome::Results(links) if !links.is_empty() => links,
                PageOutcome::Results(_) | PageOutcome::EndOfResults => break StopReason::Exhausted,
                PageOutcome::HardError(message) => {
                    tracing::error!("SerpAPI error on page {}: {}", state.page_index, message);
                    return Err(HarvestError::Api(message));
                }
            };

            let new_count = absorb_links(&mut urls, &links, config.include_non_pdf);
            let summary = PageSummary {
                page: state.page_index,
                results: returned,
                new_urls: new_count,
                total: urls.len(),
            };
            tracing::info!(
                page = summary.page,
                start = state.start_offset,
                results = summary.results,
                new_urls = summary.new_urls,
                total = summary.total,
                "Processed page"
            );
            self.progress.page(&summary);

            state.record_page(new_count);
            if state.stagnated(config.stagnation_limit) {
                break StopReason::Stagnation {
                    pages: state.consecutive_stagnant_pages,
                    limit: config.stagnation_limit,
                };
            }

            let pause = config.sleep();
            if !pause.is_zero() {
                tokio::time::sleep(pause).await;
            }
            state.advance(config.page_size);
        };

        tracing::info!("Stopped after {} fetches: {}", pages_fetched, stop_reason);
        self.progress.stopped(&stop_reason);

        Ok(HarvestReport {
            urls,
            stop_reason,
            pages_fetched,
        })
    }
}
