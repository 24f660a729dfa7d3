//! Classification of decoded SerpAPI pages.

use crate::models::{PageOutcome, SerpPage};

/// Message SerpAPI returns when paging beyond the available results
pub const END_OF_RESULTS_MARKER: &str = "Google hasn't returned any results for this query";

/// Whether an API error message means "no more results"
pub fn is_end_of_results(message: &str) -> bool {
    message.contains(END_OF_RESULTS_MARKER)
}

/// Interpret a decoded page.
///
/// An empty or missing result list is treated exactly like the end-of-results
/// error. Entries without a (non-empty) link are skipped.
pub fn classify(page: &SerpPage) -> PageOutcome {
    if let Some(error) = page.error.as_deref().filter(|e| !e.is_empty()) {
        if is_end_of_results(error) {
            return PageOutcome::EndOfResults;
        }
        return PageOutcome::HardError(error.to_string());
    }

    match page.organic_results.as_deref() {
        None | Some([]) => PageOutcome::EndOfResults,
        Some(results) => PageOutcome::Results(
            results
                .iter()
                .filter_map(|r| r.link.as_deref())
                .filter(|link| !link.is_empty())
                .map(str::to_string)
                .collect(),
        ),
    }
}
