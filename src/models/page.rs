//! SerpAPI page models and the classified outcome of a page.

use serde::{Deserialize, Serialize};

/// Decoded body of one SerpAPI search page.
///
/// Only the fields the harvest inspects are modeled; everything else in the
/// response is ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerpPage {
    /// Logical error reported with a 200 status
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Organic search results, in ranking order
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organic_results: Option<Vec<OrganicResult>>,
}

impl SerpPage {
    /// A page carrying the given result links
    pub fn with_links<I, S>(links: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            error: None,
            organic_results: Some(links.into_iter().map(OrganicResult::new).collect()),
        }
    }

    /// A page carrying only an error message
    pub fn with_error(message: impl Into<String>) -> Self {
        Self {
            error: Some(message.into()),
            organic_results: None,
        }
    }
}

/// A single organic search result
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrganicResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

impl OrganicResult {
    pub fn new(link: impl Into<String>) -> Self {
        Self {
            link: Some(link.into()),
            ..Default::default()
        }
    }
}

/// What a fetched page means for the pagination loop
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageOutcome {
    /// Result links in API order (may contain duplicates)
    Results(Vec<String>),
    /// No more results for this query
    EndOfResults,
    /// API-reported error other than end of results
    HardError(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_full_page() {
        let body = r#"{
            "search_metadata": {"status": "Success"},
            "organic_results": [
                {"position": 1, "title": "Annual report", "link": "https://example.com/a.pdf"},
                {"position": 2, "title": "No link here"}
            ]
        }"#;

        let page: SerpPage = serde_json::from_str(body).unwrap();
        assert_eq!(page.error, None);
        let results = page.organic_results.unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].link.as_deref(), Some("https://example.com/a.pdf"));
        assert_eq!(results[1].link, None);
    }

    #[test]
    fn test_deserialize_error_page() {
        let page: SerpPage =
            serde_json::from_str(r#"{"error": "Invalid API key."}"#).unwrap();
        assert_eq!(page.error.as_deref(), Some("Invalid API key."));
        assert_eq!(page.organic_results, None);
    }

    #[test]
    fn test_deserialize_null_results() {
        let page: SerpPage = serde_json::from_str(r#"{"organic_results": null}"#).unwrap();
        assert_eq!(page.organic_results, None);
    }

    #[test]
    fn test_with_links() {
        let page = SerpPage::with_links(["https://a.example/x.pdf"]);
        let json = serde_json::to_string(&page).unwrap();
        assert_eq!(json, r#"{"organic_results":[{"link":"https://a.example/x.pdf"}]}"#);
    }
}
