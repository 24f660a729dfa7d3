//! Utility modules supporting the harvest.
//!
//! - [`HttpClient`]: shared reqwest client with sensible defaults
//! - [`RetryPolicy`]: declarative retry policy with exponential backoff
//! - [`send_with_retry`]: send a GET request and read its body under a [`RetryPolicy`]
//! - [`looks_like_pdf`]: path-suffix check used by the PDF filter
//!
//! # Retry with Backoff
//!
//! ```rust,no_run
//! use dork_harvest::utils::{send_with_retry, HttpClient, RetryPolicy};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let client = HttpClient::new()?;
//! let policy = RetryPolicy::default().max_retries(3);
//! let response = send_with_retry(&policy, || client.client().get("https://serpapi.com")).await?;
//! println!("{} ({} bytes)", response.status, response.body.len());
//! # Ok(())
//! # }
//! ```

mod http;
mod retry;
mod url_filter;

pub use http::HttpClient;
pub use retry::{
    parse_retry_after, send_with_retry, RetriedResponse, RetryPolicy, TransientError,
    DEFAULT_RETRY_STATUSES,
};
pub use url_filter::{keep_link, looks_like_pdf};
