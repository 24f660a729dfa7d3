//! Retry policy with exponential backoff for idempotent GET requests.
//!
//! The policy is declarative: a set of retryable statuses, an attempt budget
//! and a backoff factor. [`send_with_retry`] applies it to a request factory.

use reqwest::header::{HeaderMap, RETRY_AFTER};
use reqwest::{RequestBuilder, StatusCode};
use std::time::Duration;
use tokio::time::sleep;

/// Statuses retried by default
pub const DEFAULT_RETRY_STATUSES: [u16; 5] = [429, 500, 502, 503, 504];

/// Configuration for retry behavior
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Maximum number of retries after the initial attempt
    pub max_retries: u32,
    /// Base factor for exponential backoff, in seconds
    pub backoff_factor: f64,
    /// Upper bound for a single backoff delay
    pub max_backoff: Duration,
    /// HTTP statuses that trigger a retry
    pub retry_statuses: Vec<u16>,
    /// Honor a `Retry-After` header on 429/503 responses
    pub respect_retry_after: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 5,
            backoff_factor: 0.8,
            max_backoff: Duration::from_secs(120),
            retry_statuses: DEFAULT_RETRY_STATUSES.to_vec(),
            respect_retry_after: true,
        }
    }
}

impl RetryPolicy {
    /// A policy that never retries
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    /// Set the retry budget
    pub fn max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Set the backoff factor (seconds)
    pub fn backoff_factor(mut self, backoff_factor: f64) -> Self {
        self.backoff_factor = backoff_factor;
        self
    }

    /// Whether a response status should be retried
    pub fn should_retry_status(&self, status: StatusCode) -> bool {
        self.retry_statuses.contains(&status.as_u16())
    }

    /// Backoff before the `retry`-th retry (1-based).
    ///
    /// The first retry is immediate; later ones wait
    /// `backoff_factor * 2^(retry - 1)` seconds, capped at `max_backoff`.
    pub fn backoff(&self, retry: u32) -> Duration {
        if retry <= 1 || self.backoff_factor <= 0.0 {
            return Duration::ZERO;
        }
        let exponent = (retry - 1).min(62) as i32;
        let secs = (self.backoff_factor * 2f64.powi(exponent)).min(self.max_backoff.as_secs_f64());
        Duration::from_secs_f64(secs)
    }

    /// Delay before the `retry`-th retry, preferring a server-supplied hint
    pub fn delay_for(&self, retry: u32, retry_after: Option<Duration>) -> Duration {
        match retry_after {
            Some(hint) if self.respect_retry_after => hint.min(self.max_backoff),
            _ => self.backoff(retry),
        }
    }
}

/// Transient failures that should trigger a retry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransientError {
    /// Retryable HTTP status
    Status(StatusCode),
    /// Request timed out (connect or read)
    Timeout,
    /// Could not connect
    Connect,
    /// Connection closed or reset before the full response was read
    Read,
}

impl TransientError {
    /// Check if a reqwest error represents a transient error
    pub fn from_reqwest_error(err: &reqwest::Error) -> Option<Self> {
        if err.is_timeout() {
            return Some(TransientError::Timeout);
        }
        if err.is_connect() {
            return Some(TransientError::Connect);
        }
        if err.is_request() || err.is_body() || err.is_decode() {
            return Some(TransientError::Read);
        }
        None
    }
}

/// Parse a `Retry-After` header given in seconds
pub fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
    headers
        .get(RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<u64>()
        .ok()
        .map(Duration::from_secs)
}

/// Final status and body of a request after retries
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetriedResponse {
    pub status: StatusCode,
    pub body: String,
}

/// Send a request and read its body, retrying transient failures according
/// to `policy`.
///
/// `make_request` is called once per attempt; reading the body is part of the
/// attempt, so a connection dropped mid-response is retried like any other
/// read failure. When the budget runs out on a retryable status the last
/// response is returned as-is so the caller can report it; exhausted network
/// failures are returned as errors.
pub async fn send_with_retry<F>(
    policy: &RetryPolicy,
    mut make_request: F,
) -> Result<RetriedResponse, reqwest::Error>
where
    F: FnMut() -> RequestBuilder,
{
    let mut retries = 0;

    loop {
        let (transient, retry_after) = match attempt(&mut make_request).await {
            Ok((response, retry_after)) => {
                let status = response.status;
                if !policy.should_retry_status(status) || retries >= policy.max_retries {
                    if retries > 0 {
                        tracing::debug!("Request finished with {} after {} retries", status, retries);
                    }
                    return Ok(response);
                }
                (TransientError::Status(status), retry_after)
            }
            Err(err) => match TransientError::from_reqwest_error(&err) {
                Some(transient) if retries < policy.max_retries => (transient, None),
                _ => return Err(err),
            },
        };

        retries += 1;
        let delay = policy.delay_for(retries, retry_after);
        tracing::warn!(
            "Transient failure {:?}, retry {}/{} in {:?}",
            transient,
            retries,
            policy.max_retries,
            delay
        );
        if !delay.is_zero() {
            sleep(delay).await;
        }
    }
}

/// One attempt: send, then read the whole body
async fn attempt<F>(make_request: &mut F) -> Result<(RetriedResponse, Option<Duration>), reqwest::Error>
where
    F: FnMut() -> RequestBuilder,
{
    let response = make_request().send().await?;
    let status = response.status();
    let retry_after =
        if status == StatusCode::TOO_MANY_REQUESTS || status == StatusCode::SERVICE_UNAVAILABLE {
            parse_retry_after(response.headers())
        } else {
            None
        };
    let body = response.text().await?;
    Ok((RetriedResponse { status, body }, retry_after))
}
