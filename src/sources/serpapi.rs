//! SerpAPI page source.

use async_trait::async_trait;
use reqwest::StatusCode;
use std::fmt;

use crate::config::RunConfig;
use crate::models::SerpPage;
use crate::sources::{PageRequest, PageSource, TransportError};
use crate::utils::{send_with_retry, HttpClient, RetryPolicy};

/// Default SerpAPI search endpoint
pub const SERPAPI_URL: &str = "https://serpapi.com/search.json";

/// Search engine requested from SerpAPI
pub const DEFAULT_ENGINE: &str = "google";

/// SerpAPI source issuing one GET per page
#[derive(Clone)]
pub struct SerpApiSource {
    client: HttpClient,
    endpoint: String,
    engine: String,
    api_key: String,
    retry: RetryPolicy,
}

impl SerpApiSource {
    /// Create a source for the public endpoint with the default retry policy
    pub fn new(api_key: impl Into<String>) -> Result<Self, TransportError> {
        Ok(Self {
            client: HttpClient::new()?,
            endpoint: SERPAPI_URL.to_string(),
            engine: DEFAULT_ENGINE.to_string(),
            api_key: api_key.into(),
            retry: RetryPolicy::default(),
        })
    }

    /// Create a source from a resolved run configuration
    pub fn from_config(config: &RunConfig) -> Result<Self, TransportError> {
        Ok(Self::new(config.api_key.clone())?
            .with_endpoint(config.endpoint.clone())
            .with_engine(config.engine.clone())
            .with_retry_policy(config.retry.clone()))
    }

    /// Point the source at another endpoint (proxies, test servers)
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_engine(mut self, engine: impl Into<String>) -> Self {
        self.engine = engine.into();
        self
    }

    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl fmt::Debug for SerpApiSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SerpApiSource")
            .field("endpoint", &self.endpoint)
            .field("engine", &self.engine)
            .field("api_key", &"<redacted>")
            .field("retry", &self.retry)
            .finish()
    }
}

#[async_trait]
impl PageSource for SerpApiSource {
    fn id(&self) -> &str {
        "serpapi"
    }

    async fn fetch_page(&self, request: &PageRequest<'_>) -> Result<SerpPage, TransportError> {
        let start = request.start.to_string();
        let num = request.num.to_string();
        let params = [
            ("engine", self.engine.as_str()),
            ("q", request.query),
            ("api_key", self.api_key.as_str()),
            ("start", start.as_str()),
            ("num", num.as_str()),
        ];

        tracing::debug!(
            "GET {} (engine={}, start={}, num={})",
            self.endpoint,
            self.engine,
            request.start,
            request.num
        );

        let response = send_with_retry(&self.retry, || {
            self.client
                .client()
                .get(&self.endpoint)
                .query(&params)
                .timeout(request.timeout)
        })
        .await?;

        if response.status != StatusCode::OK {
            return Err(TransportError::status(response.status.as_u16(), &response.body));
        }

        Ok(serde_json::from_str(&response.body)?)
    }
}
