//! Run configuration.
//!
//! A [`RunConfig`] is resolved once per run from three layers, highest
//! precedence first: command-line values ([`ConfigOverrides`]), the
//! environment, and the optional configuration file ([`FileConfig`]).
//! Anything still unset falls back to the documented defaults.

mod file_config;

pub use file_config::{
    find_config_file, load_config, load_env_config, FileConfig, CONFIG_ENV_PREFIX,
    LOCAL_CONFIG_FILE,
};

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use crate::run::EXIT_CONFIG;
use crate::sources::{DEFAULT_ENGINE, SERPAPI_URL};
use crate::utils::RetryPolicy;

/// Environment variable holding the SerpAPI key
pub const API_KEY_ENV_VAR: &str = "SERPAPI_KEY";

pub const DEFAULT_OUTPUT: &str = "results.txt";
pub const DEFAULT_PAGE_SIZE: u32 = 10;
pub const DEFAULT_SLEEP_SECONDS: f64 = 1.0;
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;
/// 0 = unlimited
pub const DEFAULT_MAX_PAGES: u32 = 0;
/// 0 = disabled
pub const DEFAULT_STAGNATION_LIMIT: u32 = 0;

/// Immutable settings for one harvest
#[derive(Clone, PartialEq)]
pub struct RunConfig {
    pub query: String,
    pub output_path: PathBuf,
    pub api_key: String,
    pub page_size: u32,
    pub sleep_seconds: f64,
    pub timeout_seconds: u64,
    pub max_pages: u32,
    pub stagnation_limit: u32,
    pub include_non_pdf: bool,
    pub endpoint: String,
    pub engine: String,
    pub retry: RetryPolicy,
}

impl RunConfig {
    /// Configuration with default settings for the given query and key
    pub fn new(query: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            output_path: PathBuf::from(DEFAULT_OUTPUT),
            api_key: api_key.into(),
            page_size: DEFAULT_PAGE_SIZE,
            sleep_seconds: DEFAULT_SLEEP_SECONDS,
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
            max_pages: DEFAULT_MAX_PAGES,
            stagnation_limit: DEFAULT_STAGNATION_LIMIT,
            include_non_pdf: false,
            endpoint: SERPAPI_URL.to_string(),
            engine: DEFAULT_ENGINE.to_string(),
            retry: RetryPolicy::default(),
        }
    }

    pub fn output_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_path = path.into();
        self
    }

    pub fn page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    pub fn sleep_seconds(mut self, seconds: f64) -> Self {
        self.sleep_seconds = seconds;
        self
    }

    pub fn timeout_seconds(mut self, seconds: u64) -> Self {
        self.timeout_seconds = seconds;
        self
    }

    pub fn max_pages(mut self, max_pages: u32) -> Self {
        self.max_pages = max_pages;
        self
    }

    pub fn stagnation_limit(mut self, pages: u32) -> Self {
        self.stagnation_limit = pages;
        self
    }

    pub fn include_non_pdf(mut self, include: bool) -> Self {
        self.include_non_pdf = include;
        self
    }

    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Pause between pages; zero when the value is not a representable
    /// non-negative duration
    pub fn sleep(&self) -> Duration {
        Duration::try_from_secs_f64(self.sleep_seconds).unwrap_or(Duration::ZERO)
    }

    /// Timeout for each request
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    /// Check numeric bounds
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.query.trim().is_empty() {
            return Err(ConfigError::MissingQuery);
        }
        if self.page_size == 0 {
            return Err(ConfigError::Invalid("--num must be at least 1".to_string()));
        }
        if Duration::try_from_secs_f64(self.sleep_seconds).is_err() {
            return Err(ConfigError::Invalid(
                "--sleep must be a non-negative number of seconds".to_string(),
            ));
        }
        if self.timeout_seconds == 0 {
            return Err(ConfigError::Invalid("--timeout must be greater than 0".to_string()));
        }
        if !self.retry.backoff_factor.is_finite() || self.retry.backoff_factor < 0.0 {
            return Err(ConfigError::Invalid(
                "--backoff must be a non-negative number".to_string(),
            ));
        }
        Ok(())
    }

    /// Resolve a configuration from CLI values, an environment lookup and
    /// file settings.
    pub fn resolve<E>(
        overrides: ConfigOverrides,
        file: &FileConfig,
        env: E,
    ) -> Result<Self, ConfigError>
    where
        E: Fn(&str) -> Option<String>,
    {
        let api_key = resolve_api_key(overrides.api_key.as_deref(), &env, file.api_key.as_deref())?;
        let query = overrides
            .query
            .or_else(|| file.query.clone())
            .filter(|q| !q.trim().is_empty())
            .ok_or(ConfigError::MissingQuery)?;

        let defaults = RetryPolicy::default();
        let retry = RetryPolicy {
            max_retries: overrides.retries.or(file.retries).unwrap_or(defaults.max_retries),
            backoff_factor: overrides.backoff.or(file.backoff).unwrap_or(defaults.backoff_factor),
            ..defaults
        };

        let config = Self {
            query,
            output_path: overrides
                .output
                .or_else(|| file.output.clone())
                .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT)),
            api_key,
            page_size: overrides.num.or(file.num).unwrap_or(DEFAULT_PAGE_SIZE),
            sleep_seconds: overrides.sleep.or(file.sleep).unwrap_or(DEFAULT_SLEEP_SECONDS),
            timeout_seconds: overrides.timeout.or(file.timeout).unwrap_or(DEFAULT_TIMEOUT_SECONDS),
            max_pages: overrides.max_pages.or(file.max_pages).unwrap_or(DEFAULT_MAX_PAGES),
            stagnation_limit: overrides
                .stop_after
                .or(file.stop_after)
                .unwrap_or(DEFAULT_STAGNATION_LIMIT),
            include_non_pdf: overrides.include_non_pdf || file.include_non_pdf.unwrap_or(false),
            endpoint: overrides
                .endpoint
                .or_else(|| file.endpoint.clone())
                .unwrap_or_else(|| SERPAPI_URL.to_string()),
            engine: file.engine.clone().unwrap_or_else(|| DEFAULT_ENGINE.to_string()),
            retry,
        };

        config.validate()?;
        Ok(config)
    }

    /// Resolve against the process environment
    pub fn from_env(overrides: ConfigOverrides, file: &FileConfig) -> Result<Self, ConfigError> {
        Self::resolve(overrides, file, |name| std::env::var(name).ok())
    }
}

impl fmt::Debug for RunConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RunConfig")
            .field("query", &self.query)
            .field("output_path", &self.output_path)
            .field("api_key", &"<redacted>")
            .field("page_size", &self.page_size)
            .field("sleep_seconds", &self.sleep_seconds)
            .field("timeout_seconds", &self.timeout_seconds)
            .field("max_pages", &self.max_pages)
            .field("stagnation_limit", &self.stagnation_limit)
            .field("include_non_pdf", &self.include_non_pdf)
            .field("endpoint", &self.endpoint)
            .field("engine", &self.engine)
            .field("retry", &self.retry)
            .finish()
    }
}

/// Values given on the command line; `None` means "not given"
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub query: Option<String>,
    pub output: Option<PathBuf>,
    pub api_key: Option<String>,
    pub num: Option<u32>,
    pub sleep: Option<f64>,
    pub timeout: Option<u64>,
    pub max_pages: Option<u32>,
    pub stop_after: Option<u32>,
    pub include_non_pdf: bool,
    pub retries: Option<u32>,
    pub backoff: Option<f64>,
    pub endpoint: Option<String>,
}

/// Pick the API key: explicit value, then `SERPAPI_KEY`, then the file.
///
/// Empty values count as absent.
pub fn resolve_api_key<E>(
    explicit: Option<&str>,
    env: E,
    file: Option<&str>,
) -> Result<String, ConfigError>
where
    E: Fn(&str) -> Option<String>,
{
    explicit
        .map(str::to_string)
        .filter(|k| !k.is_empty())
        .or_else(|| env(API_KEY_ENV_VAR).filter(|k| !k.is_empty()))
        .or_else(|| file.map(str::to_string).filter(|k| !k.is_empty()))
        .ok_or(ConfigError::MissingApiKey)
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing SerpAPI key. Set SERPAPI_KEY or use --api-key")]
    MissingApiKey,

    #[error("Missing dork query. Pass it as an argument or set `query` in the config file")]
    MissingQuery,

    #[error("Invalid setting: {0}")]
    Invalid(String),

    #[error("Config file error: {0}")]
    File(#[from] config::ConfigError),
}

impl ConfigError {
    /// Process exit code for this failure
    pub fn exit_code(&self) -> u8 {
        EXIT_CONFIG
    }
}
