//! # Dork Harvest
//!
//! Collect the URLs a Google dork returns through SerpAPI and export them to a
//! text or JSON file.
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - [`config`]: Run configuration resolved from CLI, environment and config file
//! - [`sources`]: Page sources (SerpAPI over HTTP, scripted source for tests)
//! - [`harvest`]: Page classification and the pagination loop
//! - [`output`]: Text / JSON result writer
//! - [`run`]: A complete run, from first page to output file
//! - [`ui`]: Console status lines
//! - [`utils`]: HTTP client, retry policy and URL filtering

pub mod config;
pub mod harvest;
pub mod models;
pub mod output;
pub mod run;
pub mod sources;
pub mod ui;
pub mod utils;

// Re-export commonly used types
pub use crate::config::RunConfig;
pub use crate::harvest::{HarvestReport, Harvester, StopReason};
pub use crate::sources::{PageSource, SerpApiSource};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
