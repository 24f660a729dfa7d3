//! Core data models for SerpAPI pages.

mod page;

pub use page::{OrganicResult, PageOutcome, SerpPage};
