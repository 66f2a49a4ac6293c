//! Crawler module for listing analysis and record extraction
//!
//! This module contains the core harvesting logic, including:
//! - HTTP fetching with retry logic
//! - Listing caption analysis and detail link extraction
//! - Detail page extraction
//! - Cross-page consistency checks and request pacing
//! - Two-phase harvest coordination with a confirmation gate

mod analyzer;
mod confirm;
mod consistency;
mod coordinator;
mod details;
mod fetcher;
mod links;
mod pacing;

pub use analyzer::{analyze, parse_caption, AnalyzeError, PageInfo, LISTING_PAGE_SIZE};
pub use confirm::{AutoApprove, Confirm, ConsolePrompt};
pub use consistency::{check_continuation, check_layout, check_link_count, check_total};
pub use coordinator::{Discovery, Harvester, PageLayout};
pub use details::extract_details;
pub use fetcher::{build_http_client, HttpFetcher, PageFetcher, RetryPolicy};
pub use links::{absolute_link, extract_links};
pub use pacing::{DelayRange, Pacing};

use crate::ParseError;
use scraper::Selector;

/// Parses a CSS selector, mapping failures into a [`ParseError`]
pub(crate) fn selector(css: &str) -> Result<Selector, ParseError> {
    Selector::parse(css).map_err(|e| ParseError::Selector(format!("{}: {:?}", css, e)))
}
