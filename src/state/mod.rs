//! State module for tracking harvest progress
//!
//! # Components
//!
//! - `CrawlPhase`: the discovery/extraction state machine of a per-year harvest
//! - `CrawlState`: records, current page and failures of one extraction pass

mod crawl_state;
mod phase;

// Re-export main types
pub use crawl_state::{CrawlState, FailedLink};
pub use phase::CrawlPhase;
