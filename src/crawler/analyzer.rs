//! Listing page analysis
//!
//! Every listing page carries a caption inside its content container such as
//! `"1234 occurrences"` (first page) or
//! `"... showing occurrence 101-200 of 1234 occurrences"`. The caption is the only source
//! of pagination truth: totals and ranges are re-read from it on every request.

use crate::crawler::selector;
use crate::{ParseError, ValidationError};
use regex::Regex;
use scraper::Html;
use std::sync::OnceLock;
use thiserror::Error;

/// Maximum number of occurrences listed on one page
pub const LISTING_PAGE_SIZE: u64 = 100;

/// Pagination facts reported by one listing page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageInfo {
    /// Total occurrences in the catalog for the queried year
    pub total: u64,

    /// First occurrence on this page (1-indexed, inclusive)
    pub start: u64,

    /// Last occurrence on this page (inclusive)
    pub end: u64,
}

impl PageInfo {
    /// Creates page info, enforcing `1 <= start <= end <= total`
    pub fn new(total: u64, start: u64, end: u64) -> Result<Self, ValidationError> {
        if !(1 <= start && start <= end && end <= total) {
            return Err(ValidationError::InvalidRange { start, end, total });
        }
        Ok(Self { total, start, end })
    }

    /// Returns true if this page reaches the end of the catalog
    pub fn is_last(&self) -> bool {
        self.end >= self.total
    }

    /// Number of links the listing table should hold for this range
    pub fn expected_links(&self) -> usize {
        (self.end - self.start + 1).min(LISTING_PAGE_SIZE) as usize
    }

    pub fn range(&self) -> (u64, u64) {
        (self.start, self.end)
    }
}

/// Why a listing page could not be analyzed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnalyzeError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// Reads the caption of a listing page
///
/// # Returns
///
/// * `Ok(PageInfo)` - total and range of this page
/// * `Err(AnalyzeError::Parse)` - content container or caption missing, or no count found
/// * `Err(AnalyzeError::Validation)` - the reported range is not `1 <= start <= end <= total`
pub fn analyze(document: &Html) -> Result<PageInfo, AnalyzeError> {
    let content_selector = selector("div#contentwrapper")?;
    let caption_selector = selector("span.caption")?;

    let content = document
        .select(&content_selector)
        .next()
        .ok_or(ParseError::MissingAnchor("Content wrapper"))?;

    let caption = content
        .select(&caption_selector)
        .next()
        .ok_or(ParseError::MissingAnchor("Caption"))?;

    let text = caption.text().collect::<String>();
    parse_caption(&text)
}

/// Parses caption text into page info
///
/// A caption without a `showing occurrence A-B` range is a first page and covers
/// `1..=min(100, total)`.
pub fn parse_caption(text: &str) -> Result<PageInfo, AnalyzeError> {
    let unrecognized = || ParseError::UnrecognizedCaption(text.trim().to_string());

    let total = total_pattern()
        .captures(text)
        .and_then(|caps| parse_count(&caps[1]))
        .ok_or_else(unrecognized)?;

    let (start, end) = match range_pattern().captures(text) {
        Some(caps) => {
            let start = parse_count(&caps[1]).ok_or_else(unrecognized)?;
            let end = parse_count(&caps[2]).ok_or_else(unrecognized)?;
            (start, end)
        }
        None => (1, total.min(LISTING_PAGE_SIZE)),
    };

    Ok(PageInfo::new(total, start, end)?)
}

fn total_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(\d[\d,]*)\s*occurrences").expect("valid total pattern"))
}

fn range_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"showing occurrence\s+(\d[\d,]*)\s*-\s*(\d[\d,]*)")
            .expect("valid range pattern")
    })
}

/// Parses a count that may carry thousands separators
fn parse_count(digits: &str) -> Option<u64> {
    digits.replace(',', "").parse().ok()
}
