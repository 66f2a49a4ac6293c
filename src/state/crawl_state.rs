//! Transient per-year extraction state

use crate::record::AccidentRecord;
use std::collections::HashSet;

/// A detail link that could not be extracted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedLink {
    /// Listing page the link was found on
    pub page: u32,
    pub url: String,
    pub reason: String,
}

/// In-memory state of one extraction pass
///
/// Records keep crawl order. The total is fixed when the state is created and every page
/// is checked against it.
#[derive(Debug, Clone)]
pub struct CrawlState {
    year: u32,
    total: u64,
    page: u32,
    records: Vec<AccidentRecord>,
    seen_urls: HashSet<String>,
    failed_links: Vec<FailedLink>,
}

impl CrawlState {
    /// Creates state for a crawl of `year` whose catalog holds `total` occurrences
    pub fn new(year: u32, total: u64) -> Self {
        Self {
            year,
            total,
            page: 1,
            records: Vec::new(),
            seen_urls: HashSet::new(),
            failed_links: Vec::new(),
        }
    }

    pub fn year(&self) -> u32 {
        self.year
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    /// The listing page currently being processed (1-indexed)
    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn advance_page(&mut self) {
        self.page += 1;
    }

    pub fn records(&self) -> &[AccidentRecord] {
        &self.records
    }

    pub fn failed_links(&self) -> &[FailedLink] {
        &self.failed_links
    }

    /// Returns true if a record with this URL was already extracted
    pub fn contains(&self, url: &str) -> bool {
        self.seen_urls.contains(url)
    }

    /// Appends a record, keeping URLs unique
    ///
    /// Returns false (and drops the record) if its URL was already extracted.
    pub fn push_record(&mut self, record: AccidentRecord) -> bool {
        if !self.seen_urls.insert(record.url.clone()) {
            return false;
        }
        self.records.push(record);
        true
    }

    pub fn record_failure(&mut self, url: impl Into<String>, reason: impl Into<String>) {
        self.failed_links.push(FailedLink {
            page: self.page,
            url: url.into(),
            reason: reason.into(),
        });
    }

    /// Consumes the state, returning records in crawl order and the failed links
    pub fn into_parts(self) -> (Vec<AccidentRecord>, Vec<FailedLink>) {
        (self.records, self.failed_links)
    }
}
