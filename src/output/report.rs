//! End-of-run reporting
//!
//! A [`HarvestReport`] tracks one year from discovery to its terminal phase and is printed
//! to stdout once the year is finished.

use crate::crawler::Discovery;
use crate::record::AccidentRecord;
use crate::state::{CrawlPhase, FailedLink};
use crate::HarvestError;
use chrono::{DateTime, Utc};
use std::path::PathBuf;

/// Outcome of harvesting one year
#[derive(Debug, Clone)]
pub struct HarvestReport {
    pub year: u32,

    /// Current (after the run: terminal) phase
    pub phase: CrawlPhase,

    /// Total occurrences established by discovery
    pub total: Option<u64>,

    /// Listing pages found during discovery
    pub pages_discovered: usize,

    /// Last listing page the extraction reached
    pub last_page: u32,

    /// Records extracted, in crawl order
    pub records: Vec<AccidentRecord>,

    /// Detail links that were skipped after an error
    pub failed_links: Vec<FailedLink>,

    /// File the records were written to
    pub output: Option<PathBuf>,

    /// Error that ended the run, if any
    pub error: Option<String>,

    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl HarvestReport {
    /// Starts a report in the `Analyzing` phase
    pub fn new(year: u32) -> Self {
        Self {
            year,
            phase: CrawlPhase::Analyzing,
            total: None,
            pages_discovered: 0,
            last_page: 0,
            records: Vec::new(),
            failed_links: Vec::new(),
            output: None,
            error: None,
            started_at: Utc::now(),
            finished_at: None,
        }
    }

    /// Moves to `next`, rejecting transitions the phase machine does not allow
    pub fn transition(&mut self, next: CrawlPhase) -> Result<(), HarvestError> {
        if !self.phase.can_transition_to(next) {
            return Err(HarvestError::InvalidTransition {
                from: self.phase,
                to: next,
            });
        }
        tracing::debug!("Harvest {}: {} -> {}", self.year, self.phase, next);
        self.phase = next;
        Ok(())
    }

    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    /// Wall-clock duration in seconds, once finished
    pub fn duration_seconds(&self) -> Option<i64> {
        self.finished_at
            .map(|finished| (finished - self.started_at).num_seconds())
    }

    /// Returns true if the year finished without an error
    pub fn is_success(&self) -> bool {
        self.phase.is_success()
    }
}

/// Prints a discovery layout to stdout (`--discover-only`)
pub fn print_discovery(discovery: &Discovery) {
    println!("=== Discovery for {} ===\n", discovery.year);

    for layout in &discovery.pages {
        println!(
            "  Page {}: {} accidents (records {}-{})",
            layout.page, layout.link_count, layout.info.start, layout.info.end
        );
    }
    println!();
    println!(
        "Found {} total accidents across {} pages ({} links listed)",
        discovery.total,
        discovery.pages.len(),
        discovery.link_count()
    );
}

/// Prints a harvest report to stdout in a formatted manner
pub fn print_report(report: &HarvestReport) {
    println!("\n=== Harvest {} ===\n", report.year);

    println!("Outcome: {}", report.phase);
    if let Some(total) = report.total {
        println!("  Total accidents in database: {}", total);
        println!("  Listing pages: {}", report.pages_discovered);
    }

    if report.phase != CrawlPhase::Declined && report.total.is_some() {
        println!(
            "  Scraped {} accidents across {} pages",
            report.records.len(),
            report.last_page
        );
    }

    if let Some(path) = &report.output {
        println!("  Output: {}", path.display());
    }

    if let Some(seconds) = report.duration_seconds() {
        println!("  Duration: {}s", seconds);
    }
    println!();

    if !report.failed_links.is_empty() {
        println!("Failed Links ({}):", report.failed_links.len());
        for failed in &report.failed_links {
            println!("  - page {}: {} ({})", failed.page, failed.url, failed.reason);
        }
        println!();
    }

    if let Some(error) = &report.error {
        println!("Error: {}", error);
    }
}
