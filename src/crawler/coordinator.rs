//! Harvest coordinator - two-phase crawl orchestration
//!
//! This module contains the per-year harvest loop:
//! - Discovery: walk every listing page, fix the total and the page layout
//! - Confirmation: an external gate before any detail page is requested
//! - Extraction: walk the listing again, re-verify every page against discovery,
//!   extract each detail page and persist after every record
//!
//! Requests are strictly sequential. A page that cannot be fetched, parsed or verified
//! stops the harvest; a detail page that fails is logged and skipped.

use crate::config::Config;
use crate::crawler::analyzer::{analyze, AnalyzeError, PageInfo};
use crate::crawler::confirm::Confirm;
use crate::crawler::consistency::{check_continuation, check_layout, check_link_count, check_total};
use crate::crawler::details::extract_details;
use crate::crawler::fetcher::{HttpFetcher, PageFetcher};
use crate::crawler::links::extract_links;
use crate::crawler::pacing::Pacing;
use crate::output::{HarvestReport, RecordSink};
use crate::record::AccidentRecord;
use crate::state::{CrawlPhase, CrawlState};
use crate::{HarvestError, ParseError, Result, ValidationError};
use scraper::Html;

/// What discovery saw on one listing page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageLayout {
    /// Listing page number (1-indexed)
    pub page: u32,

    pub info: PageInfo,

    /// Links found in the listing table
    pub link_count: usize,
}

/// Result of a completed discovery pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Discovery {
    pub year: u32,

    /// Total occurrences, identical on every page
    pub total: u64,

    /// Pages in order, contiguous from occurrence 1 to `total`
    pub pages: Vec<PageLayout>,
}

impl Discovery {
    /// Layout of `page` as seen during discovery
    pub fn layout(&self, page: u32) -> Option<&PageLayout> {
        self.pages.iter().find(|layout| layout.page == page)
    }

    /// Links reported across all pages
    pub fn link_count(&self) -> usize {
        self.pages.iter().map(|layout| layout.link_count).sum()
    }
}

/// A fetched and analyzed listing page
#[derive(Debug, Clone)]
struct ListingPage {
    info: PageInfo,
    links: Vec<String>,
}

/// Main harvest coordinator
pub struct Harvester<F> {
    fetcher: F,
    base_url: String,
    pacing: Pacing,
}

impl Harvester<HttpFetcher> {
    /// Builds an HTTP-backed harvester from configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        let fetcher = HttpFetcher::new(&config.http)?;
        Ok(Self::new(
            fetcher,
            &config.source.base_url,
            Pacing::from(&config.delays),
        ))
    }
}

impl<F: PageFetcher> Harvester<F> {
    pub fn new(fetcher: F, base_url: impl Into<String>, pacing: Pacing) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            fetcher,
            base_url,
            pacing,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `{base}/database/year/{year}/{page}`
    pub fn listing_url(&self, year: u32, page: u32) -> String {
        format!("{}/database/year/{}/{}", self.base_url, year, page)
    }

    /// Runs discovery, confirmation and extraction for one year
    ///
    /// Failures end up in the report: discovery errors leave it `Failed` with no records,
    /// extraction errors leave it `Aborted` with every record extracted before the error.
    pub async fn harvest_year<C, S>(&self, year: u32, confirm: &mut C, sink: &mut S) -> HarvestReport
    where
        C: Confirm + ?Sized,
        S: RecordSink,
    {
        let mut report = HarvestReport::new(year);

        if let Err(e) = self.run_year(year, confirm, sink, &mut report).await {
            tracing::error!("Harvest of {} ended in phase {}: {}", year, report.phase, e);
            report.error = Some(e.to_string());
        }

        report.finish();
        report
    }

    async fn run_year<C, S>(
        &self,
        year: u32,
        confirm: &mut C,
        sink: &mut S,
        report: &mut HarvestReport,
    ) -> Result<()>
    where
        C: Confirm + ?Sized,
        S: RecordSink,
    {
        let discovery = match self.discover(year).await {
            Ok(discovery) => discovery,
            Err(e) => {
                report.transition(CrawlPhase::Failed)?;
                return Err(e);
            }
        };

        report.total = Some(discovery.total);
        report.pages_discovered = discovery.pages.len();
        tracing::info!(
            "Found {} total accidents across {} pages",
            discovery.total,
            discovery.pages.len()
        );

        if !confirm.confirm(&discovery) {
            tracing::info!("Scraping of {} cancelled", year);
            report.transition(CrawlPhase::Declined)?;
            return Ok(());
        }
        report.transition(CrawlPhase::Confirmed)?;
        report.transition(CrawlPhase::Scraping)?;

        let (state, outcome) = self.extract(&discovery, sink).await;

        report.last_page = state.page();
        report.output = sink.location().map(|path| path.to_path_buf());
        let (records, failed_links) = state.into_parts();
        report.records = records;
        report.failed_links = failed_links;

        match outcome {
            Ok(()) => report.transition(CrawlPhase::Done),
            Err(e) => {
                report.transition(CrawlPhase::Aborted)?;
                Err(e)
            }
        }
    }

    /// Phase 1: establishes the total and the page layout of `year`
    ///
    /// Walks listing pages from 1 until a page's range reaches the total. Every page must
    /// report the first page's total and continue the previous page's range. Any error
    /// aborts discovery; no partial layout is returned.
    pub async fn discover(&self, year: u32) -> Result<Discovery> {
        tracing::info!("Analyzing pages for year {}...", year);

        let mut pages: Vec<PageLayout> = Vec::new();
        let mut page = 1;

        loop {
            let listing = self.fetch_listing(year, page).await.map_err(|e| {
                tracing::error!("Error analyzing page {}: {}", page, e);
                e
            })?;
            let info = listing.info;

            let verified = match pages.first() {
                Some(first) => check_total(first.info.total, &info),
                None => Ok(()),
            }
            .and_then(|()| check_continuation(pages.last().map(|layout| &layout.info), &info));

            if let Err(source) = verified {
                tracing::error!("Error analyzing page {}: {}", page, source);
                return Err(HarvestError::Validation { page, source });
            }

            if listing.links.len() != info.expected_links() {
                tracing::warn!(
                    "Page {} lists {} links for records {}-{}",
                    page,
                    listing.links.len(),
                    info.start,
                    info.end
                );
            }

            tracing::info!(
                "Page {}: {} accidents (records {}-{})",
                page,
                listing.links.len(),
                info.start,
                info.end
            );

            pages.push(PageLayout {
                page,
                info,
                link_count: listing.links.len(),
            });

            if info.is_last() {
                break;
            }

            page += 1;
            self.pacing.discovery_page.wait().await;
        }

        let total = pages.last().map_or(0, |layout| layout.info.total);
        Ok(Discovery { year, total, pages })
    }

    /// Phase 2: extracts every record listed in a confirmed discovery
    ///
    /// The full record set is handed to `sink` after every extracted record and once more
    /// at the end, whatever the outcome. Returns the final crawl state together with the
    /// error that stopped extraction, if any.
    pub async fn extract<S: RecordSink>(
        &self,
        discovery: &Discovery,
        sink: &mut S,
    ) -> (CrawlState, Result<()>) {
        let mut state = CrawlState::new(discovery.year, discovery.total);
        tracing::info!("Starting to scrape all accidents...");

        let mut outcome = self.extract_pages(discovery, &mut state, sink).await;
        if let Err(e) = &outcome {
            tracing::error!("Error processing page {}: {}", state.page(), e);
        }

        match sink.persist(state.records()) {
            Ok(()) => match sink.location() {
                Some(path) => tracing::info!(
                    "Saved {} accidents to {}",
                    state.records().len(),
                    path.display()
                ),
                None => tracing::info!("Saved {} accidents", state.records().len()),
            },
            Err(e) => {
                tracing::error!("Final save failed: {}", e);
                if outcome.is_ok() {
                    outcome = Err(e.into());
                }
            }
        }

        (state, outcome)
    }

    async fn extract_pages<S: RecordSink>(
        &self,
        discovery: &Discovery,
        state: &mut CrawlState,
        sink: &mut S,
    ) -> Result<()> {
        loop {
            let page = state.page();
            tracing::info!("Processing page {}", page);

            let listing = self.fetch_listing(state.year(), page).await?;
            let info = listing.info;

            check_total(state.total(), &info)
                .and_then(|()| check_layout(discovery.layout(page), &info))
                .and_then(|()| check_link_count(&info, listing.links.len()))
                .map_err(|source| HarvestError::Validation { page, source })?;

            tracing::info!(
                "Processing accidents {}-{} of {}",
                info.start,
                info.end,
                state.total()
            );

            let count = listing.links.len();
            for (i, link) in listing.links.iter().enumerate() {
                tracing::info!("Processing accident {}/{} from page {}", i + 1, count, page);

                if state.contains(link) {
                    tracing::warn!("Skipping {}: already extracted in this crawl", link);
                    continue;
                }

                match self.fetch_record(link).await {
                    Ok(record) => {
                        state.push_record(record);
                        sink.persist(state.records())?;
                        tracing::info!(
                            "Progress saved: {} accidents so far",
                            state.records().len()
                        );
                    }
                    Err(e) => {
                        tracing::error!("Error processing {}: {}", link, e);
                        state.record_failure(link.as_str(), e.to_string());
                    }
                }

                if i + 1 < count {
                    self.pacing.detail.wait().await;
                }
            }

            if info.is_last() {
                tracing::info!("Reached end of accidents ({} pages total)", page);
                return Ok(());
            }

            state.advance_page();
            self.pacing.extraction_page.wait().await;
        }
    }

    /// Fetches a listing page and reads its caption and links
    async fn fetch_listing(&self, year: u32, page: u32) -> Result<ListingPage> {
        let url = self.listing_url(year, page);
        let body = self.fetcher.fetch(&url).await?;

        parse_listing(&body, &self.base_url).map_err(|e| match e {
            ListingError::Parse(source) => HarvestError::Parse { url, source },
            ListingError::Validation(source) => HarvestError::Validation { page, source },
        })
    }

    /// Fetches one detail page and extracts its record
    async fn fetch_record(&self, url: &str) -> Result<AccidentRecord> {
        let body = self.fetcher.fetch(url).await?;
        let document = Html::parse_document(&body);
        extract_details(&document, url).map_err(|source| HarvestError::Parse {
            url: url.to_string(),
            source,
        })
    }
}

enum ListingError {
    Parse(ParseError),
    Validation(ValidationError),
}

impl From<AnalyzeError> for ListingError {
    fn from(error: AnalyzeError) -> Self {
        match error {
            AnalyzeError::Parse(e) => Self::Parse(e),
            AnalyzeError::Validation(e) => Self::Validation(e),
        }
    }
}

impl From<ParseError> for ListingError {
    fn from(error: ParseError) -> Self {
        Self::Parse(error)
    }
}

fn parse_listing(body: &str, base_url: &str) -> std::result::Result<ListingPage, ListingError> {
    let document = Html::parse_document(body);
    let info = analyze(&document)?;
    let links = extract_links(&document, base_url)?;
    Ok(ListingPage { info, links })
}
