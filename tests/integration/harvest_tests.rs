//! Integration tests for the harvester
//!
//! These tests use wiremock to serve listing and detail pages and drive the real
//! `HttpFetcher` through complete harvests.

use asn_harvest::config::{Config, DelayConfig};
use asn_harvest::crawler::{AutoApprove, Discovery, Harvester, HttpFetcher};
use asn_harvest::output::{CsvSink, MemorySink};
use asn_harvest::CrawlPhase;
use std::fs;
use tempfile::TempDir;
use wiremock::matchers::{method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration pointing at the mock server, without delays
fn create_test_config(base_url: &str, output_dir: &str) -> Config {
    let mut config = Config::default();
    config.source.base_url = base_url.to_string();
    config.http.user_agent = "asn-harvest-tests".to_string();
    config.http.timeout_secs = 5;
    config.http.max_attempts = 3;
    config.http.retry_min_ms = 0;
    config.http.retry_max_ms = 0;
    config.delays = DelayConfig::none();
    config.output.directory = output_dir.to_string();
    config
}

fn harvester(config: &Config) -> Harvester<HttpFetcher> {
    Harvester::from_config(config).expect("Failed to build harvester")
}

/// A listing page with the given caption and one row per id
fn listing_page(caption: &str, ids: std::ops::RangeInclusive<u64>) -> String {
    let rows: String = ids
        .map(|id| {
            format!(
                r#"<tr class="list"><td class="list"><a href="/wikibase/{id}">05-JAN-2024</a></td>
                   <td class="list">Cessna 172</td></tr>"#
            )
        })
        .collect();
    format!(
        r#"<html><body><div id="contentwrapper">
            <span class="caption">{caption}</span>
            <table class="hp"><tr><th>acc. date</th><th>type</th></tr>{rows}</table>
        </div></body></html>"#
    )
}

fn detail_page() -> String {
    r#"<html><body><div class="innertube"><table>
        <tr><td class="caption">Date:</td><td class="caption">Friday 5 January 2024</td></tr>
        <tr><td class="caption">Type:</td><td class="desc">Cessna 172S Skyhawk</td></tr>
        <tr><td class="caption">Registration:</td><td class="desc">N12345</td></tr>
        <tr><td class="caption">Fatalities:</td><td class="desc">Fatalities: 0 / Occupants: 2</td></tr>
        <tr><td class="caption">Narrative:</td><td class="desc">Not a column</td></tr>
    </table></div></body></html>"#
        .to_string()
}

async fn mount_listing(server: &MockServer, page: u32, body: String) {
    Mock::given(method("GET"))
        .and(path(format!("/database/year/2024/{page}")))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

async fn mount_details(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path_regex(r"^/wikibase/\d+$"))
        .respond_with(ResponseTemplate::new(200).set_body_string(detail_page()))
        .mount(server)
        .await;
}

/// 5 occurrences on pages of 2, 2 and 1
async fn mount_small_catalog(server: &MockServer) {
    mount_listing(server, 1, listing_page("showing occurrence 1-2 of 5 occurrences", 1..=2)).await;
    mount_listing(server, 2, listing_page("showing occurrence 3-4 of 5 occurrences", 3..=4)).await;
    mount_listing(server, 3, listing_page("showing occurrence 5-5 of 5 occurrences", 5..=5)).await;
    mount_details(server).await;
}

async fn detail_requests(server: &MockServer) -> usize {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|request| request.url.path().starts_with("/wikibase/"))
        .count()
}

#[tokio::test]
async fn test_full_harvest_writes_csv() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    mount_small_catalog(&server).await;

    let config = create_test_config(&server.uri(), dir.path().to_str().unwrap());
    let mut sink = CsvSink::for_year(&config.output, 2024);

    let report = harvester(&config)
        .harvest_year(2024, &mut AutoApprove, &mut sink)
        .await;

    assert_eq!(report.phase, CrawlPhase::Done);
    assert_eq!(report.total, Some(5));
    assert_eq!(report.pages_discovered, 3);
    assert_eq!(report.records.len(), 5);
    assert!(report.failed_links.is_empty());
    assert_eq!(report.output.as_deref(), Some(sink.path()));

    let first = &report.records[0];
    assert_eq!(first.url, format!("{}/wikibase/1", server.uri()));
    assert_eq!(first.date, "Friday 5 January 2024");
    assert_eq!(first.aircraft_type, "Cessna 172S Skyhawk");
    assert_eq!(first.registration, "N12345");
    assert_eq!(first.fatalities, "Fatalities: 0 / Occupants: 2");
    assert_eq!(first.location, "");

    let csv_path = dir.path().join("asn_accidents_2024.csv");
    let text = fs::read_to_string(&csv_path).unwrap();
    assert_eq!(text.lines().count(), 6);
    assert!(text.starts_with("Date,Time,Type,"));
    assert_eq!(detail_requests(&server).await, 5);
}

#[tokio::test]
async fn test_total_drift_during_discovery_fails() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    mount_listing(&server, 1, listing_page("showing occurrence 1-20 of 50 occurrences", 1..=20)).await;
    mount_listing(&server, 2, listing_page("showing occurrence 21-40 of 50 occurrences", 21..=40)).await;
    mount_listing(&server, 3, listing_page("showing occurrence 41-48 of 48 occurrences", 41..=48)).await;
    mount_details(&server).await;

    let config = create_test_config(&server.uri(), dir.path().to_str().unwrap());
    let mut sink = CsvSink::for_year(&config.output, 2024);
    let mut asked = false;
    let mut confirm = |_: &Discovery| {
        asked = true;
        true
    };

    let report = harvester(&config)
        .harvest_year(2024, &mut confirm, &mut sink)
        .await;

    assert_eq!(report.phase, CrawlPhase::Failed);
    assert!(report.phase.is_error());
    let error = report.error.unwrap();
    assert!(error.contains("page 3"), "{}", error);
    assert!(error.contains("expected 50, got 48"), "{}", error);

    assert!(!asked);
    assert!(!sink.path().exists());
    assert_eq!(detail_requests(&server).await, 0);
}

#[tokio::test]
async fn test_total_drift_during_extraction_aborts() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    // page 2 reports 5 occurrences once (discovery), then 6
    Mock::given(method("GET"))
        .and(path("/database/year/2024/2"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(listing_page("showing occurrence 3-4 of 5 occurrences", 3..=4)),
        )
        .up_to_n_times(1)
        .mount(&server)
        .await;
    mount_listing(&server, 2, listing_page("showing occurrence 3-4 of 6 occurrences", 3..=4)).await;
    mount_small_catalog(&server).await;

    let config = create_test_config(&server.uri(), dir.path().to_str().unwrap());
    let mut sink = CsvSink::for_year(&config.output, 2024);

    let report = harvester(&config)
        .harvest_year(2024, &mut AutoApprove, &mut sink)
        .await;

    assert_eq!(report.phase, CrawlPhase::Aborted);
    assert_eq!(report.last_page, 2);
    assert_eq!(report.records.len(), 2);
    assert!(report.error.unwrap().contains("expected 5, got 6"));

    // records from page 1 survive the abort
    let text = fs::read_to_string(sink.path()).unwrap();
    assert_eq!(text.lines().count(), 3);
    assert_eq!(detail_requests(&server).await, 2);
}

#[tokio::test]
async fn test_dead_detail_link_is_skipped() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/wikibase/3"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    mount_small_catalog(&server).await;

    let config = create_test_config(&server.uri(), dir.path().to_str().unwrap());
    let mut sink = MemorySink::new();

    let report = harvester(&config)
        .harvest_year(2024, &mut AutoApprove, &mut sink)
        .await;

    assert_eq!(report.phase, CrawlPhase::Done);
    assert_eq!(report.records.len(), 4);
    assert_eq!(sink.records().len(), 4);

    assert_eq!(report.failed_links.len(), 1);
    let failed = &report.failed_links[0];
    assert_eq!(failed.url, format!("{}/wikibase/3", server.uri()));
    assert_eq!(failed.page, 2);
    assert!(failed.reason.contains("HTTP 404"), "{}", failed.reason);
    assert!(failed.reason.contains("3 attempt(s)"), "{}", failed.reason);
}

#[tokio::test]
async fn test_transient_errors_are_retried() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/database/year/2024/1"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(2)
        .mount(&server)
        .await;
    mount_listing(&server, 1, listing_page("2 occurrences", 1..=2)).await;
    mount_details(&server).await;

    let config = create_test_config(&server.uri(), dir.path().to_str().unwrap());
    let mut sink = MemorySink::new();

    let report = harvester(&config)
        .harvest_year(2024, &mut AutoApprove, &mut sink)
        .await;

    assert_eq!(report.phase, CrawlPhase::Done);
    assert_eq!(report.records.len(), 2);

    let listing_requests = server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|request| request.url.path() == "/database/year/2024/1")
        .count();
    // two failures and one success in discovery, one request in extraction
    assert_eq!(listing_requests, 4);
}

#[tokio::test]
async fn test_exhausted_retries_fail_discovery() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let config = create_test_config(&server.uri(), dir.path().to_str().unwrap());
    let mut sink = MemorySink::new();

    let report = harvester(&config)
        .harvest_year(2024, &mut AutoApprove, &mut sink)
        .await;

    assert_eq!(report.phase, CrawlPhase::Failed);
    assert!(report.error.unwrap().contains("HTTP 503"));
    assert_eq!(sink.writes(), 0);
    assert_eq!(server.received_requests().await.unwrap().len(), 3);
}

#[tokio::test]
async fn test_declined_confirmation_writes_nothing() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    mount_small_catalog(&server).await;

    let config = create_test_config(&server.uri(), dir.path().to_str().unwrap());
    let mut sink = CsvSink::for_year(&config.output, 2024);
    let mut seen_total = None;
    let mut decline = |discovery: &Discovery| {
        seen_total = Some(discovery.total);
        false
    };

    let report = harvester(&config)
        .harvest_year(2024, &mut decline, &mut sink)
        .await;

    assert_eq!(seen_total, Some(5));
    assert_eq!(report.phase, CrawlPhase::Declined);
    assert!(!report.phase.is_error());
    assert!(report.records.is_empty());
    assert!(!sink.path().exists());
    assert_eq!(detail_requests(&server).await, 0);
}

#[tokio::test]
async fn test_link_count_mismatch_aborts_extraction() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    // caption promises three records, the table lists two
    mount_listing(&server, 1, listing_page("showing occurrence 1-3 of 3 occurrences", 1..=2)).await;
    mount_details(&server).await;

    let config = create_test_config(&server.uri(), dir.path().to_str().unwrap());
    let mut sink = CsvSink::for_year(&config.output, 2024);

    let report = harvester(&config)
        .harvest_year(2024, &mut AutoApprove, &mut sink)
        .await;

    assert_eq!(report.phase, CrawlPhase::Aborted);
    assert!(report.records.is_empty());
    assert!(report.error.unwrap().contains("Expected 3 links, got 2"));
    assert_eq!(detail_requests(&server).await, 0);

    // the final write still leaves a header-only file behind
    let text = fs::read_to_string(sink.path()).unwrap();
    assert_eq!(text.lines().count(), 1);
}

#[tokio::test]
async fn test_rerun_on_unchanged_catalog_is_identical() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();
    mount_small_catalog(&server).await;

    let config = create_test_config(&server.uri(), dir.path().to_str().unwrap());
    let harvester = harvester(&config);

    let mut first = CsvSink::new(dir.path().join("first.csv"));
    let mut second = CsvSink::new(dir.path().join("second.csv"));
    let first_report = harvester.harvest_year(2024, &mut AutoApprove, &mut first).await;
    let second_report = harvester.harvest_year(2024, &mut AutoApprove, &mut second).await;

    assert_eq!(first_report.phase, CrawlPhase::Done);
    assert_eq!(second_report.phase, CrawlPhase::Done);
    assert_eq!(first_report.records, second_report.records);
    assert_eq!(
        fs::read(first.path()).unwrap(),
        fs::read(second.path()).unwrap()
    );
}
