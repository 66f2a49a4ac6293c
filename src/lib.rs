//! asn-harvest: an incremental harvester for aviation accident records
//!
//! This crate walks the paginated per-year listings of an Aviation Safety Network style
//! database, verifies that the catalog stays consistent while it is being walked, and
//! extracts every linked accident page into a fixed 20-column record set that is persisted
//! after every single record.

pub mod config;
pub mod crawler;
pub mod output;
pub mod record;
pub mod state;

use thiserror::Error;

/// Main error type for harvest operations
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("Parse error for {url}: {source}")]
    Parse { url: String, source: ParseError },

    #[error("Validation error on page {page}: {source}")]
    Validation { page: u32, source: ValidationError },

    #[error("Output error: {0}")]
    Output(#[from] output::OutputError),

    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),

    #[error("Invalid phase transition: {from:?} -> {to:?}")]
    InvalidTransition {
        from: state::CrawlPhase,
        to: state::CrawlPhase,
    },
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Transport failures, reported once the retry budget is spent
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP {status} from {url} after {attempts} attempt(s)")]
    Status {
        url: String,
        status: u16,
        attempts: u32,
    },

    #[error("Request to {url} failed after {attempts} attempt(s): {message}")]
    Transport {
        url: String,
        attempts: u32,
        message: String,
    },
}

impl FetchError {
    /// The URL that could not be fetched
    pub fn url(&self) -> &str {
        match self {
            Self::Status { url, .. } | Self::Transport { url, .. } => url,
        }
    }
}

/// A structural anchor the page must carry was missing or unreadable
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("{0} not found")]
    MissingAnchor(&'static str),

    #[error("Could not find total occurrences in caption: {0:?}")]
    UnrecognizedCaption(String),

    #[error("Invalid CSS selector: {0}")]
    Selector(String),
}

/// The catalog reported something inconsistent with itself or with earlier pages
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Invalid range: {start}-{end} of {total}")]
    InvalidRange { start: u64, end: u64, total: u64 },

    #[error("Total occurrences changed: expected {expected}, got {actual}")]
    TotalMismatch { expected: u64, actual: u64 },

    #[error("Range does not continue previous page: expected start {expected}, got {actual}")]
    RangeGap { expected: u64, actual: u64 },

    #[error(
        "Page layout changed since discovery: expected {}-{}, got {}-{}",
        expected.0, expected.1, actual.0, actual.1
    )]
    LayoutMismatch {
        expected: (u64, u64),
        actual: (u64, u64),
    },

    #[error("Page was not seen during discovery (range {start}-{end})")]
    UnexpectedPage { start: u64, end: u64 },

    #[error("Expected {expected} links, got {actual}")]
    LinkCountMismatch { expected: usize, actual: usize },
}

/// Result type alias for harvest operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for fetch operations
pub type FetchResult<T> = std::result::Result<T, FetchError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{Discovery, Harvester, HttpFetcher, PageFetcher, PageInfo};
pub use record::{AccidentField, AccidentRecord};
pub use state::{CrawlPhase, CrawlState};
