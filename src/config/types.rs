use serde::Deserialize;

/// Main configuration structure for asn-harvest
///
/// Every section is optional; missing sections and keys fall back to the defaults that
/// match the public Aviation Safety Network database.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub source: SourceConfig,
    pub http: HttpConfig,
    pub delays: DelayConfig,
    pub output: OutputConfig,
}

/// Where the catalog lives
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Origin that listing paths and relative detail links are appended to
    #[serde(rename = "base-url")]
    pub base_url: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            base_url: "https://asn.flightsafety.org".to_string(),
        }
    }
}

/// HTTP client configuration, handed to the fetcher when it is built
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    #[serde(rename = "user-agent")]
    pub user_agent: String,

    pub accept: String,

    #[serde(rename = "accept-language")]
    pub accept_language: String,

    /// Per-request timeout (seconds)
    #[serde(rename = "timeout-secs")]
    pub timeout_secs: u64,

    /// Total attempts per URL, including the first one
    #[serde(rename = "max-attempts")]
    pub max_attempts: u32,

    /// Lower bound of the randomized wait between attempts (milliseconds)
    #[serde(rename = "retry-min-ms")]
    pub retry_min_ms: u64,

    /// Upper bound of the randomized wait between attempts (milliseconds)
    #[serde(rename = "retry-max-ms")]
    pub retry_max_ms: u64,

    /// Skip TLS certificate validation.
    ///
    /// The public database serves a certificate that does not validate, so this defaults
    /// to `true`. It is a trust relaxation for a read-only scrape of public pages and gives
    /// no protection against a tampered connection.
    #[serde(rename = "accept-invalid-certs")]
    pub accept_invalid_certs: bool,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 \
                         (KHTML, like Gecko) Chrome/121.0.0.0 Safari/537.36"
                .to_string(),
            accept: "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,\
                     image/webp,image/apng,*/*;q=0.8"
                .to_string(),
            accept_language: "en-US,en;q=0.9".to_string(),
            timeout_secs: 10,
            max_attempts: 3,
            retry_min_ms: 2000,
            retry_max_ms: 5000,
            accept_invalid_certs: true,
        }
    }
}

/// Politeness delays between requests (milliseconds)
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DelayConfig {
    /// Fixed pause between listing pages during discovery
    #[serde(rename = "discovery-page-ms")]
    pub discovery_page_ms: u64,

    #[serde(rename = "detail-min-ms")]
    pub detail_min_ms: u64,

    #[serde(rename = "detail-max-ms")]
    pub detail_max_ms: u64,

    #[serde(rename = "page-min-ms")]
    pub page_min_ms: u64,

    #[serde(rename = "page-max-ms")]
    pub page_max_ms: u64,
}

impl Default for DelayConfig {
    fn default() -> Self {
        Self {
            discovery_page_ms: 1000,
            detail_min_ms: 1000,
            detail_max_ms: 3000,
            page_min_ms: 2000,
            page_max_ms: 4000,
        }
    }
}

impl DelayConfig {
    /// All delays set to zero, for tests and local mirrors
    pub fn none() -> Self {
        Self {
            discovery_page_ms: 0,
            detail_min_ms: 0,
            detail_max_ms: 0,
            page_min_ms: 0,
            page_max_ms: 0,
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory the per-year CSV files are written to
    pub directory: String,

    /// File name prefix; files are named `{prefix}_{year}.csv`
    #[serde(rename = "file-prefix")]
    pub file_prefix: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: "output".to_string(),
            file_prefix: "asn_accidents".to_string(),
        }
    }
}
