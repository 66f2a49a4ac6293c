//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the harvester, including:
//! - Building HTTP clients from an explicit `HttpConfig` (headers, timeout, TLS policy)
//! - GET requests for listing and detail pages
//! - Retry logic for transient failures
//! - Error classification

use crate::config::HttpConfig;
use crate::crawler::pacing::DelayRange;
use crate::{ConfigError, FetchError, FetchResult, HarvestError};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, USER_AGENT};
use reqwest::Client;
use std::fmt;
use std::future::Future;
use std::time::Duration;

/// Anything that can turn a URL into a page body
///
/// The harvester only ever awaits one fetch at a time.
pub trait PageFetcher {
    /// Fetches `url`, returning the response body
    fn fetch(&self, url: &str) -> impl Future<Output = FetchResult<String>>;
}

/// How often and how patiently a URL is retried
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one
    pub max_attempts: u32,

    /// Wait between attempts
    pub backoff: DelayRange,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from(&HttpConfig::default())
    }
}

impl From<&HttpConfig> for RetryPolicy {
    fn from(config: &HttpConfig) -> Self {
        Self {
            max_attempts: config.max_attempts,
            backoff: DelayRange::from_millis(config.retry_min_ms, config.retry_max_ms),
        }
    }
}

/// Builds an HTTP client with proper configuration
///
/// The returned client sends the configured User-Agent, Accept and Accept-Language headers
/// on every request, in place of any process-wide session state.
///
/// When `accept_invalid_certs` is set the client skips TLS certificate validation
/// entirely. The public catalog's certificate does not validate, so this is the default;
/// it is a deliberate relaxation for reading public pages, not a security measure, and a
/// warning is logged whenever it is in effect.
///
/// # Example
///
/// ```no_run
/// use asn_harvest::config::HttpConfig;
/// use asn_harvest::crawler::build_http_client;
///
/// let client = build_http_client(&HttpConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &HttpConfig) -> Result<Client, HarvestError> {
    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, header_value("user-agent", &config.user_agent)?);
    headers.insert(ACCEPT, header_value("accept", &config.accept)?);
    headers.insert(
        ACCEPT_LANGUAGE,
        header_value("accept-language", &config.accept_language)?,
    );

    if config.accept_invalid_certs {
        tracing::warn!("TLS certificate validation is disabled for all requests");
    }

    let client = Client::builder()
        .default_headers(headers)
        .timeout(Duration::from_secs(config.timeout_secs))
        .danger_accept_invalid_certs(config.accept_invalid_certs)
        .gzip(true)
        .brotli(true)
        .build()?;

    Ok(client)
}

fn header_value(name: &str, value: &str) -> Result<HeaderValue, ConfigError> {
    HeaderValue::from_str(value)
        .map_err(|e| ConfigError::Validation(format!("Invalid {} header: {}", name, e)))
}

/// `reqwest`-backed fetcher with bounded retries
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    policy: RetryPolicy,
}

impl HttpFetcher {
    /// Builds a client from `config` and takes the retry policy from it
    pub fn new(config: &HttpConfig) -> Result<Self, HarvestError> {
        Ok(Self {
            client: build_http_client(config)?,
            policy: RetryPolicy::from(config),
        })
    }

    async fn fetch_once(&self, url: &str) -> Result<String, AttemptFailure> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| AttemptFailure::Transport(classify(&e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AttemptFailure::Status(status.as_u16()));
        }

        response
            .text()
            .await
            .map_err(|e| AttemptFailure::Transport(classify(&e)))
    }
}

impl PageFetcher for HttpFetcher {
    /// Fetches a URL, retrying transport failures and non-2xx responses
    ///
    /// # Retry Logic
    ///
    /// | Condition | Action |
    /// |-----------|--------|
    /// | 2xx | Return body |
    /// | Any other status | Retry after a randomized wait |
    /// | Timeout / connection / body error | Retry after a randomized wait |
    /// | Attempts exhausted | `FetchError` with the last failure |
    async fn fetch(&self, url: &str) -> FetchResult<String> {
        let max_attempts = self.policy.max_attempts.max(1);
        let mut attempt = 1;

        loop {
            match self.fetch_once(url).await {
                Ok(body) => {
                    tracing::debug!("Fetched {} ({} bytes)", url, body.len());
                    return Ok(body);
                }
                Err(failure) => {
                    tracing::warn!("Attempt {} failed for {}: {}", attempt, url, failure);

                    if attempt >= max_attempts {
                        return Err(failure.into_error(url, attempt));
                    }

                    let backoff = self.policy.backoff.sample();
                    tracing::debug!("Retrying {} after {:?}", url, backoff);
                    tokio::time::sleep(backoff).await;
                    attempt += 1;
                }
            }
        }
    }
}

/// Why a single attempt failed
#[derive(Debug, Clone, PartialEq, Eq)]
enum AttemptFailure {
    Status(u16),
    Transport(String),
}

impl AttemptFailure {
    fn into_error(self, url: &str, attempts: u32) -> FetchError {
        match self {
            Self::Status(status) => FetchError::Status {
                url: url.to_string(),
                status,
                attempts,
            },
            Self::Transport(message) => FetchError::Transport {
                url: url.to_string(),
                attempts,
                message,
            },
        }
    }
}

impl fmt::Display for AttemptFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Status(status) => write!(f, "HTTP {}", status),
            Self::Transport(message) => write!(f, "{}", message),
        }
    }
}

fn classify(error: &reqwest::Error) -> String {
    if error.is_timeout() {
        "Request timeout".to_string()
    } else if error.is_connect() {
        format!("Connection failed: {}", error)
    } else {
        error.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_http_client() {
        let client = build_http_client(&HttpConfig::default());
        assert!(client.is_ok());
    }

    #[test]
    fn test_invalid_header_is_config_error() {
        let config = HttpConfig {
            accept_language: "en\nUS".to_string(),
            ..HttpConfig::default()
        };
        let result = build_http_client(&config);
        assert!(matches!(
            result,
            Err(HarvestError::Config(ConfigError::Validation(_)))
        ));
    }

    #[test]
    fn test_retry_policy_from_config() {
        let config = HttpConfig {
            max_attempts: 5,
            retry_min_ms: 10,
            retry_max_ms: 20,
            ..HttpConfig::default()
        };
        let policy = RetryPolicy::from(&config);
        assert_eq!(policy.max_attempts, 5);
        assert_eq!(policy.backoff, DelayRange::from_millis(10, 20));
    }

    #[test]
    fn test_default_policy() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts, 3);
        assert_eq!(policy.backoff, DelayRange::from_millis(2000, 5000));
    }

    #[test]
    fn test_attempt_failure_into_error() {
        let error = AttemptFailure::Status(503).into_error("https://example.com/a", 3);
        assert!(matches!(
            error,
            FetchError::Status {
                status: 503,
                attempts: 3,
                ..
            }
        ));
        assert_eq!(error.url(), "https://example.com/a");

        let error = AttemptFailure::Transport("Request timeout".to_string())
            .into_error("https://example.com/b", 1);
        assert!(error.to_string().contains("Request timeout"));
    }

    #[tokio::test]
    async fn test_unreachable_host_exhausts_attempts() {
        let config = HttpConfig {
            max_attempts: 2,
            retry_min_ms: 0,
            retry_max_ms: 0,
            timeout_secs: 1,
            ..HttpConfig::default()
        };
        let fetcher = HttpFetcher::new(&config).unwrap();

        // Port 9 (discard) on localhost is not expected to accept HTTP connections.
        let result = fetcher.fetch("http://127.0.0.1:9/").await;
        match result {
            Err(FetchError::Transport { attempts, .. }) => assert_eq!(attempts, 2),
            other => panic!("expected transport error, got {:?}", other),
        }
    }
}
