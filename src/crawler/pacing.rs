//! Politeness delays between requests
//!
//! All requests are issued sequentially; these ranges only shape how fast that sequence
//! runs. None of them affect correctness.

use crate::config::DelayConfig;
use rand::Rng;
use std::time::Duration;

/// A pause drawn uniformly from `[min, max]` (millisecond granularity)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DelayRange {
    min: Duration,
    max: Duration,
}

impl DelayRange {
    /// A range with bounds in either order
    pub fn between(a: Duration, b: Duration) -> Self {
        if a <= b {
            Self { min: a, max: b }
        } else {
            Self { min: b, max: a }
        }
    }

    pub fn from_millis(min_ms: u64, max_ms: u64) -> Self {
        Self::between(Duration::from_millis(min_ms), Duration::from_millis(max_ms))
    }

    pub fn fixed(delay: Duration) -> Self {
        Self::between(delay, delay)
    }

    pub fn none() -> Self {
        Self::fixed(Duration::ZERO)
    }

    pub fn min(&self) -> Duration {
        self.min
    }

    pub fn max(&self) -> Duration {
        self.max
    }

    /// Draws one delay from the range
    pub fn sample(&self) -> Duration {
        if self.min == self.max {
            return self.min;
        }
        let min_ms = self.min.as_millis() as u64;
        let max_ms = self.max.as_millis() as u64;
        Duration::from_millis(rand::rng().random_range(min_ms..=max_ms))
    }

    /// Sleeps for one sampled delay
    pub async fn wait(&self) {
        let delay = self.sample();
        if !delay.is_zero() {
            tracing::trace!("Pausing for {:?}", delay);
            tokio::time::sleep(delay).await;
        }
    }
}

/// The three delays a harvest observes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pacing {
    /// Between listing pages during discovery
    pub discovery_page: DelayRange,

    /// Between detail pages during extraction
    pub detail: DelayRange,

    /// Between listing pages during extraction
    pub extraction_page: DelayRange,
}

impl Pacing {
    /// No delays at all
    pub fn none() -> Self {
        Self {
            discovery_page: DelayRange::none(),
            detail: DelayRange::none(),
            extraction_page: DelayRange::none(),
        }
    }
}

impl From<&DelayConfig> for Pacing {
    fn from(config: &DelayConfig) -> Self {
        Self {
            discovery_page: DelayRange::fixed(Duration::from_millis(config.discovery_page_ms)),
            detail: DelayRange::from_millis(config.detail_min_ms, config.detail_max_ms),
            extraction_page: DelayRange::from_millis(config.page_min_ms, config.page_max_ms),
        }
    }
}
