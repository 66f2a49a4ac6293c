/// Crawl phase definitions for tracking a per-year harvest
///
/// A harvest runs discovery first (`Analyzing`), waits for confirmation, then extracts
/// (`Scraping`). Every phase after `Analyzing` is reached through an explicit transition.
use std::fmt;

/// Represents the current phase of a per-year harvest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CrawlPhase {
    // ===== Discovery =====
    /// Walking listing pages to establish total and page layout
    Analyzing,

    /// Discovery finished and extraction was approved
    Confirmed,

    /// Discovery finished but extraction was not approved
    Declined,

    /// Discovery hit an error; nothing was extracted
    Failed,

    // ===== Extraction =====
    /// Fetching detail pages and persisting records
    Scraping,

    /// Every listing page was processed
    Done,

    /// A listing page failed or drifted; records extracted before it are kept
    Aborted,
}

impl CrawlPhase {
    /// Returns true if no further transition is possible
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Declined | Self::Failed | Self::Done | Self::Aborted
        )
    }

    /// Returns true if the harvest ended without an error
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Done | Self::Declined)
    }

    /// Returns true if the harvest ended because of an error
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Failed | Self::Aborted)
    }

    /// Returns true if `next` may follow this phase
    pub fn can_transition_to(&self, next: CrawlPhase) -> bool {
        matches!(
            (self, next),
            (Self::Analyzing, Self::Confirmed)
                | (Self::Analyzing, Self::Declined)
                | (Self::Analyzing, Self::Failed)
                | (Self::Confirmed, Self::Scraping)
                | (Self::Scraping, Self::Done)
                | (Self::Scraping, Self::Aborted)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Analyzing => "analyzing",
            Self::Confirmed => "confirmed",
            Self::Declined => "declined",
            Self::Failed => "failed",
            Self::Scraping => "scraping",
            Self::Done => "done",
            Self::Aborted => "aborted",
        }
    }

    /// Returns all possible phases
    pub fn all_phases() -> Vec<Self> {
        vec![
            Self::Analyzing,
            Self::Confirmed,
            Self::Declined,
            Self::Failed,
            Self::Scraping,
            Self::Done,
            Self::Aborted,
        ]
    }
}

impl fmt::Display for CrawlPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
