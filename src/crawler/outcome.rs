//! Per-target outcome and run result types
//!
//! Every input target produces exactly one [`SiteOutcome`] by the end of a
//! run: a metadata record on success, or a typed error entry. The
//! [`RunResult`] aggregates them with run-level counters and is handed off
//! read-only to the output writers.

use crate::crawler::fetcher::FailureKind;
use crate::extractor::{ExtractionErrorKind, MetadataRecord};
use serde::Serialize;
use std::time::Duration;
use url::Url;

/// One input URL to be fetched and processed
///
/// Immutable once enqueued; consumed exactly once by exactly one worker.
#[derive(Debug, Clone)]
pub struct CrawlTarget {
    /// The URL to fetch
    pub url: Url,

    /// Zero-based position in the input list
    pub position: usize,
}

impl CrawlTarget {
    pub fn new(url: Url, position: usize) -> Self {
        Self { url, position }
    }
}

/// The single per-target result, success record or typed error
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "kebab-case")]
pub enum SiteOutcome {
    /// The page was fetched and a metadata record extracted
    Success {
        url: String,
        #[serde(skip)]
        position: usize,
        record: MetadataRecord,
    },

    /// The page was fetched but could not be extracted
    ExtractionError {
        url: String,
        #[serde(skip)]
        position: usize,
        kind: ExtractionErrorKind,
        message: String,
    },

    /// All fetch attempts failed
    FetchError {
        url: String,
        #[serde(skip)]
        position: usize,
        kind: FailureKind,
        message: String,
        /// Total attempts made, including the first
        attempts: u32,
    },
}

impl SiteOutcome {
    /// The original target URL this outcome belongs to
    pub fn url(&self) -> &str {
        match self {
            Self::Success { url, .. }
            | Self::ExtractionError { url, .. }
            | Self::FetchError { url, .. } => url,
        }
    }

    /// The target's position in the input list
    pub fn position(&self) -> usize {
        match self {
            Self::Success { position, .. }
            | Self::ExtractionError { position, .. }
            | Self::FetchError { position, .. } => *position,
        }
    }

    /// Returns true for successful extractions
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

/// The complete collection of outcomes for one run, plus counters
#[derive(Debug, Clone, Serialize)]
pub struct RunResult {
    /// One outcome per input target
    pub outcomes: Vec<SiteOutcome>,

    /// Number of targets dispatched to workers
    pub attempted: usize,

    /// Number of successful metadata records
    pub succeeded: usize,

    /// Number of error outcomes
    pub failed: usize,

    /// Total wall-clock time for the run
    #[serde(serialize_with = "serialize_duration_ms", rename = "elapsed_ms")]
    pub elapsed: Duration,
}

impl RunResult {
    /// Builds a run result from collected outcomes, deriving the counters
    pub fn from_outcomes(outcomes: Vec<SiteOutcome>, elapsed: Duration) -> Self {
        let attempted = outcomes.len();
        let succeeded = outcomes.iter().filter(|o| o.is_success()).count();
        let failed = attempted - succeeded;

        Self {
            outcomes,
            attempted,
            succeeded,
            failed,
            elapsed,
        }
    }

    /// Reorders outcomes to match the original input list
    ///
    /// Outcomes arrive in completion order; this resorts them by the
    /// position recorded at dispatch time.
    pub fn sort_by_input_order(&mut self) {
        self.outcomes.sort_by_key(|o| o.position());
    }
}

fn serialize_duration_ms<S>(d: &Duration, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_u64(d.as_millis() as u64)
}
