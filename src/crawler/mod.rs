//! Crawler module for fetching and orchestration
//!
//! This module contains the core crawling logic:
//! - HTTP fetching with failure classification
//! - Per-domain rate limiting
//! - Bounded retries with exponential backoff
//! - Worker-pool orchestration over a shared claim queue

mod fetcher;
mod limiter;
mod orchestrator;
mod outcome;
mod retry;

pub use fetcher::{build_http_client, fetch_url, FailureKind, FetchResult, FetchSuccess};
pub use limiter::{DomainPermit, RateLimiter};
pub use orchestrator::{CancelHandle, Orchestrator};
pub use outcome::{CrawlTarget, RunResult, SiteOutcome};
pub use retry::{is_transient, AttemptOutcome, RetryPolicy};
