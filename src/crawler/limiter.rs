//! Per-domain rate limiting
//!
//! Politeness gate consulted before every fetch attempt. Each domain has an
//! independently synchronized entry holding its rate state, so a slow or
//! saturated domain never blocks workers whose targets live elsewhere. A
//! domain with no entry has never been contacted and is immediately
//! permitted.
//!
//! Two bounds are enforced per domain:
//! - request start times are spaced at least `min_domain_interval` apart
//! - at most `max_domain_concurrency` requests are in flight at once
//!
//! Ordering within a domain is not guaranteed; only the bounds are.

use crate::config::CrawlerConfig;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tokio::sync::{Mutex as AsyncMutex, OwnedSemaphorePermit, Semaphore};

/// Per-domain bookkeeping, never exposed outside the limiter
#[derive(Debug)]
struct DomainRateState {
    /// Scheduled start of the most recently admitted request
    last_request: Option<Instant>,

    /// Requests admitted for this domain during the run
    request_count: u64,
}

impl DomainRateState {
    fn new() -> Self {
        Self {
            last_request: None,
            request_count: 0,
        }
    }
}

/// One independently synchronized table entry
struct DomainEntry {
    state: AsyncMutex<DomainRateState>,
    in_flight: Arc<Semaphore>,
}

/// Permit for one admitted request; dropping it releases the domain's
/// in-flight slot
pub struct DomainPermit {
    _permit: OwnedSemaphorePermit,
}

/// The per-domain politeness gate
pub struct RateLimiter {
    entries: Mutex<HashMap<String, Arc<DomainEntry>>>,
    min_interval: Duration,
    max_in_flight: usize,
}

impl RateLimiter {
    /// Creates a limiter from the crawler configuration
    pub fn new(config: &CrawlerConfig) -> Self {
        Self::with_settings(
            config.min_domain_interval(),
            config.max_domain_concurrency as usize,
        )
    }

    /// Creates a limiter with explicit settings
    pub fn with_settings(min_interval: Duration, max_in_flight: usize) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            min_interval,
            max_in_flight: max_in_flight.max(1),
        }
    }

    /// Blocks until a request to `domain` is permitted
    ///
    /// Claims the domain's next free start slot under the entry lock, then
    /// sleeps outside it until that slot arrives, so waiting for one domain
    /// never holds up the table. The returned permit must be kept alive for
    /// the duration of the request; dropping it is the release.
    pub async fn acquire(&self, domain: &str) -> DomainPermit {
        let entry = self.entry(domain);

        // Bound concurrent in-flight requests for this domain
        let permit = entry
            .in_flight
            .clone()
            .acquire_owned()
            .await
            .expect("domain semaphore closed");

        // Claim the next start slot: one interval after the previous
        // admitted request, or now if the domain is idle
        let wait = {
            let mut state = entry.state.lock().await;
            let now = Instant::now();
            let slot = match state.last_request {
                Some(last) if last + self.min_interval > now => last + self.min_interval,
                _ => now,
            };
            state.last_request = Some(slot);
            state.request_count += 1;
            slot.saturating_duration_since(now)
        };

        if !wait.is_zero() {
            tracing::trace!("Rate limit: waiting {:?} for {}", wait, domain);
            tokio::time::sleep(wait).await;
        }

        DomainPermit { _permit: permit }
    }

    /// Number of requests admitted for a domain so far
    pub async fn request_count(&self, domain: &str) -> u64 {
        let entry = {
            let entries = self.entries.lock().expect("limiter table poisoned");
            entries.get(domain).cloned()
        };

        match entry {
            Some(e) => e.state.lock().await.request_count,
            None => 0,
        }
    }

    /// Number of domains contacted so far
    pub fn domain_count(&self) -> usize {
        self.entries.lock().expect("limiter table poisoned").len()
    }

    fn entry(&self, domain: &str) -> Arc<DomainEntry> {
        let mut entries = self.entries.lock().expect("limiter table poisoned");
        entries
            .entry(domain.to_string())
            .or_insert_with(|| {
                Arc::new(DomainEntry {
                    state: AsyncMutex::new(DomainRateState::new()),
                    in_flight: Arc::new(Semaphore::new(self.max_in_flight)),
                })
            })
            .clone()
    }
}
