//! Crawl event stream
//!
//! The orchestrator and retry policy report progress through an
//! [`EventSink`]: one notification per occurrence, in occurrence order,
//! never aggregated here. The default sink forwards to `tracing`, which is
//! what ends up in the run log.

use crate::crawler::FailureKind;
use std::sync::Mutex;
use std::time::Duration;

/// One notification from the crawl pipeline
#[derive(Debug, Clone, PartialEq)]
pub enum CrawlEvent {
    /// A worker claimed the target and began processing
    TargetStarted { url: String },

    /// The target produced a metadata record
    TargetSucceeded { url: String },

    /// The target produced an error outcome
    TargetFailed { url: String, kind: String },

    /// A transient failure triggered a backoff before the next attempt
    RetryScheduled {
        url: String,
        /// The attempt number about to be made (2 = first retry)
        attempt: u32,
        delay: Duration,
        kind: FailureKind,
    },
}

/// Receiver for crawl events
///
/// Implementations must be safe to call from any worker. Events arrive in
/// occurrence order per target; no ordering holds across targets.
pub trait EventSink: Send + Sync {
    fn record(&self, event: CrawlEvent);
}

/// Default sink: forwards every event to `tracing`
pub struct TracingEventSink;

impl EventSink for TracingEventSink {
    fn record(&self, event: CrawlEvent) {
        match event {
            CrawlEvent::TargetStarted { url } => {
                tracing::info!("Crawling: {}", url);
            }
            CrawlEvent::TargetSucceeded { url } => {
                tracing::info!("Successfully scraped: {}", url);
            }
            CrawlEvent::TargetFailed { url, kind } => {
                tracing::error!("Failed ({}): {}", kind, url);
            }
            CrawlEvent::RetryScheduled {
                url,
                attempt,
                delay,
                kind,
            } => {
                tracing::warn!(
                    "Retrying {} (attempt {}, {}) after {:?}",
                    url,
                    attempt,
                    kind,
                    delay
                );
            }
        }
    }
}

/// Test sink: collects events into a vector
pub struct CollectingEventSink {
    events: Mutex<Vec<CrawlEvent>>,
}

impl CollectingEventSink {
    pub fn new() -> Self {
        Self {
            events: Mutex::new(Vec::new()),
        }
    }

    /// Snapshot of the events recorded so far
    pub fn events(&self) -> Vec<CrawlEvent> {
        self.events.lock().expect("event sink poisoned").clone()
    }
}

impl Default for CollectingEventSink {
    fn default() -> Self {
        Self::new()
    }
}

impl EventSink for CollectingEventSink {
    fn record(&self, event: CrawlEvent) {
        self.events.lock().expect("event sink poisoned").push(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collecting_sink_preserves_order() {
        let sink = CollectingEventSink::new();

        sink.record(CrawlEvent::TargetStarted {
            url: "https://a.example/".to_string(),
        });
        sink.record(CrawlEvent::TargetSucceeded {
            url: "https://a.example/".to_string(),
        });

        let events = sink.events();
        assert_eq!(events.len(), 2);
        assert!(matches!(events[0], CrawlEvent::TargetStarted { .. }));
        assert!(matches!(events[1], CrawlEvent::TargetSucceeded { .. }));
    }
}
