//! Retry policy with exponential backoff
//!
//! Wraps the fetcher with bounded retries. Only transient failures are
//! retried; terminal statuses (404, 403, redirect loops) fail immediately so
//! the rate budget is not wasted on URLs that will never succeed. Exhausting
//! the attempt budget yields a terminal failure carrying the last failure's
//! kind and message.

use crate::config::RetryConfig;
use crate::crawler::fetcher::{fetch_url, FailureKind, FetchResult, FetchSuccess};
use crate::crawler::limiter::RateLimiter;
use crate::crawler::outcome::CrawlTarget;
use crate::events::{CrawlEvent, EventSink};
use crate::url::extract_domain;
use reqwest::Client;
use std::time::Duration;

/// Final result of the retry policy for one target, after all attempts
#[derive(Debug)]
pub enum AttemptOutcome {
    /// A fetch attempt succeeded
    Success(FetchSuccess),

    /// Every permitted attempt failed; carries the last failure only
    Failure {
        kind: FailureKind,
        message: String,
        /// Total attempts made, including the first
        attempts: u32,
    },
}

/// Returns true for failure kinds worth another attempt
///
/// Transient: timeouts, connection and resolution faults, and the
/// retryable status codes (429 and the 5xx gateway/availability family).
pub fn is_transient(kind: FailureKind) -> bool {
    match kind {
        FailureKind::Timeout | FailureKind::ConnectionError | FailureKind::DnsError => true,
        FailureKind::HttpError(status) => matches!(status, 429 | 500 | 502 | 503 | 504),
        FailureKind::TooManyRedirects => false,
    }
}

/// Bounded-retry wrapper around the fetcher
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    config: RetryConfig,
    max_redirects: u32,
}

impl RetryPolicy {
    pub fn new(config: RetryConfig, max_redirects: u32) -> Self {
        Self {
            config,
            max_redirects,
        }
    }

    /// Fetches a target, retrying transient failures with backoff
    ///
    /// Each attempt goes through the rate limiter, so retries count against
    /// the domain's politeness budget like any other request.
    pub async fn attempt(
        &self,
        client: &Client,
        limiter: &RateLimiter,
        target: &CrawlTarget,
        events: &dyn EventSink,
    ) -> AttemptOutcome {
        let domain = extract_domain(&target.url)
            .unwrap_or_else(|| target.url.as_str().to_string());

        let mut attempts = 0;

        loop {
            let permit = limiter.acquire(&domain).await;
            let result = fetch_url(client, &target.url, self.max_redirects).await;
            drop(permit);

            attempts += 1;

            let (kind, message) = match result {
                FetchResult::Success(success) => return AttemptOutcome::Success(success),
                FetchResult::Failure { kind, message } => (kind, message),
            };

            if !is_transient(kind) || attempts >= self.config.max_attempts {
                return AttemptOutcome::Failure {
                    kind,
                    message,
                    attempts,
                };
            }

            let delay = self.backoff_delay(attempts - 1);
            events.record(CrawlEvent::RetryScheduled {
                url: target.url.to_string(),
                attempt: attempts + 1,
                delay,
                kind,
            });
            tokio::time::sleep(delay).await;
        }
    }

    /// Computes the backoff delay after the given number of failed attempts
    ///
    /// `base * 2^n`, capped at the configured maximum, with ±25% jitter so
    /// retries against one host do not synchronize.
    fn backoff_delay(&self, failed_attempts: u32) -> Duration {
        let exponential = self
            .config
            .base_delay_ms
            .saturating_mul(2u64.saturating_pow(failed_attempts.min(16)));
        let capped = exponential.min(self.config.max_delay_ms);

        let jitter_span = capped / 4;
        let jittered = if jitter_span > 0 {
            capped - jitter_span + fastrand::u64(0..=jitter_span * 2)
        } else {
            capped
        };

        Duration::from_millis(jittered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CrawlerConfig, UserAgentConfig};
    use crate::crawler::fetcher::build_http_client;
    use crate::events::CollectingEventSink;
    use url::Url;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn fast_retry_config() -> RetryConfig {
        RetryConfig {
            max_attempts: 3,
            base_delay_ms: 1,
            max_delay_ms: 10,
        }
    }

    fn test_client() -> Client {
        let ua = UserAgentConfig {
            crawler_name: "TestCrawler".to_string(),
            crawler_version: "1.0".to_string(),
            contact_url: "https://example.com/about".to_string(),
            contact_email: "admin@example.com".to_string(),
        };
        let crawler = CrawlerConfig {
            workers: 2,
            request_timeout_secs: 5,
            min_domain_interval_ms: 10,
            max_domain_concurrency: 1,
            max_redirects: 5,
            max_run_secs: None,
        };
        build_http_client(&ua, &crawler).unwrap()
    }

    fn test_limiter() -> RateLimiter {
        RateLimiter::with_settings(Duration::from_millis(1), 4)
    }

    fn target(url: &str) -> CrawlTarget {
        CrawlTarget::new(Url::parse(url).unwrap(), 0)
    }

    #[test]
    fn test_transient_classification() {
        assert!(is_transient(FailureKind::Timeout));
        assert!(is_transient(FailureKind::ConnectionError));
        assert!(is_transient(FailureKind::DnsError));
        assert!(is_transient(FailureKind::HttpError(429)));
        assert!(is_transient(FailureKind::HttpError(500)));
        assert!(is_transient(FailureKind::HttpError(503)));

        assert!(!is_transient(FailureKind::HttpError(404)));
        assert!(!is_transient(FailureKind::HttpError(403)));
        assert!(!is_transient(FailureKind::HttpError(400)));
        assert!(!is_transient(FailureKind::TooManyRedirects));
    }

    #[test]
    fn test_backoff_grows_and_caps() {
        let policy = RetryPolicy::new(
            RetryConfig {
                max_attempts: 5,
                base_delay_ms: 100,
                max_delay_ms: 1000,
            },
            10,
        );

        // With ±25% jitter, delay n lives in [0.75, 1.25] * min(base * 2^n, cap)
        let d0 = policy.backoff_delay(0).as_millis() as u64;
        assert!((75..=125).contains(&d0), "d0 = {}", d0);

        let d2 = policy.backoff_delay(2).as_millis() as u64;
        assert!((300..=500).contains(&d2), "d2 = {}", d2);

        let d10 = policy.backoff_delay(10).as_millis() as u64;
        assert!(d10 <= 1250, "d10 = {}", d10);
    }

    #[tokio::test]
    async fn test_persistent_503_exhausts_attempts() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/flaky"))
            .respond_with(ResponseTemplate::new(503))
            .expect(3)
            .mount(&server)
            .await;

        let policy = RetryPolicy::new(fast_retry_config(), 5);
        let sink = CollectingEventSink::new();
        let outcome = policy
            .attempt(
                &test_client(),
                &test_limiter(),
                &target(&format!("{}/flaky", server.uri())),
                &sink,
            )
            .await;

        match outcome {
            AttemptOutcome::Failure {
                kind, attempts, ..
            } => {
                assert_eq!(kind, FailureKind::HttpError(503));
                assert_eq!(attempts, 3);
            }
            AttemptOutcome::Success(_) => panic!("expected failure"),
        }

        // Two backoffs were scheduled between the three attempts
        let retries = sink
            .events()
            .iter()
            .filter(|e| matches!(e, CrawlEvent::RetryScheduled { .. }))
            .count();
        assert_eq!(retries, 2);
    }

    #[tokio::test]
    async fn test_404_is_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/gone"))
            .respond_with(ResponseTemplate::new(404))
            .expect(1)
            .mount(&server)
            .await;

        let policy = RetryPolicy::new(fast_retry_config(), 5);
        let sink = CollectingEventSink::new();
        let outcome = policy
            .attempt(
                &test_client(),
                &test_limiter(),
                &target(&format!("{}/gone", server.uri())),
                &sink,
            )
            .await;

        match outcome {
            AttemptOutcome::Failure {
                kind, attempts, ..
            } => {
                assert_eq!(kind, FailureKind::HttpError(404));
                assert_eq!(attempts, 1);
            }
            AttemptOutcome::Success(_) => panic!("expected failure"),
        }
    }

    #[tokio::test]
    async fn test_recovery_after_transient_failure() {
        let server = MockServer::start().await;
        // First attempt sees a 503, the mock then expires and the second
        // mounted mock answers 200
        Mock::given(method("GET"))
            .and(path("/recovering"))
            .respond_with(ResponseTemplate::new(503))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/recovering"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("<html></html>")
                    .insert_header("content-type", "text/html"),
            )
            .mount(&server)
            .await;

        let policy = RetryPolicy::new(fast_retry_config(), 5);
        let sink = CollectingEventSink::new();
        let outcome = policy
            .attempt(
                &test_client(),
                &test_limiter(),
                &target(&format!("{}/recovering", server.uri())),
                &sink,
            )
            .await;

        assert!(matches!(outcome, AttemptOutcome::Success(_)));
    }
}
