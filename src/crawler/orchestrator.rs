//! Crawl orchestration
//!
//! Owns the worker pool and the shared claim queue. Each worker repeatedly
//! claims the next target (an atomic cursor, so no target is ever processed
//! twice), runs it through the retry policy and the extractor, and pushes
//! exactly one outcome into the collector channel. The run ends when the
//! queue is exhausted and every in-flight attempt has finished; individual
//! failures never end it early.

use crate::config::Config;
use crate::crawler::fetcher::build_http_client;
use crate::crawler::limiter::RateLimiter;
use crate::crawler::outcome::{CrawlTarget, RunResult, SiteOutcome};
use crate::crawler::retry::{AttemptOutcome, RetryPolicy};
use crate::events::{CrawlEvent, EventSink};
use crate::extractor::{extract, ExtractOptions};
use crate::{ConfigError, SweepError};
use reqwest::Client;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;

/// Handle for aborting a run from outside the worker pool
///
/// Cancellation stops dispatch of new targets; in-flight attempts finish or
/// time out naturally and their outcomes are still recorded.
#[derive(Clone)]
pub struct CancelHandle {
    flag: Arc<AtomicBool>,
}

impl CancelHandle {
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}

/// Shared state cloned into every worker
struct WorkerContext {
    client: Client,
    limiter: RateLimiter,
    retry: RetryPolicy,
    options: ExtractOptions,
    events: Arc<dyn EventSink>,
    targets: Arc<Vec<CrawlTarget>>,
    cursor: AtomicUsize,
    cancel: Arc<AtomicBool>,
}

/// The crawl orchestrator
///
/// Construction validates nothing beyond client setup; all run-level
/// validation happens in [`Orchestrator::run`] before any worker starts.
pub struct Orchestrator {
    config: Arc<Config>,
    client: Client,
    events: Arc<dyn EventSink>,
    cancel: Arc<AtomicBool>,
}

impl Orchestrator {
    /// Creates a new orchestrator
    ///
    /// # Arguments
    ///
    /// * `config` - The validated crawler configuration
    /// * `events` - Sink receiving the run's event stream
    pub fn new(config: Config, events: Arc<dyn EventSink>) -> Result<Self, SweepError> {
        let client = build_http_client(&config.user_agent, &config.crawler)?;

        Ok(Self {
            config: Arc::new(config),
            client,
            events,
            cancel: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Returns a handle that aborts the run when cancelled
    pub fn cancel_handle(&self) -> CancelHandle {
        CancelHandle {
            flag: Arc::clone(&self.cancel),
        }
    }

    /// Runs the crawl over the given targets
    ///
    /// Spawns a fixed pool of `workers` tasks over a shared claim queue and
    /// collects one [`SiteOutcome`] per dispatched target, in completion
    /// order. Guaranteed: every claimed target produces exactly one outcome,
    /// and no target is claimed twice.
    ///
    /// # Arguments
    ///
    /// * `targets` - The input URL list, positions already assigned
    ///
    /// # Returns
    ///
    /// * `Ok(RunResult)` - One outcome per dispatched target plus counters
    /// * `Err(SweepError)` - Empty target list or worker pool failure
    pub async fn run(&self, targets: Vec<CrawlTarget>) -> Result<RunResult, SweepError> {
        if targets.is_empty() {
            return Err(ConfigError::EmptyTargets("no targets to crawl".to_string()).into());
        }

        let worker_count = (self.config.crawler.workers as usize).min(targets.len());
        let total = targets.len();
        let start = Instant::now();

        tracing::info!(
            "Starting crawl: {} targets, {} workers",
            total,
            worker_count
        );

        // Wall-clock budget raises the cancel flag when exceeded
        let budget_task = self.config.crawler.max_run_secs.map(|secs| {
            let cancel = Arc::clone(&self.cancel);
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_secs(secs)).await;
                tracing::warn!("Wall-clock budget of {}s exceeded, cancelling run", secs);
                cancel.store(true, Ordering::Relaxed);
            })
        });

        let context = Arc::new(WorkerContext {
            client: self.client.clone(),
            limiter: RateLimiter::new(&self.config.crawler),
            retry: RetryPolicy::new(
                self.config.retry.clone(),
                self.config.crawler.max_redirects,
            ),
            options: ExtractOptions::from_output(&self.config.output),
            events: Arc::clone(&self.events),
            targets: Arc::new(targets),
            cursor: AtomicUsize::new(0),
            cancel: Arc::clone(&self.cancel),
        });

        let (tx, mut rx) = mpsc::unbounded_channel();

        let mut handles = Vec::with_capacity(worker_count);
        for worker_id in 0..worker_count {
            let context = Arc::clone(&context);
            let tx = tx.clone();
            handles.push(tokio::spawn(async move {
                worker_loop(worker_id, context, tx).await;
            }));
        }
        drop(tx);

        // Collect outcomes in completion order until every worker is done
        let mut outcomes = Vec::with_capacity(total);
        while let Some(outcome) = rx.recv().await {
            outcomes.push(outcome);
            if outcomes.len() % 25 == 0 {
                let rate = outcomes.len() as f64 / start.elapsed().as_secs_f64();
                tracing::info!(
                    "Progress: {}/{} targets, {:.2} targets/sec",
                    outcomes.len(),
                    total,
                    rate
                );
            }
        }

        for handle in handles {
            handle
                .await
                .map_err(|e| SweepError::WorkerPool(e.to_string()))?;
        }

        if let Some(task) = budget_task {
            task.abort();
        }

        let result = RunResult::from_outcomes(outcomes, start.elapsed());

        tracing::info!(
            "Crawl complete: {} succeeded, {} failed in {:?}",
            result.succeeded,
            result.failed,
            result.elapsed
        );

        Ok(result)
    }
}

/// One worker: claim, process, report, until the queue is exhausted
async fn worker_loop(
    worker_id: usize,
    context: Arc<WorkerContext>,
    tx: mpsc::UnboundedSender<SiteOutcome>,
) {
    loop {
        if context.cancel.load(Ordering::Relaxed) {
            tracing::debug!("Worker {} stopping: run cancelled", worker_id);
            break;
        }

        let index = context.cursor.fetch_add(1, Ordering::Relaxed);
        if index >= context.targets.len() {
            break;
        }

        let target = &context.targets[index];
        tracing::debug!("Worker {} processing {}", worker_id, target.url);

        let outcome = process_target(&context, target).await;

        if tx.send(outcome).is_err() {
            // Collector is gone; nothing left to report to
            break;
        }
    }
}

/// Processes a single target into its one outcome
async fn process_target(context: &WorkerContext, target: &CrawlTarget) -> SiteOutcome {
    let url = target.url.to_string();

    context.events.record(CrawlEvent::TargetStarted { url: url.clone() });

    let attempt = context
        .retry
        .attempt(&context.client, &context.limiter, target, &*context.events)
        .await;

    match attempt {
        AttemptOutcome::Success(success) => {
            match extract(&target.url, &success, &context.options) {
                Ok(record) => {
                    context
                        .events
                        .record(CrawlEvent::TargetSucceeded { url: url.clone() });
                    SiteOutcome::Success {
                        url,
                        position: target.position,
                        record,
                    }
                }
                Err(error) => {
                    context.events.record(CrawlEvent::TargetFailed {
                        url: url.clone(),
                        kind: error.kind().to_string(),
                    });
                    SiteOutcome::ExtractionError {
                        url,
                        position: target.position,
                        kind: error.kind(),
                        message: error.to_string(),
                    }
                }
            }
        }
        AttemptOutcome::Failure {
            kind,
            message,
            attempts,
        } => {
            context.events.record(CrawlEvent::TargetFailed {
                url: url.clone(),
                kind: kind.to_string(),
            });
            SiteOutcome::FetchError {
                url,
                position: target.position,
                kind,
                message,
                attempts,
            }
        }
    }
}
