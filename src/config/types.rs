use serde::Deserialize;
use std::time::Duration;

/// Main configuration structure for Sitesweep
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub retry: RetryConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub output: OutputConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Number of concurrent workers in the pool
    pub workers: u32,

    /// Hard timeout for a single fetch attempt (seconds, connect + read)
    #[serde(rename = "request-timeout-secs", default = "default_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Minimum time between request starts to the same domain (milliseconds)
    #[serde(rename = "min-domain-interval-ms", default = "default_interval_ms")]
    pub min_domain_interval_ms: u64,

    /// Maximum concurrent in-flight requests per domain
    #[serde(rename = "max-domain-concurrency", default = "default_domain_concurrency")]
    pub max_domain_concurrency: u32,

    /// Maximum number of redirect hops followed per attempt
    #[serde(rename = "max-redirects", default = "default_max_redirects")]
    pub max_redirects: u32,

    /// Optional wall-clock budget for the whole run (seconds).
    /// When exceeded, no new targets are dispatched.
    #[serde(rename = "max-run-secs", default)]
    pub max_run_secs: Option<u64>,
}

impl CrawlerConfig {
    /// The per-attempt fetch timeout as a Duration
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// The per-domain minimum interval as a Duration
    pub fn min_domain_interval(&self) -> Duration {
        Duration::from_millis(self.min_domain_interval_ms)
    }
}

/// Retry and backoff configuration
#[derive(Debug, Clone, Deserialize)]
pub struct RetryConfig {
    /// Maximum fetch attempts per target, including the first
    #[serde(rename = "max-attempts", default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Base backoff delay before the first retry (milliseconds)
    #[serde(rename = "base-delay-ms", default = "default_base_delay_ms")]
    pub base_delay_ms: u64,

    /// Cap applied to the exponential backoff delay (milliseconds)
    #[serde(rename = "max-delay-ms", default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            base_delay_ms: default_base_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: String,

    /// Email address for crawler-related contact
    #[serde(rename = "contact-email")]
    pub contact_email: String,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path to the target list file (one URL per line, `#` comments)
    #[serde(rename = "target-list")]
    pub target_list: String,

    /// Path to the JSON data file
    #[serde(rename = "data-path")]
    pub data_path: String,

    /// Path to the Markdown report file
    #[serde(rename = "report-path")]
    pub report_path: String,

    /// Maximum links collected per page (0 = unlimited)
    #[serde(rename = "max-links-per-page", default = "default_max_links")]
    pub max_links_per_page: usize,

    /// Maximum images collected per page (0 = unlimited)
    #[serde(rename = "max-images-per-page", default = "default_max_images")]
    pub max_images_per_page: usize,

    /// Reorder outcomes to match the input list before writing artifacts
    #[serde(rename = "input-order", default = "default_input_order")]
    pub input_order: bool,
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_interval_ms() -> u64 {
    1000
}

fn default_domain_concurrency() -> u32 {
    1
}

fn default_max_redirects() -> u32 {
    10
}

fn default_max_attempts() -> u32 {
    3
}

fn default_base_delay_ms() -> u64 {
    500
}

fn default_max_delay_ms() -> u64 {
    30_000
}

fn default_max_links() -> usize {
    50
}

fn default_max_images() -> usize {
    20
}

fn default_input_order() -> bool {
    true
}
