//! HTTP fetcher implementation
//!
//! This module performs exactly one logical fetch per call:
//! - Building the HTTP client with a proper user agent string
//! - One GET request with a hard timeout (connect + read)
//! - Manual redirect following, capped and classified
//! - Classification of every failure into a [`FailureKind`]
//!
//! Retry logic lives in the retry module; this component stays a single
//! deterministic unit of work.

use crate::config::{CrawlerConfig, UserAgentConfig};
use reqwest::{redirect::Policy, Client};
use serde::Serialize;
use std::collections::HashMap;
use std::error::Error as StdError;
use std::fmt;
use std::time::Duration;
use url::Url;

/// Classification of a failed fetch attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailureKind {
    /// The request exceeded the configured timeout
    Timeout,

    /// TCP/TLS-level failure (refused, reset, handshake)
    ConnectionError,

    /// The host could not be resolved
    DnsError,

    /// A terminal non-2xx response
    HttpError(u16),

    /// The redirect chain exceeded the configured cap
    TooManyRedirects,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Timeout => write!(f, "timeout"),
            Self::ConnectionError => write!(f, "connection-error"),
            Self::DnsError => write!(f, "dns-error"),
            Self::HttpError(status) => write!(f, "http-error({})", status),
            Self::TooManyRedirects => write!(f, "too-many-redirects"),
        }
    }
}

/// A successfully fetched response
#[derive(Debug, Clone)]
pub struct FetchSuccess {
    /// Final URL after redirects
    pub final_url: String,

    /// HTTP status code
    pub status_code: u16,

    /// Content-Type header value, empty if absent
    pub content_type: String,

    /// Response headers (first value per name)
    pub headers: HashMap<String, String>,

    /// Raw response body; decoding is the extractor's job
    pub body: Vec<u8>,
}

/// Result of a single fetch attempt
#[derive(Debug)]
pub enum FetchResult {
    /// Successfully fetched the page
    Success(FetchSuccess),

    /// Classified failure
    Failure { kind: FailureKind, message: String },
}

/// Builds an HTTP client with proper configuration
///
/// The user agent follows the format `CrawlerName/Version (+ContactURL;
/// ContactEmail)`. Redirects are disabled at the client level so the fetch
/// loop can cap and classify them itself.
///
/// # Arguments
///
/// * `user_agent` - The user agent configuration
/// * `crawler` - Crawler settings (request timeout)
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
pub fn build_http_client(
    user_agent: &UserAgentConfig,
    crawler: &CrawlerConfig,
) -> Result<Client, reqwest::Error> {
    let ua = format!(
        "{}/{} (+{}; {})",
        user_agent.crawler_name,
        user_agent.crawler_version,
        user_agent.contact_url,
        user_agent.contact_email
    );

    Client::builder()
        .user_agent(ua)
        .timeout(crawler.request_timeout())
        .connect_timeout(Duration::from_secs(10).min(crawler.request_timeout()))
        .redirect(Policy::none())
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches a URL with full error handling
///
/// Performs GET requests, following redirects manually up to
/// `max_redirects` hops. Every outcome is classified:
///
/// | Condition | Result |
/// |-----------|--------|
/// | 2xx | `Success` |
/// | 3xx with Location | follow, up to the cap |
/// | 3xx without Location | `HttpError(status)` |
/// | any other status | `HttpError(status)` |
/// | request timeout | `Timeout` |
/// | resolution failure | `DnsError` |
/// | connect/TLS failure | `ConnectionError` |
/// | chain longer than cap | `TooManyRedirects` |
///
/// # Arguments
///
/// * `client` - The HTTP client to use
/// * `url` - The URL to fetch
/// * `max_redirects` - Maximum redirect hops before giving up
pub async fn fetch_url(client: &Client, url: &Url, max_redirects: u32) -> FetchResult {
    let mut current = url.clone();

    for _hop in 0..=max_redirects {
        let response = match client.get(current.as_str()).send().await {
            Ok(r) => r,
            Err(e) => {
                let (kind, message) = classify_error(&e);
                return FetchResult::Failure { kind, message };
            }
        };

        let status = response.status();

        if status.is_redirection() {
            let location = response
                .headers()
                .get("location")
                .and_then(|v| v.to_str().ok())
                .map(str::to_string);

            match location.and_then(|loc| current.join(&loc).ok()) {
                Some(next) => {
                    tracing::trace!("Redirect {} -> {}", current, next);
                    current = next;
                    continue;
                }
                None => {
                    return FetchResult::Failure {
                        kind: FailureKind::HttpError(status.as_u16()),
                        message: format!("HTTP {} without usable Location header", status),
                    };
                }
            }
        }

        if !status.is_success() {
            return FetchResult::Failure {
                kind: FailureKind::HttpError(status.as_u16()),
                message: format!("HTTP {}", status),
            };
        }

        let content_type = response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();

        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();

        let final_url = response.url().to_string();
        let status_code = status.as_u16();

        return match response.bytes().await {
            Ok(bytes) => FetchResult::Success(FetchSuccess {
                final_url,
                status_code,
                content_type,
                headers,
                body: bytes.to_vec(),
            }),
            Err(e) => {
                let (kind, message) = classify_error(&e);
                FetchResult::Failure { kind, message }
            }
        };
    }

    FetchResult::Failure {
        kind: FailureKind::TooManyRedirects,
        message: format!("redirect chain exceeded {} hops", max_redirects),
    }
}

/// Maps a reqwest error onto the failure taxonomy
fn classify_error(e: &reqwest::Error) -> (FailureKind, String) {
    if e.is_timeout() {
        return (FailureKind::Timeout, "request timeout".to_string());
    }

    if is_dns_failure(e) {
        return (FailureKind::DnsError, e.to_string());
    }

    if e.is_connect() {
        return (FailureKind::ConnectionError, e.to_string());
    }

    (FailureKind::ConnectionError, e.to_string())
}

/// Walks the error source chain looking for a resolution failure
///
/// reqwest does not expose DNS errors as a distinct category; the resolver's
/// message is the only reliable signal across platforms.
fn is_dns_failure(e: &reqwest::Error) -> bool {
    let mut source: Option<&(dyn StdError + 'static)> = e.source();
    while let Some(err) = source {
        let msg = err.to_string().to_lowercase();
        if msg.contains("dns")
            || msg.contains("name resolution")
            || msg.contains("name or service not known")
            || msg.contains("failed to lookup address")
        {
            return true;
        }
        source = err.source();
    }
    false
}
