//! Integration tests for the crawl pipeline
//!
//! These tests use wiremock to stand in for remote servers and exercise the
//! orchestrator end-to-end: one outcome per input target, retry accounting,
//! per-domain politeness, and extraction error handling.

use sitesweep::config::{Config, CrawlerConfig, OutputConfig, RetryConfig, UserAgentConfig};
use sitesweep::events::{CollectingEventSink, CrawlEvent, EventSink};
use sitesweep::url::normalize_url;
use sitesweep::{CrawlTarget, Orchestrator, SiteOutcome};
use std::sync::Arc;
use std::time::{Duration, Instant};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration with fast timings
fn test_config(workers: u32, min_interval_ms: u64) -> Config {
    Config {
        crawler: CrawlerConfig {
            workers,
            request_timeout_secs: 5,
            min_domain_interval_ms: min_interval_ms,
            max_domain_concurrency: 1,
            max_redirects: 5,
            max_run_secs: None,
        },
        retry: RetryConfig {
            max_attempts: 3,
            base_delay_ms: 1,
            max_delay_ms: 10,
        },
        user_agent: UserAgentConfig {
            crawler_name: "TestBot".to_string(),
            crawler_version: "1.0.0".to_string(),
            contact_url: "https://example.com/contact".to_string(),
            contact_email: "test@example.com".to_string(),
        },
        output: OutputConfig {
            target_list: "./targets.txt".to_string(),
            data_path: "./test_data.json".to_string(),
            report_path: "./test_report.md".to_string(),
            max_links_per_page: 50,
            max_images_per_page: 20,
            input_order: true,
        },
    }
}

fn targets_from(urls: &[String]) -> Vec<CrawlTarget> {
    urls.iter()
        .enumerate()
        .map(|(i, u)| CrawlTarget::new(normalize_url(u).expect("valid test URL"), i))
        .collect()
}

async fn mount_html(server: &MockServer, route: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(body.to_string(), "text/html; charset=utf-8"),
        )
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_every_target_produces_one_outcome() {
    let server = MockServer::start().await;

    for i in 0..6 {
        mount_html(
            &server,
            &format!("/page{}", i),
            &format!("<html><head><title>Page {}</title></head></html>", i),
        )
        .await;
    }
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let mut urls: Vec<String> = (0..6).map(|i| format!("{}/page{}", server.uri(), i)).collect();
    urls.push(format!("{}/missing", server.uri()));

    let targets = targets_from(&urls);
    let total = targets.len();

    let orchestrator =
        Orchestrator::new(test_config(4, 10), Arc::new(CollectingEventSink::new())).unwrap();
    let result = orchestrator.run(targets).await.unwrap();

    // The central invariant: exactly one outcome per input URL
    assert_eq!(result.outcomes.len(), total);
    assert_eq!(result.attempted, total);
    assert_eq!(result.succeeded, 6);
    assert_eq!(result.failed, 1);

    // No URL appears twice
    let mut seen: Vec<&str> = result.outcomes.iter().map(|o| o.url()).collect();
    seen.sort();
    seen.dedup();
    assert_eq!(seen.len(), total);
}

#[tokio::test]
async fn test_outcomes_reassemble_to_input_order() {
    let server = MockServer::start().await;
    for i in 0..5 {
        mount_html(
            &server,
            &format!("/p{}", i),
            &format!("<html><head><title>T{}</title></head></html>", i),
        )
        .await;
    }

    let urls: Vec<String> = (0..5).map(|i| format!("{}/p{}", server.uri(), i)).collect();
    let targets = targets_from(&urls);

    let orchestrator =
        Orchestrator::new(test_config(5, 1), Arc::new(CollectingEventSink::new())).unwrap();
    let mut result = orchestrator.run(targets).await.unwrap();

    result.sort_by_input_order();

    let ordered: Vec<&str> = result.outcomes.iter().map(|o| o.url()).collect();
    let expected: Vec<&str> = urls.iter().map(String::as_str).collect();
    assert_eq!(ordered, expected);
}

#[tokio::test]
async fn test_persistent_503_uses_all_attempts() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/down"))
        .respond_with(ResponseTemplate::new(503))
        .expect(3)
        .mount(&server)
        .await;

    let targets = targets_from(&[format!("{}/down", server.uri())]);
    let sink = Arc::new(CollectingEventSink::new());
    let orchestrator = Orchestrator::new(test_config(1, 1), Arc::clone(&sink) as Arc<dyn EventSink>).unwrap();
    let result = orchestrator.run(targets).await.unwrap();

    match &result.outcomes[0] {
        SiteOutcome::FetchError {
            kind, attempts, ..
        } => {
            assert_eq!(kind.to_string(), "http-error(503)");
            assert_eq!(*attempts, 3);
        }
        other => panic!("expected fetch error, got {:?}", other),
    }

    // The event stream saw two scheduled retries
    let retries = sink
        .events()
        .iter()
        .filter(|e| matches!(e, CrawlEvent::RetryScheduled { .. }))
        .count();
    assert_eq!(retries, 2);
}

#[tokio::test]
async fn test_404_fails_without_retry() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/gone"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let targets = targets_from(&[format!("{}/gone", server.uri())]);
    let orchestrator =
        Orchestrator::new(test_config(1, 1), Arc::new(CollectingEventSink::new())).unwrap();
    let result = orchestrator.run(targets).await.unwrap();

    match &result.outcomes[0] {
        SiteOutcome::FetchError {
            kind, attempts, ..
        } => {
            assert_eq!(kind.to_string(), "http-error(404)");
            assert_eq!(*attempts, 1);
        }
        other => panic!("expected fetch error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_per_domain_spacing_bounds_run_time() {
    let server = MockServer::start().await;
    for i in 0..4 {
        mount_html(&server, &format!("/s{}", i), "<html></html>").await;
    }

    // All four targets share one domain; with a 100ms interval the four
    // request starts must span at least 300ms regardless of worker count
    let urls: Vec<String> = (0..4).map(|i| format!("{}/s{}", server.uri(), i)).collect();
    let targets = targets_from(&urls);

    let orchestrator =
        Orchestrator::new(test_config(4, 100), Arc::new(CollectingEventSink::new())).unwrap();

    let start = Instant::now();
    let result = orchestrator.run(targets).await.unwrap();
    let elapsed = start.elapsed();

    assert_eq!(result.succeeded, 4);
    assert!(
        elapsed >= Duration::from_millis(300),
        "politeness interval not enforced: run took {:?}",
        elapsed
    );
}

#[tokio::test]
async fn test_non_html_content_yields_extraction_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/blob"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(vec![0x25, 0x50, 0x44, 0x46])
                .insert_header("content-type", "application/octet-stream"),
        )
        .mount(&server)
        .await;

    let targets = targets_from(&[format!("{}/blob", server.uri())]);
    let orchestrator =
        Orchestrator::new(test_config(1, 1), Arc::new(CollectingEventSink::new())).unwrap();
    let result = orchestrator.run(targets).await.unwrap();

    // The outcome is an explicit error entry, not a dropped target
    assert_eq!(result.outcomes.len(), 1);
    match &result.outcomes[0] {
        SiteOutcome::ExtractionError { kind, .. } => {
            assert_eq!(kind.to_string(), "unsupported-content-type");
        }
        other => panic!("expected extraction error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_dns_failure_produces_error_outcome() {
    let server = MockServer::start().await;
    mount_html(
        &server,
        "/",
        r#"<html><head><title>Example</title></head><body></body></html>"#,
    )
    .await;

    // .invalid never resolves; the second target fails DNS on every attempt
    let urls = vec![
        format!("{}/", server.uri()),
        "https://bad.invalid/".to_string(),
    ];
    let targets = targets_from(&urls);

    let orchestrator =
        Orchestrator::new(test_config(2, 1), Arc::new(CollectingEventSink::new())).unwrap();
    let mut result = orchestrator.run(targets).await.unwrap();
    result.sort_by_input_order();

    assert_eq!(result.outcomes.len(), 2);

    match &result.outcomes[0] {
        SiteOutcome::Success { record, .. } => {
            assert_eq!(record.title, "Example");
            assert_eq!(record.http_status, 200);
        }
        other => panic!("expected success, got {:?}", other),
    }

    match &result.outcomes[1] {
        SiteOutcome::FetchError {
            kind, attempts, ..
        } => {
            assert_eq!(kind.to_string(), "dns-error");
            assert_eq!(*attempts, 3);
        }
        other => panic!("expected dns failure, got {:?}", other),
    }
}

#[tokio::test]
async fn test_metadata_extraction_end_to_end() {
    let server = MockServer::start().await;
    mount_html(
        &server,
        "/article",
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <title>Deep Dive</title>
    <meta name="description" content="An article">
    <meta name="keywords" content="a, b, a">
    <meta name="author" content="Writer">
    <meta property="article:published_time" content="2024-05-01T00:00:00Z">
    <meta property="og:title" content="First OG">
    <meta property="og:title" content="Second OG">
    <meta name="twitter:card" content="summary">
    <script type="application/ld+json">{"@type": "Article"}</script>
    <link rel="canonical" href="/article">
</head>
<body>
    <h1>Deep Dive</h1>
    <a href="/more">More</a>
    <a href="https://elsewhere.example/ref">Ref</a>
    <img src="/pic.png" alt="Pic">
</body>
</html>"#,
    )
    .await;

    let targets = targets_from(&[format!("{}/article", server.uri())]);
    let orchestrator =
        Orchestrator::new(test_config(1, 1), Arc::new(CollectingEventSink::new())).unwrap();
    let result = orchestrator.run(targets).await.unwrap();

    let record = match &result.outcomes[0] {
        SiteOutcome::Success { record, .. } => record,
        other => panic!("expected success, got {:?}", other),
    };

    assert_eq!(record.title, "Deep Dive");
    assert_eq!(record.meta_description, "An article");
    assert_eq!(record.meta_keywords, vec!["a", "b"]);
    assert_eq!(record.author, "Writer");
    assert_eq!(record.publish_date, "2024-05-01T00:00:00Z");
    assert_eq!(record.language, "en");

    // Later duplicate Open Graph tag wins
    assert_eq!(
        record.open_graph.get("title").map(String::as_str),
        Some("Second OG")
    );
    assert_eq!(
        record.twitter_card.get("card").map(String::as_str),
        Some("summary")
    );
    assert_eq!(record.structured_data.len(), 1);
    assert_eq!(record.headings.h1, vec!["Deep Dive"]);

    // The relative link shares the mock server's host; the other is external
    assert_eq!(record.links.internal.len(), 1);
    assert_eq!(record.links.external.len(), 1);
    assert_eq!(record.images.len(), 1);
}

#[tokio::test]
async fn test_event_stream_per_target() {
    let server = MockServer::start().await;
    mount_html(&server, "/ok", "<html><head><title>OK</title></head></html>").await;
    Mock::given(method("GET"))
        .and(path("/gone"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let urls = vec![
        format!("{}/ok", server.uri()),
        format!("{}/gone", server.uri()),
    ];
    let sink = Arc::new(CollectingEventSink::new());
    let orchestrator = Orchestrator::new(test_config(1, 1), Arc::clone(&sink) as Arc<dyn EventSink>).unwrap();
    orchestrator.run(targets_from(&urls)).await.unwrap();

    let events = sink.events();

    let started = events
        .iter()
        .filter(|e| matches!(e, CrawlEvent::TargetStarted { .. }))
        .count();
    let succeeded = events
        .iter()
        .filter(|e| matches!(e, CrawlEvent::TargetSucceeded { .. }))
        .count();
    let failed = events
        .iter()
        .filter(|e| matches!(e, CrawlEvent::TargetFailed { .. }))
        .count();

    assert_eq!(started, 2);
    assert_eq!(succeeded, 1);
    assert_eq!(failed, 1);
}

#[tokio::test]
async fn test_crawl_is_idempotent_over_fixed_pages() {
    let server = MockServer::start().await;
    mount_html(
        &server,
        "/stable",
        r#"<html lang="en"><head><title>Stable</title>
        <meta name="description" content="Same every time"></head>
        <body><h1>Stable</h1></body></html>"#,
    )
    .await;

    let urls = vec![format!("{}/stable", server.uri())];

    let orchestrator =
        Orchestrator::new(test_config(1, 1), Arc::new(CollectingEventSink::new())).unwrap();
    let first = orchestrator.run(targets_from(&urls)).await.unwrap();
    let second = orchestrator.run(targets_from(&urls)).await.unwrap();

    let record_of = |result: &sitesweep::RunResult| match &result.outcomes[0] {
        SiteOutcome::Success { record, .. } => record.clone(),
        other => panic!("expected success, got {:?}", other),
    };

    assert_eq!(record_of(&first), record_of(&second));
}
