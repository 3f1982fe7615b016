//! Sitesweep main entry point
//!
//! Command-line interface for the Sitesweep metadata crawler.

use clap::Parser;
use sitesweep::config::{load_config, load_targets};
use sitesweep::events::TracingEventSink;
use sitesweep::output::{write_json_data, write_report};
use sitesweep::Orchestrator;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Sitesweep: a batch metadata crawler for publisher websites
///
/// Sitesweep fetches every URL in the target list through a polite
/// per-domain rate limiter, extracts page metadata (title, meta tags,
/// Open Graph, Twitter Cards, JSON-LD, headings, links, images), and
/// writes a JSON data file plus a Markdown report.
#[derive(Parser, Debug)]
#[command(name = "sitesweep")]
#[command(version = "1.0.0")]
#[command(about = "A batch metadata crawler for publisher websites", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Override the target list path from the config
    #[arg(long, value_name = "FILE")]
    targets: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and target list, show what would be crawled, and exit
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let config = load_config(&cli.config)?;

    let target_path = cli
        .targets
        .clone()
        .unwrap_or_else(|| PathBuf::from(&config.output.target_list));
    let targets = load_targets(&target_path)?;

    tracing::info!(
        "Loaded {} targets from {}",
        targets.len(),
        target_path.display()
    );

    if cli.dry_run {
        handle_dry_run(&config, &targets);
        return Ok(());
    }

    let orchestrator = Orchestrator::new(config.clone(), Arc::new(TracingEventSink))?;

    // Operator abort: first Ctrl-C stops dispatch, in-flight attempts finish
    let cancel = orchestrator.cancel_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, finishing in-flight targets");
            cancel.cancel();
        }
    });

    let mut result = orchestrator.run(targets).await?;

    if config.output.input_order {
        result.sort_by_input_order();
    }

    write_json_data(&result, std::path::Path::new(&config.output.data_path))?;
    write_report(&result, std::path::Path::new(&config.output.report_path))?;

    println!(
        "Crawl complete: {} succeeded, {} failed, {:.2}s",
        result.succeeded,
        result.failed,
        result.elapsed.as_secs_f64()
    );
    println!("Data file: {}", config.output.data_path);
    println!("Report:    {}", config.output.report_path);

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("sitesweep=info,warn"),
            1 => EnvFilter::new("sitesweep=debug,info"),
            2 => EnvFilter::new("sitesweep=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: shows the validated run plan
fn handle_dry_run(config: &sitesweep::Config, targets: &[sitesweep::CrawlTarget]) {
    println!("=== Sitesweep Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  Workers: {}", config.crawler.workers);
    println!(
        "  Request timeout: {}s",
        config.crawler.request_timeout_secs
    );
    println!(
        "  Min domain interval: {}ms",
        config.crawler.min_domain_interval_ms
    );
    println!(
        "  Max domain concurrency: {}",
        config.crawler.max_domain_concurrency
    );
    println!("  Max redirects: {}", config.crawler.max_redirects);
    if let Some(secs) = config.crawler.max_run_secs {
        println!("  Wall-clock budget: {}s", secs);
    }

    println!("\nRetry Policy:");
    println!("  Max attempts: {}", config.retry.max_attempts);
    println!("  Base delay: {}ms", config.retry.base_delay_ms);
    println!("  Max delay: {}ms", config.retry.max_delay_ms);

    println!("\nUser Agent:");
    println!("  Name: {}", config.user_agent.crawler_name);
    println!("  Version: {}", config.user_agent.crawler_version);
    println!("  Contact URL: {}", config.user_agent.contact_url);
    println!("  Contact Email: {}", config.user_agent.contact_email);

    println!("\nOutput:");
    println!("  Data file: {}", config.output.data_path);
    println!("  Report: {}", config.output.report_path);

    println!("\nTargets ({}):", targets.len());
    for target in targets.iter().take(20) {
        println!("  - {}", target.url);
    }
    if targets.len() > 20 {
        println!("  ... and {} more", targets.len() - 20);
    }

    println!("\n✓ Configuration is valid");
    println!("✓ Would crawl {} URLs", targets.len());
}
