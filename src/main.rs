//! Kost-Crawler main entry point
//!
//! This is the command-line interface for the Kost-Crawler listing crawler.

use anyhow::Context;
use clap::Parser;
use kost_crawler::config::{load_config_with_hash, Config, NavigatorKind};
use kost_crawler::output::print_summary;
use kost_crawler::run_crawl;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Kost-Crawler: a time-boxed listing crawler
///
/// Kost-Crawler walks a paginated listing site, fetches every detail page it
/// links to with a pool of workers, and writes one JSON record per page into
/// a directory named after the current date.
#[derive(Parser, Debug)]
#[command(name = "kost-crawler")]
#[command(version = "1.0.0")]
#[command(about = "A time-boxed listing crawler", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (reference settings when omitted)
    #[arg(value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be crawled without actually crawling
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("Failed to load configuration {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => {
            tracing::info!("No configuration file given, using reference settings");
            Config::default()
        }
    };

    if cli.dry_run {
        handle_dry_run(&config);
        return Ok(());
    }

    let summary = run_crawl(config).await.context("Crawl failed")?;
    tracing::info!("Crawl completed");

    if !cli.quiet {
        print_summary(&summary);
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("kost_crawler=info,warn"),
            1 => EnvFilter::new("kost_crawler=debug,info"),
            2 => EnvFilter::new("kost_crawler=trace,debug"),
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

/// Handles the --dry-run mode: shows the settings a crawl would use
fn handle_dry_run(config: &Config) {
    println!("=== Kost-Crawler Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  Listing URL: {}", config.crawler.listing_url);
    println!("  Workers: {}", config.crawler.worker_count);
    println!("  Queue capacity: {}", config.crawler.queue_capacity);
    println!("  Time budget: {}s", config.crawler.time_budget);
    println!(
        "  Navigator: {}",
        match config.crawler.navigator {
            NavigatorKind::Browser => "browser",
            NavigatorKind::Http => "http",
        }
    );

    println!("\nHTTP:");
    println!("  User agent: {}", config.http.user_agent);
    println!("  Request timeout: {}s", config.http.request_timeout);
    println!("  Connect timeout: {}s", config.http.connect_timeout);

    if config.crawler.navigator == NavigatorKind::Browser {
        println!("\nBrowser:");
        println!("  Headless: {}", config.browser.headless);
        println!(
            "  Stable after: {}ms (give up after {}ms)",
            config.browser.stable_interval, config.browser.stable_timeout
        );
    }

    println!("\nSite Selectors:");
    println!("  Item: {}", config.site.item);
    println!("  Item link: {}", config.site.item_link);
    println!("  Next page: {}", config.site.next_page);

    println!("\nOutput:");
    println!("  Root: {}", config.output.root);

    println!("\n✓ Configuration is valid");
}
