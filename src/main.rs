//! Link-Crawler main entry point
//!
//! This is the command-line interface for the Link-Crawler web crawler.

use anyhow::{bail, Context};
use clap::Parser;
use link_crawler::config::{load_config_with_hash, validate, Config};
use link_crawler::crawler::Crawler;
use link_crawler::output::{
    generate_markdown_summary, print_crawling_results, print_statistics, CrawlStatistics,
};
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

/// Link-Crawler: a bounded-concurrency web crawler
///
/// Link-Crawler starts from a seed URL, follows the links it finds up to a
/// configurable depth, and reports the links present on every page it
/// crawled. Settings come from an optional TOML file; command-line flags
/// override them.
#[derive(Parser, Debug)]
#[command(name = "link-crawler")]
#[command(version = "1.0.0")]
#[command(about = "A bounded-concurrency web crawler", long_about = None)]
struct Cli {
    /// Seed URL (overrides the url in the configuration file)
    #[arg(value_name = "URL")]
    url: Option<String>,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Maximum link depth from the seed (0 = seed only)
    #[arg(long, value_name = "N")]
    max_depth: Option<u32>,

    /// Number of concurrent workers
    #[arg(long, value_name = "N")]
    max_runners: Option<usize>,

    /// Maximum number of requests in flight at the same time
    #[arg(long, value_name = "N")]
    concurrent_requests_limit: Option<usize>,

    /// Retries after a failed request
    #[arg(long, value_name = "N")]
    max_retries: Option<u32>,

    /// Also search the page bodies for links with a pattern
    #[arg(long)]
    regex_search: bool,

    /// Follow links to other domains
    #[arg(long)]
    no_domain_filter: bool,

    /// Print every page as soon as it is crawled
    #[arg(long)]
    print_in_real_time: bool,

    /// Per-request timeout in seconds
    #[arg(long, value_name = "N")]
    timeout_secs: Option<u64>,

    /// Write a markdown summary of the crawl to this file
    #[arg(long, value_name = "FILE")]
    summary: Option<PathBuf>,

    /// Validate the configuration and show it without crawling
    #[arg(long)]
    dry_run: bool,
}

impl Cli {
    /// Applies command-line values on top of the loaded configuration
    fn apply_overrides(&self, config: &mut Config) {
        let crawler = &mut config.crawler;

        if let Some(url) = &self.url {
            crawler.url = url.clone();
        }
        if let Some(max_depth) = self.max_depth {
            crawler.max_depth = Some(max_depth);
        }
        if let Some(max_runners) = self.max_runners {
            crawler.max_runners = max_runners;
        }
        if let Some(limit) = self.concurrent_requests_limit {
            crawler.concurrent_requests_limit = Some(limit);
        }
        if let Some(max_retries) = self.max_retries {
            crawler.max_retries = max_retries;
        }
        if let Some(timeout) = self.timeout_secs {
            crawler.request_timeout_ms = timeout.saturating_mul(1000);
        }
        if self.regex_search {
            crawler.regex_search = true;
        }
        if self.no_domain_filter {
            crawler.domain_filter = false;
        }
        if self.print_in_real_time {
            crawler.print_in_real_time = true;
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let (config, config_hash) = load(&cli)?;

    if cli.dry_run {
        handle_dry_run(&config);
        return Ok(());
    }

    handle_crawl(config, config_hash.as_deref(), cli.summary.as_deref()).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("link_crawler=info,warn"),
            1 => EnvFilter::new("link_crawler=debug,info"),
            2 => EnvFilter::new("link_crawler=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Builds the effective configuration from the file and the command line
fn load(cli: &Cli) -> anyhow::Result<(Config, Option<String>)> {
    let (mut config, config_hash) = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("failed to load configuration from {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            (config, Some(hash))
        }
        None => match &cli.url {
            Some(url) => (Config::new(url.clone()), None),
            None => bail!("a seed URL or a configuration file is required"),
        },
    };

    cli.apply_overrides(&mut config);
    validate(&config).context("invalid configuration")?;

    Ok((config, config_hash))
}

/// Handles the --dry-run mode: shows the effective configuration
fn handle_dry_run(config: &Config) {
    let crawler = &config.crawler;

    println!("=== Link-Crawler Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  Seed: {}", crawler.url);
    match crawler.max_depth {
        Some(depth) => println!("  Max depth: {}", depth),
        None => println!("  Max depth: unlimited"),
    }
    println!("  Runners: {}", crawler.max_runners);
    println!("  Requests in flight: {}", crawler.in_flight_limit());
    println!("  Max retries: {}", crawler.max_retries);
    println!(
        "  Sleep between retries: {:?}",
        crawler.sleep_between_retries()
    );
    println!("  Sleep after request: {:?}", crawler.sleep_after_request());
    println!("  Request timeout: {:?}", crawler.request_timeout());
    if let Some(limit) = crawler.max_duration() {
        println!("  Max duration: {:?}", limit);
    }
    println!("  Regex search: {}", crawler.regex_search);
    if let Some(pattern) = &crawler.link_pattern {
        println!("  Link pattern: {}", pattern);
    }
    println!("  Domain filter: {}", crawler.domain_filter);
    println!("  Assume parent protocol: {}", crawler.assume_parent_protocol);
    println!("  Skip content URLs: {}", crawler.skip_content_urls);

    println!("\nHeaders ({}):", config.headers.len());
    let mut headers: Vec<_> = config.headers.iter().collect();
    headers.sort();
    for (name, value) in headers {
        println!("  {}: {}", name, value);
    }

    println!("\n✓ Configuration is valid");
}

/// Handles the main crawl operation
async fn handle_crawl(
    config: Config,
    config_hash: Option<&str>,
    summary_path: Option<&std::path::Path>,
) -> anyhow::Result<()> {
    let print_in_real_time = config.crawler.print_in_real_time;
    let crawler = Crawler::new(config).context("failed to start the crawl")?;

    let cancel = CancellationToken::new();
    let interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, stopping the crawl");
            interrupt.cancel();
        }
    });

    let report = crawler.crawl_with_cancellation(cancel).await?;

    if !print_in_real_time {
        print_crawling_results(&report);
    }
    print_statistics(&CrawlStatistics::from_report(&report));

    if let Some(path) = summary_path {
        generate_markdown_summary(&report, config_hash, path)
            .with_context(|| format!("failed to write summary to {}", path.display()))?;
        println!("\n✓ Summary exported to: {}", path.display());
    }

    Ok(())
}
