//! Crawler module for web page fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching behind the [`Transport`] trait
//! - Bounded retries of transient failures
//! - HTML parsing and link extraction
//! - The frontier queue and the worker pool
//! - Overall crawl coordination and the final report

mod coordinator;
mod frontier;
mod parser;
mod report;
mod retry;
mod transport;

pub use coordinator::Crawler;
pub use frontier::{Claimed, Frontier, FrontierEntry};
pub use parser::{extract_anchor_links, LinkExtractor, PatternExtractor};
pub use report::{CrawlReport, DiscardReason, DiscardRecord, FailureRecord, PageRecord};
pub use retry::{RetryOutcome, RetryPolicy};
pub use transport::{build_http_client, FetchResponse, HttpTransport, Transport};

use crate::config::Config;

/// Runs a complete crawl operation
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Validate the seed and the configuration
/// 2. Build the HTTP client
/// 3. Fetch pages and follow their links up to the configured depth
/// 4. Return the report once no work is left
///
/// # Arguments
///
/// * `config` - The crawler configuration
///
/// # Returns
///
/// * `Ok(CrawlReport)` - Crawl finished (individual page failures are in the report)
/// * `Err(CrawlError)` - Crawl could not start
pub async fn crawl(config: Config) -> crate::Result<CrawlReport> {
    Crawler::new(config)?.crawl().await
}
