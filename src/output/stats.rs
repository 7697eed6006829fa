//! Statistics generation from a crawl report
//!
//! This module provides functionality for extracting and displaying
//! crawl statistics from a finished [`CrawlReport`].

use crate::crawler::{CrawlReport, DiscardReason};
use std::collections::{BTreeMap, HashSet};

/// Crawl statistics summary
#[derive(Debug, Clone, PartialEq)]
pub struct CrawlStatistics {
    /// Number of URLs admitted to the frontier
    pub total_urls: usize,

    /// Pages fetched successfully
    pub pages_crawled: usize,

    /// Pages whose fetch failed permanently
    pub pages_failed: usize,

    /// Discarded URLs by reason (reasons with no URL are omitted)
    pub discarded_by_reason: BTreeMap<DiscardReason, usize>,

    /// Number of distinct domains among crawled and failed pages
    pub unique_domains: usize,

    /// Total number of links reported across crawled pages
    pub total_links: usize,

    /// Link candidates that could not be resolved to a valid URL
    pub invalid_links: usize,

    /// Transport attempts, retries included
    pub requests_made: usize,

    /// Attempts beyond the first one
    pub retries: usize,

    /// HTTP status of failed pages, `None` for network-level failures
    pub failures_by_status: BTreeMap<Option<u16>, usize>,

    /// Number of crawled pages per depth
    pub depth_breakdown: BTreeMap<u32, usize>,

    /// Crawl duration in seconds
    pub duration_seconds: f64,

    pub cancelled: bool,
}

impl CrawlStatistics {
    /// Computes statistics for a finished crawl
    pub fn from_report(report: &CrawlReport) -> Self {
        let mut discarded_by_reason = BTreeMap::new();
        for record in report.discarded.values() {
            *discarded_by_reason.entry(record.reason).or_insert(0) += 1;
        }

        let mut failures_by_status = BTreeMap::new();
        for failure in report.failed.values() {
            let status = match failure.error {
                crate::TransportError::Status { status, .. } => Some(status),
                _ => None,
            };
            *failures_by_status.entry(status).or_insert(0) += 1;
        }

        let mut depth_breakdown = BTreeMap::new();
        for page in report.succeeded.values() {
            *depth_breakdown.entry(page.depth).or_insert(0) += 1;
        }

        let unique_domains = report
            .succeeded
            .values()
            .map(|page| page.url.domain())
            .chain(report.failed.values().map(|failure| failure.url.domain()))
            .collect::<HashSet<_>>()
            .len();

        let pages_attempted = report.succeeded.len() + report.failed.len();

        Self {
            total_urls: report.visited.len(),
            pages_crawled: report.succeeded.len(),
            pages_failed: report.failed.len(),
            discarded_by_reason,
            unique_domains,
            total_links: report.total_links(),
            invalid_links: report.invalid_links,
            requests_made: report.requests_made,
            retries: report.requests_made.saturating_sub(pages_attempted),
            failures_by_status,
            depth_breakdown,
            duration_seconds: report.duration().num_milliseconds() as f64 / 1000.0,
            cancelled: report.cancelled,
        }
    }

    /// Share of fetched pages that succeeded, in percent
    pub fn success_rate(&self) -> f64 {
        let attempted = self.pages_crawled + self.pages_failed;
        if attempted > 0 {
            (self.pages_crawled as f64 / attempted as f64) * 100.0
        } else {
            0.0
        }
    }

    /// Total number of discarded URLs
    pub fn total_discarded(&self) -> usize {
        self.discarded_by_reason.values().sum()
    }
}

/// Prints statistics to stdout in a formatted manner
///
/// # Arguments
///
/// * `stats` - The statistics to display
pub fn print_statistics(stats: &CrawlStatistics) {
    println!("\n=== Crawl Statistics ===\n");

    println!("Overview:");
    println!("  Total URLs discovered: {}", stats.total_urls);
    println!("  Pages crawled: {}", stats.pages_crawled);
    println!("  Pages failed: {}", stats.pages_failed);
    println!("  Unique domains: {}", stats.unique_domains);
    println!("  Total links found: {}", stats.total_links);
    println!("  Invalid links ignored: {}", stats.invalid_links);
    println!(
        "  Requests made: {} ({} retries)",
        stats.requests_made, stats.retries
    );
    println!("  Duration: {:.2}s", stats.duration_seconds);
    if stats.cancelled {
        println!("  Crawl was stopped before completion");
    }
    println!();

    if !stats.discarded_by_reason.is_empty() {
        println!("Discarded URLs:");
        for (reason, count) in &stats.discarded_by_reason {
            println!("  {}: {}", reason, count);
        }
        println!();
    }

    if !stats.failures_by_status.is_empty() {
        println!("Failures:");
        for (status, count) in &stats.failures_by_status {
            match status {
                Some(status) => println!("  HTTP {}: {}", status, count),
                None => println!("  Network error: {}", count),
            }
        }
        println!();
    }

    println!(
        "Success Rate: {:.1}% ({} / {} pages successfully crawled)",
        stats.success_rate(),
        stats.pages_crawled,
        stats.pages_crawled + stats.pages_failed
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::crawler::{Crawler, FetchResponse, Transport};
    use crate::TransportError;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Arc;

    /// Root links to a page, a missing page and an image
    struct SmallSite;

    #[async_trait]
    impl Transport for SmallSite {
        async fn fetch(
            &self,
            url: &str,
            _headers: &HashMap<String, String>,
        ) -> Result<FetchResponse, TransportError> {
            let (status, body) = match url {
                "https://a.test/" => (
                    200,
                    r#"<a href="/page">p</a><a href="/missing">m</a><a href="/img.png">i</a>"#,
                ),
                "https://a.test/page" => (200, r#"<a href="/">home</a>"#),
                _ => (404, ""),
            };
            Ok(FetchResponse {
                status,
                body: body.to_string(),
            })
        }
    }

    async fn small_site_report() -> CrawlReport {
        let mut config = Config::new("https://a.test/");
        config.crawler.max_runners = 2;
        Crawler::with_transport(config, Arc::new(SmallSite))
            .unwrap()
            .crawl()
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_statistics_from_report() {
        let report = small_site_report().await;
        let stats = CrawlStatistics::from_report(&report);

        assert_eq!(stats.total_urls, 4);
        assert_eq!(stats.pages_crawled, 2);
        assert_eq!(stats.pages_failed, 1);
        assert_eq!(stats.unique_domains, 1);
        assert_eq!(stats.total_links, 4);
        assert_eq!(stats.requests_made, 3);
        assert_eq!(stats.retries, 0);
        assert_eq!(stats.discarded_by_reason[&DiscardReason::ContentUrl], 1);
        assert_eq!(stats.total_discarded(), 1);
        assert_eq!(stats.failures_by_status[&Some(404)], 1);
        assert_eq!(stats.depth_breakdown[&0], 1);
        assert_eq!(stats.depth_breakdown[&1], 1);
        assert!(!stats.cancelled);
    }

    #[tokio::test]
    async fn test_success_rate() {
        let report = small_site_report().await;
        let stats = CrawlStatistics::from_report(&report);

        assert!((stats.success_rate() - 200.0 / 3.0).abs() < 0.01);
    }
}
